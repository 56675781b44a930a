//! Shell completion generation for tabgen itself
//!
//! tabgen eats its own cooking: its completions come from snapshotting
//! its clap definition and running it through the same compiler.

use anyhow::Result;
use clap::CommandFactory;
use tabgen_core::GenOptions;

use crate::cli::{Cli, ShellTarget};

pub fn run(shell: ShellTarget) -> Result<()> {
    let mut cmd = Cli::command();
    cmd.build();
    let spec = tabgen_clap::from_command(&cmd);
    let script = tabgen_core::generate(&spec, shell.as_str(), &GenOptions::default())?;
    print!("{script}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_definition_generates_for_every_shell() {
        let mut cmd = Cli::command();
        cmd.build();
        let spec = tabgen_clap::from_command(&cmd);
        for shell in ["bash", "zsh", "tcsh"] {
            let script = tabgen_core::generate(&spec, shell, &GenOptions::default()).unwrap();
            assert!(script.contains("tabgen"), "{shell} script names the program");
        }
    }

    #[test]
    fn test_bash_script_registers_tabgen() {
        let mut cmd = Cli::command();
        cmd.build();
        let spec = tabgen_clap::from_command(&cmd);
        let script = tabgen_core::generate(&spec, "bash", &GenOptions::default()).unwrap();
        assert!(script.contains("complete -o filenames -F _tabgen_tabgen tabgen"));
        assert!(script.contains("_tabgen_tabgen_generate___shell_choices='bash zsh tcsh'"));
    }
}
