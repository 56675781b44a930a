//! CLI argument definitions using clap

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Generate shell tab-completion scripts from CLI definitions
#[derive(Parser)]
#[command(name = "tabgen")]
#[command(author, version, about)]
#[command(long_about = "Generate shell tab-completion scripts from CLI definitions.\n\n\
    Describe a command tree once, in YAML or JSON, and emit a static\n\
    completion script for bash, zsh or tcsh.")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Compile a definition file into a completion script
    Generate {
        /// Path to the CLI definition (YAML, or JSON with a .json extension)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        definition: PathBuf,

        /// Shell to generate the script for
        #[arg(short, long, value_enum, default_value = "bash")]
        shell: ShellTarget,

        /// Override the root identifier prefix used inside the script
        #[arg(long)]
        prefix: Option<String>,

        /// Literal text spliced into the script as a preamble
        #[arg(long, conflicts_with = "preamble_file")]
        preamble: Option<String>,

        /// File whose contents are spliced into the script as a preamble
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        preamble_file: Option<PathBuf>,

        /// Write the script here instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Override the program name the script is registered under
        #[arg(long)]
        prog: Option<String>,

        /// Treat an unreadable or unparsable definition as a fatal error
        #[arg(long)]
        strict: bool,
    },

    /// Generate completions for tabgen itself
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: ShellTarget,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum ShellTarget {
    Bash,
    Zsh,
    Tcsh,
}

impl ShellTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            ShellTarget::Bash => "bash",
            ShellTarget::Zsh => "zsh",
            ShellTarget::Tcsh => "tcsh",
        }
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Some(Commands::Generate {
                definition,
                shell,
                prefix,
                preamble,
                preamble_file,
                output,
                prog,
                strict,
            }) => crate::commands::generate::run(crate::commands::generate::GenerateArgs {
                definition,
                shell,
                prefix,
                preamble,
                preamble_file,
                output,
                prog,
                strict,
                quiet: self.quiet,
            }),
            Some(Commands::Completion { shell }) => crate::commands::completion::run(shell),
            None => {
                // Show help when no subcommand is given
                use clap::CommandFactory;
                let mut cmd = Self::command();
                cmd.print_help()?;
                println!();
                Ok(())
            }
        }
    }
}
