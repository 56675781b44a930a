//! Generate command - compile a definition file into a completion script
//!
//! An unloadable definition is logged and ignored by default so build
//! pipelines can run the generator unconditionally; `--strict` promotes
//! it to a failure. Generation errors (unsupported shell, identifier
//! collisions) are always fatal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use tabgen_core::{CommandSpec, GenOptions};
use tracing::error;

use crate::cli::ShellTarget;

pub struct GenerateArgs {
    pub definition: PathBuf,
    pub shell: ShellTarget,
    pub prefix: Option<String>,
    pub preamble: Option<String>,
    pub preamble_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub prog: Option<String>,
    pub strict: bool,
    pub quiet: bool,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let spec = match CommandSpec::load(&args.definition) {
        Ok(spec) => spec,
        Err(err) if !args.strict => {
            error!("skipping {}: {err}", args.definition.display());
            return Ok(());
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to load definition {}", args.definition.display())
            });
        }
    };

    let preamble = match (&args.preamble, &args.preamble_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read preamble file: {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let opts = GenOptions {
        prog: args.prog,
        root_prefix: args.prefix,
        preamble,
    };
    let script = tabgen_core::generate(&spec, args.shell.as_str(), &opts)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &script)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if !args.quiet {
                eprintln!("{} {}", "Wrote".dimmed(), path.display());
            }
        }
        None => print!("{script}"),
    }

    Ok(())
}
