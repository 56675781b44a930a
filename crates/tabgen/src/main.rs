//! tabgen - generate shell tab-completion scripts from CLI definitions

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. Scripts go to stdout, so everything else
    // lands on stderr.
    let filter = if cli.verbose > 0 {
        match cli.verbose {
            1 => "tabgen=debug,tabgen_core=debug,tabgen_clap=debug",
            _ => "tabgen=trace,tabgen_core=trace,tabgen_clap=trace",
        }
    } else if cli.quiet {
        "error"
    } else {
        "tabgen=info,tabgen_core=info"
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(filter))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    cli.run()
}
