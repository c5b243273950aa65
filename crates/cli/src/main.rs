//! tripstack CLI entry point.

use clap::Parser;
use tripstack::cli::Cli;
use tripstack::logging::init_tracing;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.format, cli.quiet);

    tripstack::commands::run(cli)?;
    Ok(())
}
