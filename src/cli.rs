use clap::Parser;

/// One-shot setup checker. Runs with no arguments; `--help` and
/// `--version` come from clap.
#[derive(Parser)]
#[command(name = "m365-assistant")]
#[command(version)]
#[command(about = "Setup and connectivity checker for the personal Microsoft 365 assistant")]
pub struct Cli {}
