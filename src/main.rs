use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use log::{error, info};

use m365_assistant::cli::Cli;
use m365_assistant::config::AppConfig;
use m365_assistant::setup;

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    let config = AppConfig::load();

    if let Err(err) = init_logging(&config) {
        eprintln!("Failed to initialize logging: {err}");
        std::process::exit(1);
    }
    info!("Starting m365-assistant setup");

    if let Err(err) = setup::run(&config).await {
        error!("Setup failed: {err:#}");
        println!("{} {err:#}", "💥 Setup failed:".red());
        std::process::exit(1);
    }
}

/// Log to a per-run file (truncated each start) so console output stays
/// readable; filter level comes from the LOG_LEVEL setting.
fn init_logging(config: &AppConfig) -> Result<()> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("m365-assistant.log")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(log_file)))
    .init();

    Ok(())
}
