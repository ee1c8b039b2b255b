use anyhow::Result;
use clap::Parser;
use sprint_velocity::cli::commands::{
    check::CheckCommand, init::InitCommand, publish::PublishCommand, report::ReportCommand,
    show_usage, Command,
};
use sprint_velocity::cli::{Cli, Commands};
use sprint_velocity::config::ReportConfig;
use sprint_velocity::telemetry::init_telemetry;

/// Load .env and layered configuration, then start logging
fn load_config() -> Result<ReportConfig> {
    ReportConfig::load_env_file()?;
    let config = ReportConfig::load()?;
    init_telemetry(&config.observability)?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default behavior: no subcommand - explain how to get started
        None => tokio::runtime::Runtime::new()?.block_on(async { show_usage().await }),
        Some(Commands::Report {
            team,
            sprint,
            history,
            output,
            json,
            publish,
        }) => {
            let config = load_config()?;
            tokio::runtime::Runtime::new()?.block_on(async {
                ReportCommand::new(team, sprint, history, output, json, publish, config)
                    .execute()
                    .await
            })
        }
        Some(Commands::Publish { page_id, dir, link }) => {
            let config = load_config()?;
            tokio::runtime::Runtime::new()?.block_on(async {
                PublishCommand::new(page_id, dir, link, config).execute().await
            })
        }
        Some(Commands::Check) => {
            let config = load_config()?;
            tokio::runtime::Runtime::new()?
                .block_on(async { CheckCommand::new(config).execute().await })
        }
        Some(Commands::Init { force }) => {
            tokio::runtime::Runtime::new()?.block_on(async { InitCommand::new(force).execute().await })
        }
    }
}
