//! gif-pipeline CLI: run the bot, or list the configured roster. Config from env and optional CLI args.

use anyhow::Result;
use clap::Parser;
use pipeline_cli::{load_telegram_config, run, Cli, Commands, PipelineConfig, Roster};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token, config } => {
            let telegram = load_telegram_config(token)?;
            let config = PipelineConfig::load(config);
            run(config, telegram).await
        }
        Commands::Channels { config } => {
            let config = PipelineConfig::load(config);
            let roster = Roster::load(&config.roster_path)?;
            print!("{}", roster.describe());
            Ok(())
        }
    }
}
