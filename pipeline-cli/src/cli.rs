//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gif-pipeline")]
#[command(about = "Gif pipeline bot: route videos from command groups to channels", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
        /// Roster file; overrides PIPELINE_CONFIG.
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Print the configured groups and channels.
    Channels {
        #[arg(short, long)]
        config: Option<String>,
    },
}
