//! # pipeline-cli
//!
//! The `gif-pipeline` binary: argument parsing, configuration (environment and roster file) and
//! assembly of store, registries, helpers and the Telegram dispatcher.

pub mod app;
pub mod cli;
pub mod config;

pub use app::{build_chain, build_registry, run};
pub use cli::{Cli, Commands};
pub use config::{load_telegram_config, ChannelEntry, GroupEntry, PipelineConfig, Roster};
