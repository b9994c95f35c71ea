//! # pipeline-telegram
//!
//! Telegram transport layer: adapters from teloxide types to stored records, the
//! [`pipeline_core::Bot`] implementation, media download into the [`pipeline_core::MediaStore`]
//! and the dispatcher feeding messages and button presses into the handler chain.
//! No command logic lives here.

mod adapters;
mod bot_adapter;
mod config;
mod media;
mod runner;

pub use adapters::{TelegramChatWrapper, TelegramMessageWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use media::{download_media, extension_for};
pub use runner::run_dispatcher;
