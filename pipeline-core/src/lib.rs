//! # pipeline-core
//!
//! Core types and traits for the gif pipeline: the transport [`Bot`], [`Handler`] and
//! [`Middleware`], the [`ChatRegistry`] of configured groups and channels, the [`MenuRegistry`]
//! of active interactive menus, media paths and tracing initialization. Transport-agnostic; used
//! by pipeline-telegram, handler-chain, middleware and pipeline-helpers.

pub mod bot;
pub mod error;
pub mod logger;
pub mod media;
pub mod menu;
pub mod registry;
pub mod types;

pub use bot::{Bot, Button, ButtonRows};
pub use error::{HandlerError, PipelineError, Result};
pub use logger::init_tracing;
pub use media::MediaStore;
pub use menu::{ActiveMenu, MenuKind, MenuRegistry};
pub use registry::{Channel, ChatRegistry, Group, MessageCache, SharedRegistry};
pub use storage::{ChatRecord, MessageKey, MessageRecord, Store};
pub use types::{CallbackQuery, Handler, HandlerResponse, IncomingMessage, Middleware};
