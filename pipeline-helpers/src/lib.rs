//! # pipeline-helpers
//!
//! The command helpers of the gif pipeline and the machinery they share:
//!
//! - [`destination`] – grammar of the text after `send`
//! - [`callback`] – button payload vocabulary
//! - [`video`] – which video a command refers to, and whether it was giffed
//! - [`context`] – transport, store, registries and media shared by the helpers
//! - [`menus`] – interactive menu lifecycle
//! - [`forward`] – direct sends, one-way and two-way forwards
//! - [`SendHelper`] / [`DeleteHelper`] – the [`pipeline_core::Handler`]s registered in the chain

pub mod callback;
pub mod context;
pub mod destination;
pub mod forward;
pub mod menus;
pub mod video;

mod delete_helper;
mod send_helper;

pub use callback::CallbackAction;
pub use context::PipelineContext;
pub use delete_helper::DeleteHelper;
pub use destination::DestinationPlan;
pub use forward::Forwarder;
pub use menus::MenuFlow;
pub use send_helper::SendHelper;
pub use video::{find_video_for_message, was_giffed};
