//! Middleware that observes every inbound message before the helpers see it: logging,
//! persistence into the store and the chat registry cache, and the command-group filter.

mod middleware;
mod persistence_middleware;

#[cfg(test)]
mod test;

pub use middleware::{GroupFilterMiddleware, LoggingMiddleware};
pub use persistence_middleware::PersistenceMiddleware;
