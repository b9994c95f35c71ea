use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Transport error: {0}")]
    Transport(String),

    /// A store write or read failed. Infrastructure failure; the operation may be retried.
    #[error("Persistence error ({context}): {source}")]
    Persistence {
        context: String,
        #[source]
        source: storage::StorageError,
    },

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn persistence(context: impl Into<String>, source: storage::StorageError) -> Self {
        PipelineError::Persistence {
            context: context.into(),
            source,
        }
    }

    /// Persistence failures are retryable; everything else is reported as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Persistence { .. })
    }
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No applicable video")]
    NoVideo,

    #[error("Unknown message: {0}")]
    UnknownMessage(i64),

    #[error("Message {0} has no stored media")]
    MissingMedia(i64),

    #[error("Invalid callback data: {0}")]
    InvalidCallback(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
