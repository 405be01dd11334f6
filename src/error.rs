use thiserror::Error;

/// Error type for the consumer service.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Error originating from the underlying `lapin` library.
    #[error("RabbitMQ communication error: {0}")]
    Lapin(#[from] lapin::Error),

    /// Error during message deserialization.
    #[error("Failed to deserialize message: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A configuration value is missing or cannot be parsed.
    #[error("Invalid configuration for '{key}': {message}")]
    Config { key: String, message: String },

    /// Error from the message handler logic.
    #[error("Message handler failed: {0}")]
    HandlerError(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// The status endpoint could not bind or serve.
    #[error("Status server error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        WorkerError::Config {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
