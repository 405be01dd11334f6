//! Defines the seam between the queue worker and the business logic.

use crate::error::WorkerError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// A trait for processing messages consumed from a RabbitMQ queue.
///
/// The worker acknowledges a delivery when `handle_message` returns `Ok` and
/// requeues it when it returns `Err`.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// The type of the message that this handler can process.
    /// Must be deserializable from JSON.
    type MessageType: DeserializeOwned + Send;

    /// Processes a single deserialized message.
    async fn handle_message(&self, message: Self::MessageType) -> Result<(), WorkerError>;

    /// A name for the handler, used for logging and identification.
    fn handler_name(&self) -> &str;
}
