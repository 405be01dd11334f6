//! The queue worker and its configuration.

use crate::error::WorkerError;
use crate::handler::MessageHandler;
use futures_util::TryStreamExt;
use lapin::{
    message::Delivery,
    options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions, QueueDeclareOptions},
    types::FieldTable,
    Channel, Connection, ConnectionProperties,
};
use std::sync::Arc;

/// Configuration for a `QueueWorker`.
///
/// Use the `WorkerConfig::builder()` method to construct this struct.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// The name of the queue to consume messages from.
    pub queue_name: String,
    /// A unique identifier for the consumer on this queue.
    pub consumer_tag: String,
    /// The AMQP URL for connecting to the RabbitMQ broker.
    pub rabbitmq_url: String,
    /// The number of unacknowledged messages the broker may hand out at a time (QoS prefetch count).
    /// It also bounds how many handler calls run concurrently.
    pub prefetch_count: u16,
    /// Whether to declare the queue (durable) before consuming.
    pub declare_queue: bool,
}

impl WorkerConfig {
    /// Creates a new `WorkerConfigBuilder` to start building the worker configuration.
    ///
    /// # Arguments
    /// * `queue_name` - The name of the queue to consume from.
    /// * `rabbitmq_url` - The connection URL for the RabbitMQ broker.
    pub fn builder(queue_name: String, rabbitmq_url: String) -> WorkerConfigBuilder {
        WorkerConfigBuilder::new(queue_name, rabbitmq_url)
    }
}

/// A builder for creating `WorkerConfig` instances.
pub struct WorkerConfigBuilder {
    queue_name: String,
    rabbitmq_url: String,
    consumer_tag: Option<String>,
    prefetch_count: Option<u16>,
    declare_queue: bool,
}

impl WorkerConfigBuilder {
    fn new(queue_name: String, rabbitmq_url: String) -> Self {
        Self {
            queue_name,
            rabbitmq_url,
            consumer_tag: None,
            prefetch_count: None,
            declare_queue: false,
        }
    }

    /// Sets a custom consumer tag.
    /// Defaults to `{queue_name}_consumer` if not set.
    pub fn consumer_tag(mut self, consumer_tag: String) -> Self {
        self.consumer_tag = Some(consumer_tag);
        self
    }

    /// Sets a custom prefetch count (QoS).
    /// Defaults to 1, which processes one message at a time.
    ///
    /// **Warning:** Setting this to a value greater than 1 means your `MessageHandler`
    /// may be called concurrently.
    pub fn prefetch_count(mut self, count: u16) -> Self {
        self.prefetch_count = Some(count);
        self
    }

    /// Declares the queue as durable on startup instead of expecting it to exist.
    pub fn declare_queue(mut self, declare: bool) -> Self {
        self.declare_queue = declare;
        self
    }

    /// Builds the final `WorkerConfig`, applying defaults for any unset options.
    pub fn build(self) -> WorkerConfig {
        let queue_name = self.queue_name;
        WorkerConfig {
            consumer_tag: self.consumer_tag.unwrap_or_else(|| format!("{}_consumer", queue_name)),
            prefetch_count: self.prefetch_count.unwrap_or(1).max(1),
            declare_queue: self.declare_queue,
            queue_name,
            rabbitmq_url: self.rabbitmq_url,
        }
    }
}

/// How a delivery is settled with the broker after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The handler succeeded; the broker may drop the message.
    Ack,
    /// The handler failed; the message goes back on the queue.
    Requeue,
    /// The body could not be decoded; the message is discarded.
    Reject,
}

/// Decodes `body` and runs it through `handler`, returning how to settle the delivery.
pub async fn dispatch<H: MessageHandler>(handler: &H, body: &[u8]) -> Disposition {
    let message: H::MessageType = match serde_json::from_slice(body).map_err(WorkerError::from) {
        Ok(msg) => msg,
        Err(e) => {
            log::error!(
                "[{}] Rejecting message: {}",
                handler.handler_name(),
                e
            );
            return Disposition::Reject;
        }
    };

    match handler.handle_message(message).await {
        Ok(()) => Disposition::Ack,
        Err(e) => {
            log::error!("[{}] Failed to process message: {}", handler.handler_name(), e);
            Disposition::Requeue
        }
    }
}

/// A RabbitMQ worker that feeds one queue into a `MessageHandler`.
pub struct QueueWorker<H: MessageHandler> {
    handler: Arc<H>,
    config: WorkerConfig,
}

impl<H: MessageHandler + 'static> QueueWorker<H> {
    /// Creates a new worker.
    pub fn new(handler: Arc<H>, config: WorkerConfig) -> Self {
        Self { handler, config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Connects to RabbitMQ, sets up the consumer, and runs the message processing loop.
    ///
    /// This function will run until the connection is lost or the consumer is cancelled.
    /// The caller is responsible for reconnection and graceful shutdown.
    pub async fn run(&self) -> Result<(), WorkerError> {
        log::info!(
            "Connecting to RabbitMQ and setting up worker for queue '{}'...",
            self.config.queue_name
        );

        let connection = Connection::connect(&self.config.rabbitmq_url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        if self.config.declare_queue {
            self.declare_queue(&channel).await?;
        }

        channel.basic_qos(self.config.prefetch_count, BasicQosOptions::default()).await?;
        log::info!("QoS prefetch count set to {}", self.config.prefetch_count);

        let consumer = channel
            .basic_consume(
                &self.config.queue_name,
                &self.config.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        log::info!(
            "Consumer '{}' started with tag '{}'. Waiting for messages...",
            self.handler.handler_name(),
            consumer.tag().as_str()
        );

        let handler = self.handler.clone();
        let in_flight = usize::from(self.config.prefetch_count);
        consumer
            .try_for_each_concurrent(in_flight, move |delivery| {
                let handler = handler.clone();
                async move {
                    if let Err(e) = Self::process_message(delivery, handler).await {
                        log::error!("Failed to settle message with the broker: {}", e);
                    }
                    Ok(())
                }
            })
            .await?;

        log::info!("Consumer for queue '{}' finished.", self.config.queue_name);
        Ok(())
    }

    async fn declare_queue(&self, channel: &Channel) -> Result<(), WorkerError> {
        channel
            .queue_declare(
                &self.config.queue_name,
                QueueDeclareOptions { durable: true, ..Default::default() },
                FieldTable::default(),
            )
            .await?;

        log::info!("Queue '{}' declared.", self.config.queue_name);
        Ok(())
    }

    /// Dispatches a single delivery and settles it with the broker.
    async fn process_message(delivery: Delivery, handler: Arc<H>) -> Result<(), WorkerError> {
        let delivery_tag = delivery.delivery_tag;

        match dispatch(handler.as_ref(), &delivery.data).await {
            Disposition::Ack => {
                delivery.ack(BasicAckOptions::default()).await?;
                log::debug!("Message processed successfully. Tag: {}", delivery_tag);
            }
            Disposition::Requeue => {
                delivery.nack(BasicNackOptions { requeue: true, ..Default::default() }).await?;
                log::warn!("Message requeued after handler failure. Tag: {}", delivery_tag);
            }
            Disposition::Reject => {
                delivery.nack(BasicNackOptions { requeue: false, ..Default::default() }).await?;
                log::warn!("Malformed message rejected. Tag: {}", delivery_tag);
            }
        }

        Ok(())
    }
}
