//! # Contagem Consumer
//! Consumes counting events from a RabbitMQ queue, logs them and simulates processing time.

pub mod config;
pub mod contagem;
pub mod error;
pub mod event;
pub mod handler;
pub mod status;
pub mod worker;

// Re-export key components for easy access
pub use config::AppConfig;
pub use contagem::ContagemService;
pub use error::WorkerError;
pub use event::ContagemEvent;
pub use handler::MessageHandler;
pub use worker::{dispatch, Disposition, QueueWorker, WorkerConfig};
