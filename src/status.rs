//! Liveness endpoint for the hosting environment.

use crate::error::WorkerError;
use axum::{http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub fn router() -> Router {
    Router::new().route("/status", get(status))
}

async fn status() -> StatusCode {
    StatusCode::OK
}

/// Binds the status listener. Called before consuming starts so a taken port stops the process.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, WorkerError> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Status endpoint listening on http://{}/status", listener.local_addr()?);
    Ok(listener)
}

/// Serves the status router on `listener` until the task is dropped.
pub async fn serve(listener: TcpListener) -> Result<(), WorkerError> {
    axum::serve(listener, router()).await?;
    Ok(())
}
