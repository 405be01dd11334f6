use contagem_consumer::{status, AppConfig, ContagemService, QueueWorker, WorkerConfig, WorkerError};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), WorkerError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Any malformed setting stops the process here, before a message is consumed.
    let config = AppConfig::from_env()?;

    let handler = Arc::new(ContagemService::new(config.interval));

    let worker_config = WorkerConfig::builder(config.queue_name.clone(), config.rabbitmq_url.clone())
        .prefetch_count(config.prefetch_count)
        .declare_queue(config.declare_queue)
        .build();
    let worker = QueueWorker::new(handler, worker_config);
    log::info!(
        "Consuming queue '{}' with prefetch {} and a {:?} processing interval",
        worker.config().queue_name,
        worker.config().prefetch_count,
        config.interval
    );

    // Like a bad setting, a status port that cannot be bound stops the process before consuming.
    let status_listener = status::bind(config.status_addr).await?;
    tokio::spawn(async move {
        if let Err(e) = status::serve(status_listener).await {
            log::error!("Status endpoint stopped: {}", e);
        }
    });

    log::info!("Starting application...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Ctrl+C received. Shutting down.");
                break;
            },

            result = worker.run() => {
                match result {
                    Ok(()) => {
                        log::info!("Worker finished. Will not reconnect.");
                        break;
                    }
                    Err(e) => {
                        log::error!("Worker failed: {}. Reconnecting in {:?}...", e, config.reconnect_delay);
                        tokio::select! {
                            _ = tokio::signal::ctrl_c() => {
                                log::info!("Ctrl+C received while waiting to reconnect. Shutting down.");
                                break;
                            },
                            _ = tokio::time::sleep(config.reconnect_delay) => {}
                        }
                    }
                }
            }
        }
    }

    log::info!("Application has shut down.");
    Ok(())
}
