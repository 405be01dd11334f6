//! The counting-event handler: logs each event and simulates work.

use crate::error::WorkerError;
use crate::event::ContagemEvent;
use crate::handler::MessageHandler;
use async_trait::async_trait;
use std::time::Duration;

/// Logs every consumed `ContagemEvent` and then waits for the configured interval.
#[derive(Debug, Clone)]
pub struct ContagemService {
    interval: Duration,
}

impl ContagemService {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The two lines written for `event`: the wait notice and the field dump.
    pub fn log_lines(&self, event: &ContagemEvent) -> [String; 2] {
        [
            format!(
                "Waiting {}ms to finish processing...",
                self.interval.as_millis()
            ),
            event.summary(),
        ]
    }

    /// Processes one event. Never fails; returning means the delivery can be acked.
    pub async fn process(&self, event: ContagemEvent) {
        for line in self.log_lines(&event) {
            log::info!("{}", line);
        }
        tokio::time::sleep(self.interval).await;
    }
}

#[async_trait]
impl MessageHandler for ContagemService {
    type MessageType = ContagemEvent;

    async fn handle_message(&self, message: Self::MessageType) -> Result<(), WorkerError> {
        self.process(message).await;
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "ContagemService"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Metadata, Record};
    use std::cell::RefCell;
    use std::sync::Once;
    use tokio::time::Instant;

    const HANDLER_TARGET: &str = "contagem_consumer::contagem";

    thread_local! {
        static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    /// Collects this module's records on the thread that emitted them, so parallel tests stay apart.
    struct CapturingLogger;

    impl Log for CapturingLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.target() == HANDLER_TARGET
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                RECORDS.with(|records| {
                    records
                        .borrow_mut()
                        .push((record.level(), record.args().to_string()))
                });
            }
        }

        fn flush(&self) {}
    }

    fn capture_logs() {
        static INSTALL: Once = Once::new();
        INSTALL.call_once(|| {
            log::set_boxed_logger(Box::new(CapturingLogger)).expect("logger already installed");
            log::set_max_level(log::LevelFilter::Trace);
        });
        RECORDS.with(|records| records.borrow_mut().clear());
    }

    fn captured() -> Vec<(Level, String)> {
        RECORDS.with(|records| records.borrow().clone())
    }

    fn full_event() -> ContagemEvent {
        ContagemEvent {
            valor_atual: 42,
            producer: Some("svc-a".into()),
            kernel: Some("linux-5.15".into()),
            framework: Some("dotnet8".into()),
            mensagem: Some("tick".into()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_waits_for_interval() {
        let service = ContagemService::new(Duration::from_millis(100));

        let started = Instant::now();
        service.process(full_event()).await;

        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_returns_immediately() {
        let service = ContagemService::new(Duration::ZERO);

        let started = Instant::now();
        service.process(ContagemEvent::default()).await;

        assert!(started.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_emits_exactly_two_info_records() {
        capture_logs();
        let service = ContagemService::new(Duration::from_millis(100));

        service.process(full_event()).await;

        let records = captured();
        assert_eq!(records.len(), 2, "unexpected records: {records:?}");
        assert!(records.iter().all(|(level, _)| *level == Level::Info));
        assert_eq!(records[0].1, "Waiting 100ms to finish processing...");
        assert_eq!(
            records[1].1,
            "Valor atual: 42 | Producer: svc-a | Kernel: linux-5.15 | Framework: dotnet8 | Mensagem: tick"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_logs_empty_placeholders_for_absent_fields() {
        capture_logs();
        let service = ContagemService::new(Duration::ZERO);

        service.process(ContagemEvent::default()).await;

        let records = captured();
        assert_eq!(records.len(), 2, "unexpected records: {records:?}");
        assert!(records.iter().all(|(level, _)| *level == Level::Info));
        assert_eq!(records[0].1, "Waiting 0ms to finish processing...");
        assert_eq!(
            records[1].1,
            "Valor atual: 0 | Producer:  | Kernel:  | Framework:  | Mensagem: "
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_twice_logs_same_pair() {
        capture_logs();
        let service = ContagemService::new(Duration::from_millis(5));

        service.process(full_event()).await;
        let first = captured();
        capture_logs();
        service.process(full_event()).await;

        assert_eq!(first, captured());
    }

    #[test]
    fn test_log_lines_for_full_event() {
        let service = ContagemService::new(Duration::from_millis(100));
        let [notice, fields] = service.log_lines(&full_event());

        assert!(notice.contains("100ms"));
        for expected in ["42", "svc-a", "linux-5.15", "dotnet8", "tick"] {
            assert!(fields.contains(expected), "missing {expected} in {fields}");
        }
    }

    #[test]
    fn test_log_lines_for_empty_event_keep_five_fields() {
        let service = ContagemService::new(Duration::ZERO);
        let [notice, fields] = service.log_lines(&ContagemEvent::default());

        assert!(notice.contains("0ms"));
        assert!(fields.starts_with("Valor atual: 0 |"));
        assert_eq!(fields.split(" | ").count(), 5);
    }

    #[test]
    fn test_log_lines_are_stable_across_calls() {
        let service = ContagemService::new(Duration::from_millis(5));
        let event = full_event();

        assert_eq!(service.log_lines(&event), service.log_lines(&event));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_message_acks() {
        let service = ContagemService::new(Duration::from_millis(10));

        assert!(service.handle_message(full_event()).await.is_ok());
        assert_eq!(service.handler_name(), "ContagemService");
    }
}
