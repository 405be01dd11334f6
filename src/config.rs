//! Process configuration, read once at startup.

use crate::error::WorkerError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const RABBITMQ_URL_KEYS: &[&str] = &["ConnectionStrings__RabbitMQ", "RABBITMQ_URL"];
const QUEUE_NAME_KEYS: &[&str] = &["QueueName", "QUEUE_NAME"];
const INTERVAL_KEYS: &[&str] = &["Interval", "INTERVAL_MS"];
const PREFETCH_COUNT_KEYS: &[&str] = &["PrefetchCount", "PREFETCH_COUNT"];
const STATUS_ADDR_KEYS: &[&str] = &["StatusAddr", "STATUS_ADDR"];
const RECONNECT_DELAY_KEYS: &[&str] = &["ReconnectDelayMs", "RECONNECT_DELAY_MS"];
const DECLARE_QUEUE_KEYS: &[&str] = &["DeclareQueue", "DECLARE_QUEUE"];

const DEFAULT_STATUS_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_RECONNECT_DELAY_MS: u64 = 5000;

/// Immutable settings for the whole process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub rabbitmq_url: String,
    pub queue_name: String,
    /// Simulated processing time per message.
    pub interval: Duration,
    pub prefetch_count: u16,
    pub status_addr: SocketAddr,
    pub reconnect_delay: Duration,
    /// Declare the queue on startup instead of expecting it to exist.
    pub declare_queue: bool,
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, which maps a key to its raw value.
    ///
    /// Each setting accepts several key spellings; the first one present wins.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WorkerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let find = |keys: &[&'static str]| -> Option<(&'static str, String)> {
            keys.iter()
                .find_map(|key| lookup(key).map(|value| (*key, value.trim().to_string())))
        };

        let rabbitmq_url = require(find(RABBITMQ_URL_KEYS), RABBITMQ_URL_KEYS[0])?;
        let queue_name = require(find(QUEUE_NAME_KEYS), QUEUE_NAME_KEYS[0])?;

        let interval_ms: i32 = parse_or(find(INTERVAL_KEYS), 0)?;
        if interval_ms < 0 {
            return Err(WorkerError::config(INTERVAL_KEYS[0], "must not be negative"));
        }
        let prefetch_count: u16 = parse_or(find(PREFETCH_COUNT_KEYS), 1)?;
        if prefetch_count == 0 {
            return Err(WorkerError::config(
                PREFETCH_COUNT_KEYS[0],
                "must be at least 1",
            ));
        }

        let status_addr = match find(STATUS_ADDR_KEYS) {
            Some(found) => parse(found)?,
            None => DEFAULT_STATUS_ADDR
                .parse()
                .map_err(|_| WorkerError::config(STATUS_ADDR_KEYS[0], "invalid default"))?,
        };
        let reconnect_delay_ms: u64 =
            parse_or(find(RECONNECT_DELAY_KEYS), DEFAULT_RECONNECT_DELAY_MS)?;
        let declare_queue: bool = parse_or(find(DECLARE_QUEUE_KEYS), false)?;

        Ok(Self {
            rabbitmq_url,
            queue_name,
            interval: Duration::from_millis(interval_ms as u64),
            prefetch_count,
            status_addr,
            reconnect_delay: Duration::from_millis(reconnect_delay_ms),
            declare_queue,
        })
    }
}

fn require(found: Option<(&'static str, String)>, key: &str) -> Result<String, WorkerError> {
    match found {
        Some((_, value)) if !value.is_empty() => Ok(value),
        Some((found_key, _)) => Err(WorkerError::config(found_key, "must not be empty")),
        None => Err(WorkerError::config(key, "required value is missing")),
    }
}

fn parse<T>((key, raw): (&'static str, String)) -> Result<T, WorkerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| WorkerError::config(key, format!("cannot parse '{}': {}", raw, e)))
}

/// Only an absent key falls back to `default`; an empty value still has to parse.
fn parse_or<T>(found: Option<(&'static str, String)>, default: T) -> Result<T, WorkerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match found {
        Some(found) => parse(found),
        None => Ok(default),
    }
}
