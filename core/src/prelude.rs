use crate::api::{ParamPatch, ParameterSet, StreamName, TelemetrySnapshot};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Timing shared by the sync scheduler and the status poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTiming {
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
}

impl SyncTiming {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SyncTiming {
    fn default() -> Self {
        Self {
            debounce_ms: 80,
            poll_interval_ms: 220,
        }
    }
}

/// Common error type for backend round-trips and configuration.
///
/// Variants carry rendered messages so the error can travel inside UI messages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("backend answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// The robot service as seen by the console.
///
/// Futures must not borrow the backend, so implementations are cheap to clone
/// and each call owns what it needs.
pub trait RobotBackend: Clone + Send + Sync + 'static {
    fn fetch_params(&self) -> impl Future<Output = ConsoleResult<ParameterSet>> + Send + 'static;
    fn push_params(&self, patch: ParamPatch)
        -> impl Future<Output = ConsoleResult<()>> + Send + 'static;
    fn estop(&self) -> impl Future<Output = ConsoleResult<()>> + Send + 'static;
    fn fetch_status(&self)
        -> impl Future<Output = ConsoleResult<TelemetrySnapshot>> + Send + 'static;
    fn stream_url(&self, stream: StreamName, cache_bust: u64) -> String;
}
