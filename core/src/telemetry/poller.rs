use crate::api::{OverlayPayload, TelemetrySnapshot};
use crate::math::StatsHelper;
use crate::prelude::{ConsoleResult, RobotBackend};
use crate::telemetry::{LinkMetrics, MetricHistory};
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;

/// Lateral error magnitude that pins the steering indicator to its edge.
pub const STEERING_ERROR_LIMIT: f64 = 40.0;

/// Maps a lateral tracking error onto [-1, 1] for the steering indicator.
pub fn steering_offset(err: f64) -> f64 {
    let err = if err.is_finite() { err } else { 0.0 };
    StatsHelper::clamp_symmetric(err, STEERING_ERROR_LIMIT) / STEERING_ERROR_LIMIT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No fetch has completed yet.
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Telemetry poll state: connection health, the latest good snapshot and the
/// bounded metric history.
///
/// One cycle is `fetch` (or `fetch_after_interval`) followed by `apply`; the
/// driver schedules the next cycle only after applying the previous one, so
/// cycles never overlap.
#[derive(Debug, Clone)]
pub struct StatusPoller<B> {
    backend: B,
    interval: Duration,
    link: LinkState,
    snapshot: Option<TelemetrySnapshot>,
    history: MetricHistory,
    metrics: LinkMetrics,
}

impl<B: RobotBackend> StatusPoller<B> {
    pub fn new(backend: B, interval: Duration, history_capacity: usize) -> Self {
        Self {
            backend,
            interval,
            link: LinkState::Connecting,
            snapshot: None,
            history: MetricHistory::with_capacity(history_capacity),
            metrics: LinkMetrics::new(),
        }
    }

    pub fn fetch(&self) -> impl Future<Output = ConsoleResult<TelemetrySnapshot>> + Send + 'static {
        let backend = self.backend.clone();
        async move { backend.fetch_status().await }
    }

    /// Waits one poll interval, then fetches.
    pub fn fetch_after_interval(
        &self,
    ) -> impl Future<Output = ConsoleResult<TelemetrySnapshot>> + Send + 'static {
        let interval = self.interval;
        let backend = self.backend.clone();
        async move {
            tokio::time::sleep(interval).await;
            backend.fetch_status().await
        }
    }

    /// Folds one fetch outcome into the poll state. A failure only flips the
    /// link state; the last good snapshot, overlay and history stay in place.
    pub fn apply(&mut self, outcome: ConsoleResult<TelemetrySnapshot>, timestamp: f64) -> LinkState {
        match outcome {
            Ok(snapshot) => {
                if self.link == LinkState::Disconnected {
                    info!(
                        "telemetry link restored after {} failed poll(s)",
                        self.metrics.failure_streak()
                    );
                }
                self.metrics.record_success();
                self.history.error.push(timestamp, snapshot.err);
                self.history.motor_duty.push(timestamp, snapshot.motor_duty);
                self.snapshot = Some(snapshot);
                self.link = LinkState::Connected;
            }
            Err(err) => {
                self.metrics.record_failure();
                if self.link == LinkState::Disconnected {
                    debug!("telemetry poll failed again: {err}");
                } else {
                    warn!("telemetry link lost: {err}");
                }
                self.link = LinkState::Disconnected;
            }
        }
        self.link
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    pub fn is_connected(&self) -> bool {
        self.link == LinkState::Connected
    }

    pub fn snapshot(&self) -> Option<&TelemetrySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn overlay(&self) -> Option<&OverlayPayload> {
        self.snapshot.as_ref().and_then(|snapshot| snapshot.overlay.as_ref())
    }

    pub fn history(&self) -> &MetricHistory {
        &self.history
    }

    pub fn metrics(&self) -> &LinkMetrics {
        &self.metrics
    }
}
