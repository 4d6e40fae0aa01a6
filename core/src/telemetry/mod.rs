pub mod history;
pub mod log;
pub mod metrics;
pub mod poller;

pub use history::{HistoryBuffer, HistorySample, MetricHistory, HISTORY_CAPACITY};
pub use self::log::ActivityLog;
pub use metrics::LinkMetrics;
pub use poller::{steering_offset, LinkState, StatusPoller};
