use anyhow::Context;
use linebotcore::api::{ParamGroup, StreamName};
use linebotcore::telemetry::HISTORY_CAPACITY;
use linebotcore::{ConsoleError, ConsoleResult, SyncTiming};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Optional parameter panels. The tracked key set follows what is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub speed_panel: bool,
    pub lqr_panel: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            speed_panel: true,
            lqr_panel: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub backend_url: String,
    pub timing: SyncTiming,
    pub history_capacity: usize,
    pub default_stream: StreamName,
    pub request_timeout_ms: u64,
    pub features: Features,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5001".into(),
            timing: SyncTiming::default(),
            history_capacity: HISTORY_CAPACITY,
            default_stream: StreamName::default(),
            request_timeout_ms: 2000,
            features: Features::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading console config {}", path_ref.display()))?;
        let config: ConsoleConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing console config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("validating console config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(ConsoleError::Config(format!(
                "backend_url must be an http(s) URL, got {:?}",
                self.backend_url
            )));
        }
        if self.timing.debounce_ms == 0 || self.timing.poll_interval_ms == 0 {
            return Err(ConsoleError::Config(
                "debounce_ms and poll_interval_ms must be positive".into(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(ConsoleError::Config("history_capacity must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Parameter groups whose fields the console edits and pushes.
    pub fn tracked_groups(&self) -> Vec<ParamGroup> {
        let mut groups = vec![
            ParamGroup::Vision,
            ParamGroup::Drive,
            ParamGroup::Steering,
            ParamGroup::Manual,
            ParamGroup::Chassis,
        ];
        if self.features.speed_panel {
            groups.push(ParamGroup::Speed);
        }
        if self.features.lqr_panel {
            groups.push(ParamGroup::Lqr);
        }
        groups
    }
}
