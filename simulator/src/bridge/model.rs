use linebotcore::api::{ParamKey, ParamPatch, ParamValue, ParameterSet, TelemetrySnapshot};
use log::warn;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// Authoritative robot state served to the console.
#[derive(Debug, Clone, Default)]
pub struct RobotState {
    pub params: ParameterSet,
    pub status: TelemetrySnapshot,
}

/// Handle shared by the HTTP routes and the control loop.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<RobotState>>,
    persist: Option<Arc<PathBuf>>,
}

impl SharedState {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RobotState {
                params,
                status: TelemetrySnapshot::default(),
            })),
            persist: None,
        }
    }

    /// Writes the parameter set to `path` after every accepted update.
    pub fn persisting_to(mut self, path: PathBuf) -> Self {
        self.persist = Some(Arc::new(path));
        self
    }

    pub fn params(&self) -> ParameterSet {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .params
            .clone()
    }

    pub fn status(&self) -> TelemetrySnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
            .clone()
    }

    /// Applies a partial update and returns the fields that were accepted.
    pub fn merge_params(&self, patch: &ParamPatch) -> (ParamPatch, ParameterSet) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let changed = guard.params.merge(patch);
        let params = guard.params.clone();
        drop(guard);
        if !changed.is_empty() {
            self.persist(&params);
        }
        (changed, params)
    }

    fn persist(&self, params: &ParameterSet) {
        let Some(path) = &self.persist else {
            return;
        };
        let written = serde_json::to_vec_pretty(params)
            .map_err(|err| err.to_string())
            .and_then(|bytes| fs::write(path.as_path(), bytes).map_err(|err| err.to_string()));
        if let Err(err) = written {
            warn!("could not persist parameters to {}: {err}", path.display());
        }
    }

    /// Drops out of auto drive and zeroes the manual actuators.
    pub fn estop(&self) -> ParameterSet {
        let patch = ParamPatch::new()
            .with(ParamKey::AutoDrive, ParamValue::Int(0))
            .with(ParamKey::ManualMotor, ParamValue::Float(0.0))
            .with(ParamKey::ManualServo, ParamKey::SteerCenter.default_value());
        self.merge_params(&patch).1
    }

    pub fn update_status(&self, update: impl FnOnce(&mut TelemetrySnapshot)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut guard.status);
    }
}
