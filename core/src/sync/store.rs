use crate::api::{ParamPatch, ParameterSet};
use crate::prelude::{ConsoleResult, RobotBackend};
use log::{info, warn};
use std::future::Future;

/// Outcome of a write followed by the reconciling read.
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub write: ConsoleResult<()>,
    pub read: ConsoleResult<ParameterSet>,
}

/// Last backend-confirmed parameter set plus the round-trips that refresh it.
///
/// The round-trip futures own a clone of the backend, so the caller's loop is
/// never borrowed while a request is in flight. Their results are folded back
/// with [`ParameterStore::apply`].
#[derive(Debug, Clone)]
pub struct ParameterStore<B> {
    backend: B,
    mirror: ParameterSet,
    revision: u64,
}

impl<B: RobotBackend> ParameterStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            mirror: ParameterSet::default(),
            revision: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn mirror(&self) -> &ParameterSet {
        &self.mirror
    }

    /// Number of loads applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the mirror has been confirmed by the backend at least once.
    pub fn is_confirmed(&self) -> bool {
        self.revision > 0
    }

    /// Fetches the full parameter set.
    pub fn load(&self) -> impl Future<Output = ConsoleResult<ParameterSet>> + Send + 'static {
        let backend = self.backend.clone();
        async move { backend.fetch_params().await }
    }

    /// Posts `patch`, then reloads regardless of whether the post succeeded.
    pub fn commit(&self, patch: ParamPatch) -> impl Future<Output = CommitReport> + Send + 'static {
        let backend = self.backend.clone();
        async move {
            let fields = patch.len();
            let write = backend.push_params(patch).await;
            match &write {
                Ok(()) => info!("committed {fields} parameter field(s)"),
                Err(err) => warn!("parameter commit failed: {err}"),
            }
            let read = backend.fetch_params().await;
            CommitReport { write, read }
        }
    }

    /// Fire-and-forget emergency stop followed by a reload.
    pub fn estop(&self) -> impl Future<Output = CommitReport> + Send + 'static {
        let backend = self.backend.clone();
        async move {
            let write = backend.estop().await;
            if let Err(err) = &write {
                warn!("estop request failed: {err}");
            }
            let read = backend.fetch_params().await;
            CommitReport { write, read }
        }
    }

    /// Replaces the mirror wholesale on success. A failed load is logged and
    /// the previous mirror stays untouched.
    pub fn apply(&mut self, outcome: ConsoleResult<ParameterSet>) -> Option<&ParameterSet> {
        match outcome {
            Ok(set) => {
                self.mirror = set;
                self.revision += 1;
                Some(&self.mirror)
            }
            Err(err) => {
                warn!("parameter load failed, keeping previous values: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{ParamKey, ParamValue, StreamName, TelemetrySnapshot};
    use crate::prelude::ConsoleError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// In-memory backend that records writes and can be told to fail.
    #[derive(Clone, Default)]
    pub(crate) struct FakeBackend {
        pub params: Arc<Mutex<ParameterSet>>,
        pub writes: Arc<Mutex<Vec<ParamPatch>>>,
        pub fail_writes: Arc<Mutex<bool>>,
        pub fail_reads: Arc<Mutex<bool>>,
        pub statuses: Arc<Mutex<VecDeque<ConsoleResult<TelemetrySnapshot>>>>,
    }

    fn offline() -> ConsoleError {
        ConsoleError::Transport("connection refused".into())
    }

    impl RobotBackend for FakeBackend {
        fn fetch_params(
            &self,
        ) -> impl Future<Output = ConsoleResult<ParameterSet>> + Send + 'static {
            let outcome = if *self.fail_reads.lock().unwrap() {
                Err(offline())
            } else {
                Ok(self.params.lock().unwrap().clone())
            };
            async move { outcome }
        }

        fn push_params(
            &self,
            patch: ParamPatch,
        ) -> impl Future<Output = ConsoleResult<()>> + Send + 'static {
            let outcome = if *self.fail_writes.lock().unwrap() {
                Err(offline())
            } else {
                self.params.lock().unwrap().merge(&patch);
                self.writes.lock().unwrap().push(patch);
                Ok(())
            };
            async move { outcome }
        }

        fn estop(&self) -> impl Future<Output = ConsoleResult<()>> + Send + 'static {
            let mut params = self.params.lock().unwrap();
            params.set(ParamKey::AutoDrive, ParamValue::Int(0));
            params.set(ParamKey::ManualMotor, ParamValue::Float(0.0));
            params.set(ParamKey::ManualServo, ParamValue::Int(1500));
            async { Ok(()) }
        }

        fn fetch_status(
            &self,
        ) -> impl Future<Output = ConsoleResult<TelemetrySnapshot>> + Send + 'static {
            let outcome = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(offline()));
            async move { outcome }
        }

        fn stream_url(&self, stream: StreamName, cache_bust: u64) -> String {
            format!("fake://stream/{stream}?t={cache_bust}")
        }
    }

    #[tokio::test]
    async fn commit_writes_then_reloads_confirmed_values() {
        let backend = FakeBackend::default();
        let mut store = ParameterStore::new(backend.clone());
        let patch = ParamPatch::new().with(ParamKey::SteerK, ParamValue::Float(3.0));

        let report = store.commit(patch).await;
        assert!(report.write.is_ok());
        let mirror = store.apply(report.read).unwrap();
        assert_eq!(mirror.get(ParamKey::SteerK), ParamValue::Float(3.0));
        assert_eq!(backend.writes.lock().unwrap().len(), 1);
        assert!(store.is_confirmed());
    }

    #[tokio::test]
    async fn failed_write_still_reloads() {
        let backend = FakeBackend::default();
        backend
            .params
            .lock()
            .unwrap()
            .set(ParamKey::BinaryValue, ParamValue::Int(111));
        *backend.fail_writes.lock().unwrap() = true;
        let mut store = ParameterStore::new(backend);

        let report = store
            .commit(ParamPatch::new().with(ParamKey::BinaryValue, ParamValue::Int(5)))
            .await;
        assert!(report.write.is_err());
        let mirror = store.apply(report.read).unwrap();
        assert_eq!(mirror.get(ParamKey::BinaryValue), ParamValue::Int(111));
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_mirror() {
        let backend = FakeBackend::default();
        backend
            .params
            .lock()
            .unwrap()
            .set(ParamKey::HofThreshold, ParamValue::Int(33));
        let mut store = ParameterStore::new(backend.clone());
        let loaded = tokio::spawn(store.load()).await.unwrap();
        store.apply(loaded);

        *backend.fail_reads.lock().unwrap() = true;
        let loaded = tokio::spawn(store.load()).await.unwrap();
        assert!(store.apply(loaded).is_none());
        assert_eq!(store.mirror().get(ParamKey::HofThreshold), ParamValue::Int(33));
        assert_eq!(store.revision(), 1);
    }

    #[tokio::test]
    async fn estop_reloads_stopped_state() {
        let backend = FakeBackend::default();
        backend
            .params
            .lock()
            .unwrap()
            .set(ParamKey::AutoDrive, ParamValue::Int(1));
        let mut store = ParameterStore::new(backend);
        let report = store.estop().await;
        let mirror = store.apply(report.read).unwrap();
        assert_eq!(mirror.get(ParamKey::AutoDrive), ParamValue::Int(0));
    }
}
