use crate::api::{ParamPatch, ParameterSet, StreamName, TelemetrySnapshot};
use crate::prelude::{ConsoleError, ConsoleResult, RobotBackend};
use log::debug;
use std::future::Future;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ConsoleError::Decode(err.to_string())
        } else {
            ConsoleError::Transport(err.to_string())
        }
    }
}

/// `RobotBackend` over the robot service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> ConsoleResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ConsoleResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ConsoleError::Config(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

async fn ensure_success(response: reqwest::Response) -> ConsoleResult<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ConsoleError::Status { status, body })
    }
}

impl RobotBackend for HttpBackend {
    fn fetch_params(&self) -> impl Future<Output = ConsoleResult<ParameterSet>> + Send + 'static {
        let request = self.client.get(self.api("params"));
        async move {
            let response = ensure_success(request.send().await?).await?;
            Ok(response.json::<ParameterSet>().await?)
        }
    }

    fn push_params(
        &self,
        patch: ParamPatch,
    ) -> impl Future<Output = ConsoleResult<()>> + Send + 'static {
        let request = self.client.post(self.api("params")).json(&patch);
        async move {
            debug!("POST params with {} field(s)", patch.len());
            ensure_success(request.send().await?).await?;
            Ok(())
        }
    }

    fn estop(&self) -> impl Future<Output = ConsoleResult<()>> + Send + 'static {
        let request = self.client.post(self.api("estop"));
        async move {
            ensure_success(request.send().await?).await?;
            Ok(())
        }
    }

    fn fetch_status(
        &self,
    ) -> impl Future<Output = ConsoleResult<TelemetrySnapshot>> + Send + 'static {
        let request = self.client.get(self.api("status"));
        async move {
            let response = ensure_success(request.send().await?).await?;
            Ok(response.json::<TelemetrySnapshot>().await?)
        }
    }

    fn stream_url(&self, stream: StreamName, cache_bust: u64) -> String {
        format!("{}/stream/{}?t={}", self.base_url, stream, cache_bust)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ParamKey, ParamValue};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use warp::Filter;

    async fn spawn_backend(store: Arc<Mutex<ParameterSet>>) -> String {
        let get_store = store.clone();
        let get_params = warp::path!("api" / "params")
            .and(warp::get())
            .map(move || warp::reply::json(&*get_store.lock().unwrap()));
        let post_params = warp::path!("api" / "params")
            .and(warp::post())
            .and(warp::body::json())
            .map(move |patch: ParamPatch| {
                let changed = store.lock().unwrap().merge(&patch);
                warp::reply::json(&json!({"ok": true, "changed": changed}))
            });
        let status = warp::path!("api" / "status").map(|| {
            warp::reply::json(&json!({
                "fps": 30.0,
                "err": 4.0,
                "mode": "manual",
                "overlay": {"frame": {"w": 320, "h": 240}, "lines": [], "roi": []}
            }))
        });
        let routes = get_params.or(post_params).or(status);
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn push_then_fetch_reflects_backend_merge() {
        let store = Arc::new(Mutex::new(ParameterSet::default()));
        let backend = HttpBackend::new(spawn_backend(store).await).unwrap();

        let patch = ParamPatch::new()
            .with(ParamKey::SteerK, ParamValue::Float(6.5))
            .with_roi(vec![[0.1, 0.1], [0.9, 0.1], [0.5, 0.9]]);
        backend.push_params(patch).await.unwrap();

        let params = backend.fetch_params().await.unwrap();
        assert_eq!(params.get(ParamKey::SteerK), ParamValue::Float(6.5));
        assert_eq!(params.roi_points().len(), 3);

        let status = backend.fetch_status().await.unwrap();
        assert_eq!(status.err, 4.0);
        assert!(status.overlay.unwrap().has_reference());
    }

    #[tokio::test]
    async fn missing_route_surfaces_status_error() {
        let store = Arc::new(Mutex::new(ParameterSet::default()));
        let backend = HttpBackend::new(spawn_backend(store).await).unwrap();
        let err = backend.estop().await.unwrap_err();
        assert!(matches!(err, ConsoleError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_failure() {
        let backend =
            HttpBackend::with_timeout("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            backend.fetch_status().await,
            Err(ConsoleError::Transport(_))
        ));
    }

    #[test]
    fn stream_url_carries_cache_bust() {
        let backend = HttpBackend::new("http://robot.local:5001/").unwrap();
        assert_eq!(
            backend.stream_url(StreamName::Canny, 42),
            "http://robot.local:5001/stream/canny?t=42"
        );
    }
}
