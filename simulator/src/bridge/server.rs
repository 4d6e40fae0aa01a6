use crate::bridge::model::SharedState;
use linebotcore::api::{ParamPatch, StreamName};
use log::{info, warn};
use serde_json::json;
use std::net::SocketAddr;
use warp::{http::StatusCode, hyper::body::Bytes, Filter, Rejection, Reply};

/// HTTP surface of the simulated robot service.
pub fn routes(
    state: SharedState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let get_params = warp::path!("api" / "params")
        .and(warp::get())
        .and(state_filter.clone())
        .map(|state: SharedState| warp::reply::json(&state.params()));

    let post_params = warp::path!("api" / "params")
        .and(warp::post())
        .and(warp::body::bytes())
        .and(state_filter.clone())
        .map(|body: Bytes, state: SharedState| {
            let patch = decode_patch(&body);
            let (changed, params) = state.merge_params(&patch);
            if !changed.is_empty() {
                info!("applied {} parameter field(s)", changed.len());
            }
            warp::reply::json(&json!({ "ok": true, "changed": changed, "params": params }))
        });

    let status = warp::path!("api" / "status")
        .and(warp::get())
        .and(state_filter.clone())
        .map(|state: SharedState| warp::reply::json(&state.status()));

    let estop = warp::path!("api" / "estop")
        .and(warp::post())
        .and(state_filter)
        .map(|state: SharedState| {
            warn!("emergency stop requested");
            let params = state.estop();
            warp::reply::json(&json!({ "ok": true, "params": params }))
        });

    let stream = warp::path!("stream" / String)
        .and(warp::get())
        .map(|name: String| match name.parse::<StreamName>() {
            Ok(stream) => warp::reply::with_status(
                warp::reply::with_header(placeholder_frame(stream), "content-type", "image/svg+xml"),
                StatusCode::OK,
            ),
            Err(_) => warp::reply::with_status(
                warp::reply::with_header(String::new(), "content-type", "text/plain"),
                StatusCode::NOT_FOUND,
            ),
        });

    get_params.or(post_params).or(status).or(estop).or(stream)
}

/// Lenient request body: anything but a JSON object is an empty update.
fn decode_patch(body: &[u8]) -> ParamPatch {
    match serde_json::from_slice::<ParamPatch>(body) {
        Ok(patch) => patch,
        Err(err) => {
            warn!("treating malformed parameter body as empty: {err}");
            ParamPatch::default()
        }
    }
}

fn placeholder_frame(stream: StreamName) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"320\" height=\"240\">\
         <rect width=\"320\" height=\"240\" fill=\"#1f2430\"/>\
         <text x=\"160\" y=\"124\" fill=\"#c8c8c8\" text-anchor=\"middle\">{stream}</text></svg>"
    )
}

pub async fn serve(state: SharedState, bind: SocketAddr) {
    info!("robot service listening on http://{bind}");
    warp::serve(routes(state)).run(bind).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use linebotcore::api::{ParamKey, ParamValue, ParameterSet, TelemetrySnapshot};
    use serde_json::Value;

    fn state() -> SharedState {
        SharedState::new(ParameterSet::default())
    }

    #[tokio::test]
    async fn post_merges_and_echoes_changes() {
        let state = state();
        let response = warp::test::request()
            .method("POST")
            .path("/api/params")
            .body(r#"{"steer_k": "4.5", "unknown": 1, "roi_points": [[0.1,0.1],[0.9,0.1],[0.5,0.9]]}"#)
            .reply(&routes(state.clone()))
            .await;
        assert_eq!(response.status(), 200);

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["changed"]["steer_k"], 4.5);
        assert!(body["changed"].get("unknown").is_none());
        assert_eq!(state.params().get(ParamKey::SteerK), ParamValue::Float(4.5));
        assert_eq!(state.params().roi_points().len(), 3);
    }

    #[tokio::test]
    async fn malformed_body_is_an_empty_update() {
        let state = state();
        let response = warp::test::request()
            .method("POST")
            .path("/api/params")
            .body("not json")
            .reply(&routes(state.clone()))
            .await;
        assert_eq!(response.status(), 200);
        assert_eq!(state.params(), ParameterSet::default());
    }

    #[tokio::test]
    async fn params_and_status_round_trip_through_core_types() {
        let state = state();
        state.update_status(|status| {
            status.err = -3.0;
            status.running = true;
        });
        let filter = routes(state);

        let response = warp::test::request().path("/api/params").reply(&filter).await;
        let params: ParameterSet = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(params, ParameterSet::default());

        let response = warp::test::request().path("/api/status").reply(&filter).await;
        let status: TelemetrySnapshot = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(status.err, -3.0);
        assert!(status.running);
    }

    #[tokio::test]
    async fn estop_disables_auto_drive() {
        let mut params = ParameterSet::default();
        params.set(ParamKey::AutoDrive, ParamValue::Int(1));
        let state = SharedState::new(params);
        let response = warp::test::request()
            .method("POST")
            .path("/api/estop")
            .reply(&routes(state.clone()))
            .await;
        assert_eq!(response.status(), 200);
        assert_eq!(state.params().get(ParamKey::AutoDrive), ParamValue::Int(0));
    }

    #[tokio::test]
    async fn unknown_stream_is_not_found() {
        let filter = routes(state());
        let ok = warp::test::request().path("/stream/canny").reply(&filter).await;
        assert_eq!(ok.status(), 200);
        let missing = warp::test::request().path("/stream/thermal").reply(&filter).await;
        assert_eq!(missing.status(), 404);
    }
}
