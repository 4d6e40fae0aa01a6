use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Falls back to `T::default()` when the field is present but malformed.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps the well-formed elements of a sequence and drops the rest.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Reference frame the overlay geometry was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSize {
    #[serde(deserialize_with = "lenient")]
    pub w: f64,
    #[serde(deserialize_with = "lenient")]
    pub h: f64,
}

impl FrameSize {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn is_positive(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }
}

/// Detected line segment in source-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Detection geometry reported with each status snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayPayload {
    #[serde(deserialize_with = "lenient")]
    pub frame: FrameSize,
    #[serde(deserialize_with = "lenient_seq")]
    pub lines: Vec<Segment>,
    #[serde(deserialize_with = "lenient_seq")]
    pub roi: Vec<[f64; 2]>,
}

impl OverlayPayload {
    pub fn has_reference(&self) -> bool {
        self.frame.is_positive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Auto,
    #[default]
    Manual,
}

/// Status report returned by `GET /status`. Each fetch replaces the previous one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySnapshot {
    #[serde(deserialize_with = "lenient")]
    pub fps: f64,
    #[serde(deserialize_with = "lenient")]
    pub err: f64,
    #[serde(deserialize_with = "lenient")]
    pub servo_position: f64,
    #[serde(deserialize_with = "lenient")]
    pub motor_duty: f64,
    #[serde(deserialize_with = "lenient")]
    pub running: bool,
    #[serde(deserialize_with = "lenient")]
    pub mode: RunMode,
    #[serde(deserialize_with = "lenient")]
    pub camera_connected: bool,
    #[serde(deserialize_with = "lenient")]
    pub camera_error: String,
    #[serde(deserialize_with = "lenient")]
    pub chassis_connected: bool,
    #[serde(deserialize_with = "lenient")]
    pub chassis_error: String,
    #[serde(deserialize_with = "lenient")]
    pub overlay: Option<OverlayPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_decodes_full_payload() {
        let snapshot: TelemetrySnapshot = serde_json::from_value(json!({
            "fps": 29.5,
            "err": -3.25,
            "servo_position": 1480,
            "motor_duty": 0.08,
            "running": true,
            "camera_connected": true,
            "chassis_connected": false,
            "chassis_error": "open /dev/ttyTHS1 failed",
            "mode": "auto",
            "overlay": {
                "frame": {"w": 320, "h": 240},
                "lines": [{"x1": 10, "y1": 240, "x2": 120, "y2": 90}],
                "roi": [[0, 240], [320, 240], [160, 60]]
            }
        }))
        .unwrap();
        assert_eq!(snapshot.mode, RunMode::Auto);
        assert_eq!(snapshot.servo_position, 1480.0);
        let overlay = snapshot.overlay.unwrap();
        assert!(overlay.has_reference());
        assert_eq!(overlay.lines.len(), 1);
        assert_eq!(overlay.roi.len(), 3);
    }

    #[test]
    fn malformed_fields_default_individually() {
        let snapshot: TelemetrySnapshot = serde_json::from_value(json!({
            "fps": "fast",
            "err": 12.0,
            "mode": "hover",
            "overlay": {
                "frame": {"w": "wide", "h": 240},
                "lines": [{"x1": 1, "y1": 2, "x2": 3, "y2": 4}, {"x1": "bad"}]
            }
        }))
        .unwrap();
        assert_eq!(snapshot.fps, 0.0);
        assert_eq!(snapshot.err, 12.0);
        assert_eq!(snapshot.mode, RunMode::Manual);
        let overlay = snapshot.overlay.unwrap();
        assert!(!overlay.has_reference());
        assert_eq!(overlay.lines, vec![Segment::new(1.0, 2.0, 3.0, 4.0)]);
    }

    #[test]
    fn null_overlay_is_absent() {
        let snapshot: TelemetrySnapshot =
            serde_json::from_value(json!({"fps": 10, "overlay": null})).unwrap();
        assert!(snapshot.overlay.is_none());
    }
}
