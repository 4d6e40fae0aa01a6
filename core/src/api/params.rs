use crate::prelude::{ConsoleError, ConsoleResult};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Wire name of the ROI polygon field.
pub const ROI_KEY: &str = "roi_points";

/// Declared numeric type of a control parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    /// Integer 0/1 toggle.
    Flag,
}

impl ParamKind {
    /// Coerces widget text into this kind. Integers accept decimal text and
    /// truncate toward zero; floats reject non-finite input.
    pub fn coerce_text(self, text: &str) -> Option<ParamValue> {
        let text = text.trim();
        match self {
            ParamKind::Float => text
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(ParamValue::Float),
            ParamKind::Int | ParamKind::Flag => {
                let raw = text.parse::<i64>().ok().or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|value| value.is_finite())
                        .map(|value| value.trunc() as i64)
                })?;
                Some(self.integer(raw))
            }
        }
    }

    /// Coerces a JSON value into this kind, accepting numbers, numeric strings
    /// and booleans.
    pub fn coerce_json(self, value: &Value) -> Option<ParamValue> {
        match value {
            Value::Number(number) => match self {
                ParamKind::Float => number.as_f64().map(ParamValue::Float),
                ParamKind::Int | ParamKind::Flag => {
                    let raw = number.as_i64().or_else(|| {
                        number
                            .as_f64()
                            .filter(|value| value.is_finite())
                            .map(|value| value.trunc() as i64)
                    })?;
                    Some(self.integer(raw))
                }
            },
            Value::String(text) => self.coerce_text(text),
            Value::Bool(flag) => match self {
                ParamKind::Float => Some(ParamValue::Float(if *flag { 1.0 } else { 0.0 })),
                _ => Some(ParamValue::Int(i64::from(*flag))),
            },
            _ => None,
        }
    }

    fn integer(self, raw: i64) -> ParamValue {
        match self {
            ParamKind::Flag => ParamValue::Int(i64::from(raw != 0)),
            _ => ParamValue::Int(raw),
        }
    }
}

/// Console panel a parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamGroup {
    Vision,
    Drive,
    Steering,
    Lqr,
    Speed,
    Manual,
    Chassis,
}

/// A typed parameter value as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ParamValue::Int(value) => value as f64,
            ParamValue::Float(value) => value,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            ParamValue::Int(value) => value,
            ParamValue::Float(value) => value.trunc() as i64,
        }
    }

    fn to_json(self) -> Value {
        match self {
            ParamValue::Int(value) => Value::from(value),
            ParamValue::Float(value) => Value::from(value),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Named scalar control parameters understood by the robot service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    BinaryValue,
    CannyLowThreshold,
    HofThreshold,
    HofMinLineLen,
    HofMaxLineGap,
    AutoDrive,
    SteerMode,
    SteerCenter,
    SteerK,
    SteerInvert,
    LqrQ1,
    LqrQ2,
    LqrR,
    LqrDt,
    LqrVelocity,
    SpeedMode,
    MotorBase,
    MotorK,
    MotorMin,
    MotorMax,
    SpeedTarget,
    SpeedKp,
    SpeedKi,
    SpeedKd,
    SpeedDt,
    SpeedSlowdownGain,
    ManualMotor,
    ManualServo,
    ScsMode,
    Headlight,
}

impl ParamKey {
    pub const ALL: [ParamKey; 30] = [
        ParamKey::BinaryValue,
        ParamKey::CannyLowThreshold,
        ParamKey::HofThreshold,
        ParamKey::HofMinLineLen,
        ParamKey::HofMaxLineGap,
        ParamKey::AutoDrive,
        ParamKey::SteerMode,
        ParamKey::SteerCenter,
        ParamKey::SteerK,
        ParamKey::SteerInvert,
        ParamKey::LqrQ1,
        ParamKey::LqrQ2,
        ParamKey::LqrR,
        ParamKey::LqrDt,
        ParamKey::LqrVelocity,
        ParamKey::SpeedMode,
        ParamKey::MotorBase,
        ParamKey::MotorK,
        ParamKey::MotorMin,
        ParamKey::MotorMax,
        ParamKey::SpeedTarget,
        ParamKey::SpeedKp,
        ParamKey::SpeedKi,
        ParamKey::SpeedKd,
        ParamKey::SpeedDt,
        ParamKey::SpeedSlowdownGain,
        ParamKey::ManualMotor,
        ParamKey::ManualServo,
        ParamKey::ScsMode,
        ParamKey::Headlight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParamKey::BinaryValue => "binary_value",
            ParamKey::CannyLowThreshold => "canny_low_threshold",
            ParamKey::HofThreshold => "hof_threshold",
            ParamKey::HofMinLineLen => "hof_min_line_len",
            ParamKey::HofMaxLineGap => "hof_max_line_gap",
            ParamKey::AutoDrive => "auto_drive",
            ParamKey::SteerMode => "steer_mode",
            ParamKey::SteerCenter => "steer_center",
            ParamKey::SteerK => "steer_k",
            ParamKey::SteerInvert => "steer_invert",
            ParamKey::LqrQ1 => "lqr_q1",
            ParamKey::LqrQ2 => "lqr_q2",
            ParamKey::LqrR => "lqr_r",
            ParamKey::LqrDt => "lqr_dt",
            ParamKey::LqrVelocity => "lqr_velocity",
            ParamKey::SpeedMode => "speed_mode",
            ParamKey::MotorBase => "motor_base",
            ParamKey::MotorK => "motor_k",
            ParamKey::MotorMin => "motor_min",
            ParamKey::MotorMax => "motor_max",
            ParamKey::SpeedTarget => "speed_target",
            ParamKey::SpeedKp => "speed_kp",
            ParamKey::SpeedKi => "speed_ki",
            ParamKey::SpeedKd => "speed_kd",
            ParamKey::SpeedDt => "speed_dt",
            ParamKey::SpeedSlowdownGain => "speed_slowdown_gain",
            ParamKey::ManualMotor => "manual_motor",
            ParamKey::ManualServo => "manual_servo",
            ParamKey::ScsMode => "scs_mode",
            ParamKey::Headlight => "headlight",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    pub fn kind(self) -> ParamKind {
        match self {
            ParamKey::AutoDrive | ParamKey::Headlight => ParamKind::Flag,
            ParamKey::BinaryValue
            | ParamKey::CannyLowThreshold
            | ParamKey::HofThreshold
            | ParamKey::HofMinLineLen
            | ParamKey::HofMaxLineGap
            | ParamKey::SteerMode
            | ParamKey::SteerCenter
            | ParamKey::SteerInvert
            | ParamKey::SpeedMode
            | ParamKey::ManualServo
            | ParamKey::ScsMode => ParamKind::Int,
            _ => ParamKind::Float,
        }
    }

    pub fn group(self) -> ParamGroup {
        match self {
            ParamKey::BinaryValue
            | ParamKey::CannyLowThreshold
            | ParamKey::HofThreshold
            | ParamKey::HofMinLineLen
            | ParamKey::HofMaxLineGap => ParamGroup::Vision,
            ParamKey::AutoDrive => ParamGroup::Drive,
            ParamKey::SteerCenter | ParamKey::SteerK | ParamKey::SteerInvert => {
                ParamGroup::Steering
            }
            ParamKey::SteerMode
            | ParamKey::LqrQ1
            | ParamKey::LqrQ2
            | ParamKey::LqrR
            | ParamKey::LqrDt
            | ParamKey::LqrVelocity => ParamGroup::Lqr,
            ParamKey::SpeedMode
            | ParamKey::MotorBase
            | ParamKey::MotorK
            | ParamKey::MotorMin
            | ParamKey::MotorMax
            | ParamKey::SpeedTarget
            | ParamKey::SpeedKp
            | ParamKey::SpeedKi
            | ParamKey::SpeedKd
            | ParamKey::SpeedDt
            | ParamKey::SpeedSlowdownGain => ParamGroup::Speed,
            ParamKey::ManualMotor | ParamKey::ManualServo => ParamGroup::Manual,
            ParamKey::ScsMode | ParamKey::Headlight => ParamGroup::Chassis,
        }
    }

    pub fn default_value(self) -> ParamValue {
        use ParamValue::{Float, Int};
        match self {
            ParamKey::BinaryValue => Int(90),
            ParamKey::CannyLowThreshold => Int(68),
            ParamKey::HofThreshold => Int(40),
            ParamKey::HofMinLineLen => Int(20),
            ParamKey::HofMaxLineGap => Int(10),
            ParamKey::AutoDrive => Int(0),
            ParamKey::SteerMode => Int(0),
            ParamKey::SteerCenter => Int(1500),
            ParamKey::SteerK => Float(8.0),
            ParamKey::SteerInvert => Int(1),
            ParamKey::LqrQ1 => Float(5.0),
            ParamKey::LqrQ2 => Float(1.0),
            ParamKey::LqrR => Float(0.8),
            ParamKey::LqrDt => Float(0.05),
            ParamKey::LqrVelocity => Float(0.6),
            ParamKey::SpeedMode => Int(0),
            ParamKey::MotorBase => Float(0.10),
            ParamKey::MotorK => Float(0.002),
            ParamKey::MotorMin => Float(0.0),
            ParamKey::MotorMax => Float(0.18),
            ParamKey::SpeedTarget => Float(0.10),
            ParamKey::SpeedKp => Float(0.6),
            ParamKey::SpeedKi => Float(0.1),
            ParamKey::SpeedKd => Float(0.02),
            ParamKey::SpeedDt => Float(0.02),
            ParamKey::SpeedSlowdownGain => Float(0.002),
            ParamKey::ManualMotor => Float(0.0),
            ParamKey::ManualServo => Int(1500),
            ParamKey::ScsMode => Int(0),
            ParamKey::Headlight => Int(0),
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decodes a `[[x, y], ...]` list, skipping entries that are not numeric pairs.
pub fn decode_points(value: &Value) -> Option<Vec<[f64; 2]>> {
    let entries = value.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(|entry| match entry.as_array().map(Vec::as_slice) {
                Some([x, y]) => Some([x.as_f64()?, y.as_f64()?]),
                _ => None,
            })
            .collect(),
    )
}

/// Full parameter set mirrored from the robot service.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    values: BTreeMap<ParamKey, ParamValue>,
    roi_points: Vec<[f64; 2]>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            values: ParamKey::ALL
                .into_iter()
                .map(|key| (key, key.default_value()))
                .collect(),
            roi_points: Vec::new(),
        }
    }
}

impl ParameterSet {
    pub fn get(&self, key: ParamKey) -> ParamValue {
        self.values
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_value())
    }

    pub fn set(&mut self, key: ParamKey, value: ParamValue) {
        self.values.insert(key, value);
    }

    pub fn roi_points(&self) -> &[[f64; 2]] {
        &self.roi_points
    }

    pub fn set_roi_points(&mut self, points: Vec<[f64; 2]>) {
        self.roi_points = points;
    }

    /// Decodes a backend object field by field. Missing or malformed fields keep
    /// their defaults; only a non-object payload is rejected.
    pub fn from_json(value: &Value) -> ConsoleResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ConsoleError::Decode("parameter set is not an object".into()))?;
        let mut set = Self::default();
        for key in ParamKey::ALL {
            match object.get(key.name()) {
                None => {}
                Some(raw) => match key.kind().coerce_json(raw) {
                    Some(parsed) => set.set(key, parsed),
                    None => warn!("ignoring malformed parameter {key}: {raw}"),
                },
            }
        }
        if let Some(raw) = object.get(ROI_KEY) {
            match decode_points(raw) {
                Some(points) => set.roi_points = points,
                None => warn!("ignoring malformed {ROI_KEY}: {raw}"),
            }
        }
        Ok(set)
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for key in ParamKey::ALL {
            object.insert(key.name().to_string(), self.get(key).to_json());
        }
        object.insert(ROI_KEY.to_string(), points_to_json(&self.roi_points));
        Value::Object(object)
    }

    /// Merges a partial update, coercing each field to its declared kind.
    /// Fields that fail coercion are skipped; the returned patch lists what was
    /// applied.
    pub fn merge(&mut self, patch: &ParamPatch) -> ParamPatch {
        let mut changed = ParamPatch::default();
        for (name, raw) in patch.iter() {
            if name == ROI_KEY {
                match decode_points(raw) {
                    Some(points) => {
                        changed.set_roi(points.clone());
                        self.roi_points = points;
                    }
                    None => warn!("skipping malformed {ROI_KEY} update: {raw}"),
                }
                continue;
            }
            let Some(key) = ParamKey::from_name(name) else {
                continue;
            };
            match key.kind().coerce_json(raw) {
                Some(value) => {
                    self.set(key, value);
                    changed.insert(key, value);
                }
                None => warn!("skipping malformed update for {key}: {raw}"),
            }
        }
        changed
    }
}

impl Serialize for ParameterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ParameterSet::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn points_to_json(points: &[[f64; 2]]) -> Value {
    Value::Array(
        points
            .iter()
            .map(|[x, y]| Value::Array(vec![Value::from(*x), Value::from(*y)]))
            .collect(),
    )
}

/// Partial parameter update: any subset of fields, already coerced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamPatch(Map<String, Value>);

impl ParamPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ParamKey, value: ParamValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_roi(mut self, points: Vec<[f64; 2]>) -> Self {
        self.set_roi(points);
        self
    }

    pub fn insert(&mut self, key: ParamKey, value: ParamValue) {
        self.0.insert(key.name().to_string(), value.to_json());
    }

    pub fn set_roi(&mut self, points: Vec<[f64; 2]>) {
        self.0.insert(ROI_KEY.to_string(), points_to_json(&points));
    }

    pub fn value(&self, key: ParamKey) -> Option<ParamValue> {
        self.0
            .get(key.name())
            .and_then(|raw| key.kind().coerce_json(raw))
    }

    pub fn roi(&self) -> Option<Vec<[f64; 2]>> {
        self.0.get(ROI_KEY).and_then(decode_points)
    }

    pub fn has_roi(&self) -> bool {
        self.0.contains_key(ROI_KEY)
    }

    /// Overlays `other` on top of this patch; `other` wins on conflicts.
    pub fn merge(&mut self, other: ParamPatch) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
