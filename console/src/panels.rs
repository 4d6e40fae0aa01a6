use crate::app::Message;
use iced::{
    widget::{column, row, text, text_input, Column, Container},
    Alignment, Color, Element, Length,
};
use linebotcore::api::{ParamKey, TelemetrySnapshot};
use linebotcore::sync::ParamForm;
use linebotcore::telemetry::{ActivityLog, LinkMetrics, LinkState};

pub const VISION_KEYS: &[ParamKey] = &[
    ParamKey::BinaryValue,
    ParamKey::CannyLowThreshold,
    ParamKey::HofThreshold,
    ParamKey::HofMinLineLen,
    ParamKey::HofMaxLineGap,
];
pub const STEERING_KEYS: &[ParamKey] = &[
    ParamKey::SteerCenter,
    ParamKey::SteerK,
    ParamKey::SteerInvert,
];
pub const LQR_KEYS: &[ParamKey] = &[
    ParamKey::SteerMode,
    ParamKey::LqrQ1,
    ParamKey::LqrQ2,
    ParamKey::LqrR,
    ParamKey::LqrDt,
    ParamKey::LqrVelocity,
];
pub const MANUAL_KEYS: &[ParamKey] = &[ParamKey::ManualMotor, ParamKey::ManualServo];
pub const CHASSIS_KEYS: &[ParamKey] = &[ParamKey::ScsMode, ParamKey::Headlight];

const LINEAR_SPEED_KEYS: &[ParamKey] = &[
    ParamKey::SpeedMode,
    ParamKey::MotorBase,
    ParamKey::MotorK,
    ParamKey::MotorMin,
    ParamKey::MotorMax,
];
const PID_SPEED_KEYS: &[ParamKey] = &[
    ParamKey::SpeedMode,
    ParamKey::MotorMin,
    ParamKey::MotorMax,
    ParamKey::SpeedTarget,
    ParamKey::SpeedKp,
    ParamKey::SpeedKi,
    ParamKey::SpeedKd,
    ParamKey::SpeedDt,
    ParamKey::SpeedSlowdownGain,
];

const OK_COLOR: Color = Color {
    r: 0.35,
    g: 0.8,
    b: 0.45,
    a: 1.0,
};
const FAULT_COLOR: Color = Color {
    r: 0.95,
    g: 0.4,
    b: 0.35,
    a: 1.0,
};
const IDLE_COLOR: Color = Color {
    r: 0.7,
    g: 0.7,
    b: 0.7,
    a: 1.0,
};

fn field_row(form: &ParamForm, key: ParamKey) -> Element<'_, Message> {
    row![
        text(key.name()).size(13).width(Length::Fixed(170.0)),
        text_input(&key.default_value().to_string(), form.text(key))
            .on_input(move |value| Message::FieldEdited(key, value))
            .padding(4),
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}

/// Titled block of text inputs; keys the form does not track are skipped.
pub fn group_panel<'a>(
    title: &'a str,
    form: &'a ParamForm,
    keys: &[ParamKey],
) -> Element<'a, Message> {
    keys.iter()
        .copied()
        .filter(|key| form.is_tracked(*key))
        .fold(
            Column::new().spacing(4).push(text(title).size(18)),
            |panel, key| panel.push(field_row(form, key)),
        )
        .into()
}

/// Speed fields for whichever controller `speed_mode` selects (1 = PID).
pub fn speed_panel(form: &ParamForm) -> Element<'_, Message> {
    let pid = form
        .value(ParamKey::SpeedMode)
        .is_some_and(|mode| mode.as_i64() == 1);
    if pid {
        group_panel("Speed (PID)", form, PID_SPEED_KEYS)
    } else {
        group_panel("Speed (linear)", form, LINEAR_SPEED_KEYS)
    }
}

pub fn link_indicator<'a>(link: LinkState, metrics: &LinkMetrics) -> Element<'a, Message> {
    let (label, color) = match link {
        LinkState::Connecting => ("Connecting...", IDLE_COLOR),
        LinkState::Connected => ("Connected", OK_COLOR),
        LinkState::Disconnected => ("Disconnected", FAULT_COLOR),
    };
    let (succeeded, failed) = metrics.snapshot();
    let detail = if metrics.failure_streak() > 0 {
        format!(
            "{succeeded} ok / {failed} failed, {} in a row",
            metrics.failure_streak()
        )
    } else {
        format!("{succeeded} ok / {failed} failed")
    };
    row![text(label).size(16).color(color), text(detail).size(12)]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
}

fn tile<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    Container::new(column![text(label).size(12), text(value).size(18)].spacing(2))
        .padding(6)
        .width(Length::Fixed(96.0))
        .into()
}

fn chip<'a>(label: &'a str, connected: bool, error: &'a str) -> Element<'a, Message> {
    let (state, color) = if connected {
        ("connected", OK_COLOR)
    } else {
        ("disconnected", FAULT_COLOR)
    };
    let mut chip = row![
        text(label).size(13),
        text(state).size(13).color(color)
    ]
    .spacing(6)
    .align_y(Alignment::Center);
    if !connected && !error.is_empty() {
        chip = chip.push(text(error).size(12));
    }
    chip.into()
}

/// Metric tiles and device chips for the latest snapshot.
pub fn status_tiles(snapshot: Option<&TelemetrySnapshot>) -> Element<'_, Message> {
    let Some(snapshot) = snapshot else {
        return text("No telemetry yet").size(14).into();
    };
    let mode = if snapshot.running {
        format!("{:?}", snapshot.mode).to_lowercase()
    } else {
        "stopped".into()
    };
    column![
        row![
            tile("FPS", format!("{:.1}", snapshot.fps)),
            tile("Mode", mode),
            tile("Error", format!("{:.1}", snapshot.err)),
            tile("Servo", format!("{:.0}", snapshot.servo_position)),
            tile("Motor", format!("{:.3}", snapshot.motor_duty)),
        ]
        .spacing(6),
        chip("Camera", snapshot.camera_connected, &snapshot.camera_error),
        chip("Chassis", snapshot.chassis_connected, &snapshot.chassis_error),
    ]
    .spacing(6)
    .into()
}

pub fn activity_list(activity: &ActivityLog) -> Column<'_, Message> {
    if activity.is_empty() {
        Column::new().push(text("No activity yet").size(12))
    } else {
        activity
            .recent()
            .fold(Column::new().spacing(4), |col, entry| {
                col.push(text(entry).size(12))
            })
    }
}
