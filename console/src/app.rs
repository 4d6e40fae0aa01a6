use crate::canvas::{OverlayCanvas, SparklineCanvas, SteeringGauge};
use crate::config::{ConsoleConfig, Features};
use crate::panels;
use iced::{
    task,
    widget::{button, column, pick_list, row, scrollable, text, Canvas, Column, Container},
    Alignment, Element, Length, Task,
};
use linebotcore::api::{
    HttpBackend, ParamKey, ParamPatch, ParamValue, ParameterSet, StreamName, TelemetrySnapshot,
};
use linebotcore::render::{OverlayRenderer, Sparkline, ERROR_RANGE, MOTOR_DUTY_RANGE};
use linebotcore::roi::{RoiEditor, RoiIntent};
use linebotcore::sync::{CommitReport, ParamForm, ParameterStore, SyncScheduler, SyncTicket};
use linebotcore::telemetry::{steering_offset, ActivityLog, LinkState, StatusPoller};
use linebotcore::{ConsoleResult, RobotBackend};
use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum Message {
    ParamsLoaded(ConsoleResult<ParameterSet>),
    FieldEdited(ParamKey, String),
    ToggleAutoDrive,
    ApplyManual,
    Estop,
    SyncDue(SyncTicket),
    Committed(CommitReport),
    Stopped(CommitReport),
    Roi(RoiIntent),
    StatusFetched(ConsoleResult<TelemetrySnapshot>),
    StreamSelected(StreamName),
    RefreshStream,
}

/// Operator console state. Everything is mutated on the iced update loop;
/// network round-trips and timers run as tasks whose results come back as
/// messages.
pub struct Console {
    features: Features,
    store: ParameterStore<HttpBackend>,
    form: ParamForm,
    scheduler: SyncScheduler,
    loading: bool,
    sync_timer: Option<task::Handle>,
    editor: RoiEditor,
    poller: StatusPoller<HttpBackend>,
    poll_task: Option<task::Handle>,
    activity: ActivityLog,
    overlay: OverlayRenderer,
    stream: StreamName,
    stream_url: String,
}

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

impl Console {
    pub fn new(config: &ConsoleConfig, backend: HttpBackend) -> Self {
        let stream_url = backend.stream_url(config.default_stream, now_millis());
        Self {
            features: config.features,
            store: ParameterStore::new(backend.clone()),
            form: ParamForm::for_groups(&config.tracked_groups()),
            scheduler: SyncScheduler::new(config.timing.debounce()),
            loading: false,
            sync_timer: None,
            editor: RoiEditor::new(),
            poller: StatusPoller::new(
                backend,
                config.timing.poll_interval(),
                config.history_capacity,
            ),
            poll_task: None,
            activity: ActivityLog::new(),
            overlay: OverlayRenderer::default(),
            stream: config.default_stream,
            stream_url,
        }
    }

    /// Initial parameter load plus the first link of the poll chain.
    pub fn boot(config: ConsoleConfig, backend: HttpBackend) -> (Self, Task<Message>) {
        let mut console = Self::new(&config, backend);
        let load = console.reload();
        let fetch = console.poller.fetch();
        let poll = console.poll(fetch);
        (console, Task::batch([load, poll]))
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ParamsLoaded(outcome) => {
                self.loading = false;
                self.apply_load(outcome)
            }
            Message::FieldEdited(key, value) => {
                if self.form.set_text(key, value) {
                    let ticket = self.scheduler.request_sync(None);
                    self.schedule(ticket)
                } else {
                    Task::none()
                }
            }
            Message::ToggleAutoDrive => {
                let enabled = self.auto_drive_enabled();
                self.form
                    .set_value(ParamKey::AutoDrive, ParamValue::Int(i64::from(!enabled)));
                self.activity.record(if enabled {
                    "switched to manual drive"
                } else {
                    "switched to auto drive"
                });
                let ticket = self.scheduler.request_sync(None);
                self.schedule(ticket)
            }
            Message::ApplyManual => {
                self.form.set_value(ParamKey::AutoDrive, ParamValue::Int(0));
                let mut extra = ParamPatch::new().with(ParamKey::AutoDrive, ParamValue::Int(0));
                for key in [ParamKey::ManualMotor, ParamKey::ManualServo] {
                    if let Some(value) = self.form.value(key) {
                        extra.insert(key, value);
                    }
                }
                self.activity.record(format!(
                    "manual drive: motor {} servo {}",
                    self.form.text(ParamKey::ManualMotor),
                    self.form.text(ParamKey::ManualServo)
                ));
                let ticket = self.scheduler.request_sync(Some(extra));
                self.schedule(ticket)
            }
            Message::Estop => {
                self.scheduler.cancel();
                self.sync_timer = None;
                self.activity.record("emergency stop");
                Task::perform(self.store.estop(), Message::Stopped)
            }
            Message::SyncDue(ticket) => self.flush(ticket),
            Message::Committed(report) => {
                match &report.write {
                    Ok(()) => self.activity.record("parameters synced"),
                    Err(err) => self.activity.record(format!("parameter sync failed: {err}")),
                }
                self.apply_load(report.read)
            }
            Message::Stopped(report) => {
                match &report.write {
                    Ok(()) => self.activity.record("emergency stop confirmed"),
                    Err(err) => self.activity.record(format!("emergency stop failed: {err}")),
                }
                self.apply_load(report.read)
            }
            Message::Roi(intent) => match self.editor.handle(intent, &mut self.scheduler) {
                Some(ticket) if intent == RoiIntent::Clear => {
                    self.activity.record("ROI cleared");
                    self.flush(ticket)
                }
                Some(ticket) => {
                    if !self.editor.is_editing() {
                        self.activity.record(format!(
                            "ROI edit finished with {} point(s)",
                            self.editor.draft().len()
                        ));
                    }
                    self.schedule(ticket)
                }
                None => Task::none(),
            },
            Message::StatusFetched(outcome) => {
                let before = self.poller.link();
                let link = self.poller.apply(outcome, now_seconds());
                if link != before {
                    self.activity.record(match link {
                        LinkState::Connected => "robot connected",
                        LinkState::Disconnected => "robot link lost",
                        LinkState::Connecting => "connecting to robot",
                    });
                }
                let fetch = self.poller.fetch_after_interval();
                let next = self.poll(fetch);
                if link == LinkState::Connected && !self.store.is_confirmed() {
                    Task::batch([next, self.reload()])
                } else {
                    next
                }
            }
            Message::StreamSelected(stream) => {
                self.stream = stream;
                self.refresh_stream();
                Task::none()
            }
            Message::RefreshStream => {
                self.refresh_stream();
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let drive_label = if self.auto_drive_enabled() {
            "Auto drive: ON"
        } else {
            "Auto drive: OFF"
        };
        let edit_label = if self.editor.is_editing() {
            "Finish ROI"
        } else {
            "Edit ROI"
        };

        let mut controls = Column::new()
            .spacing(10)
            .push(text("Parameters").size(26))
            .push(
                row![
                    button(drive_label)
                        .on_press(Message::ToggleAutoDrive)
                        .padding(8),
                    button("E-STOP").on_press(Message::Estop).padding(8),
                ]
                .spacing(10),
            )
            .push(panels::group_panel("Vision", &self.form, panels::VISION_KEYS))
            .push(panels::group_panel("Steering", &self.form, panels::STEERING_KEYS));
        if self.features.speed_panel {
            controls = controls.push(panels::speed_panel(&self.form));
        }
        if self.features.lqr_panel {
            controls = controls.push(panels::group_panel("LQR", &self.form, panels::LQR_KEYS));
        }
        let controls = controls
            .push(panels::group_panel("Manual", &self.form, panels::MANUAL_KEYS))
            .push(
                button("Apply manual")
                    .on_press(Message::ApplyManual)
                    .padding(8),
            )
            .push(panels::group_panel("Chassis", &self.form, panels::CHASSIS_KEYS))
            .push(text(self.mirror_caption()).size(12))
            .padding(16)
            .width(Length::Fixed(380.0));

        let overlay = Canvas::new(OverlayCanvas {
            overlay: self.poller.overlay(),
            draft: self.editor.draft(),
            editing: self.editor.is_editing(),
            renderer: &self.overlay,
        })
        .width(Length::Fixed(480.0))
        .height(Length::Fixed(360.0));

        let stream_bar = row![
            pick_list(StreamName::ALL, Some(self.stream), Message::StreamSelected),
            button("Refresh").on_press(Message::RefreshStream).padding(6),
            text(&self.stream_url).size(12),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let roi_bar = row![
            button(edit_label)
                .on_press(Message::Roi(RoiIntent::ToggleEdit))
                .padding(6),
            button("Clear ROI")
                .on_press(Message::Roi(RoiIntent::Clear))
                .padding(6),
            text(format!("{} ROI point(s)", self.editor.draft().len())).size(12),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let history = self.poller.history();
        let err_line = Canvas::new(SparklineCanvas {
            line: Sparkline::new(Some(ERROR_RANGE)),
            history: &history.error,
        })
        .width(Length::Fill)
        .height(Length::Fixed(60.0));
        let motor_line = Canvas::new(SparklineCanvas {
            line: Sparkline::new(Some(MOTOR_DUTY_RANGE)),
            history: &history.motor_duty,
        })
        .width(Length::Fill)
        .height(Length::Fixed(60.0));

        let offset = self
            .poller
            .snapshot()
            .map_or(0.0, |snapshot| steering_offset(snapshot.err));
        let gauge = Canvas::new(SteeringGauge { offset })
            .width(Length::Fill)
            .height(Length::Fixed(24.0));

        let telemetry_column = column![
            text("Telemetry").size(26),
            panels::link_indicator(self.poller.link(), self.poller.metrics()),
            stream_bar,
            overlay,
            roi_bar,
            panels::status_tiles(self.poller.snapshot()),
            text("Steering offset").size(16),
            gauge,
            text("Lateral error").size(16),
            err_line,
            text("Motor duty").size(16),
            motor_line,
            text("Activity log").size(16),
            Container::new(scrollable(panels::activity_list(&self.activity)).height(Length::Fixed(110.0)))
                .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![scrollable(controls), telemetry_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn auto_drive_enabled(&self) -> bool {
        self.form
            .value(ParamKey::AutoDrive)
            .is_some_and(|value| value.as_i64() != 0)
    }

    fn mirror_caption(&self) -> String {
        if self.store.is_confirmed() {
            let drive = if self.store.mirror().get(ParamKey::AutoDrive).as_i64() != 0 {
                "auto"
            } else {
                "manual"
            };
            format!(
                "Backend values confirmed (load #{}, robot in {drive} drive)",
                self.store.revision()
            )
        } else {
            "Backend values not loaded yet".into()
        }
    }

    /// Starts the debounce timer for `ticket`, aborting the superseded one.
    fn schedule(&mut self, ticket: SyncTicket) -> Task<Message> {
        let (timer, handle) =
            Task::perform(self.scheduler.timer(ticket), Message::SyncDue).abortable();
        self.sync_timer = Some(handle.abort_on_drop());
        timer
    }

    /// Commits the newest request. Until the backend's values have been read
    /// once, the request stays pending and a load is issued instead, so fields
    /// the operator never touched are not sent with their built-in defaults.
    fn flush(&mut self, ticket: SyncTicket) -> Task<Message> {
        if self.scheduler.pending_ticket() != Some(ticket) {
            return Task::none();
        }
        if !self.store.is_confirmed() {
            self.activity.record("holding changes until robot parameters load");
            return self.reload();
        }
        match self.scheduler.flush(ticket, &self.form, self.editor.draft()) {
            Some(patch) => {
                self.sync_timer = None;
                Task::perform(self.store.commit(patch), Message::Committed)
            }
            None => Task::none(),
        }
    }

    fn poll(
        &mut self,
        fetch: impl Future<Output = ConsoleResult<TelemetrySnapshot>> + Send + 'static,
    ) -> Task<Message> {
        let (next, handle) = Task::perform(fetch, Message::StatusFetched).abortable();
        self.poll_task = Some(handle.abort_on_drop());
        next
    }

    /// Fetches the parameter set unless a load is already in flight.
    fn reload(&mut self) -> Task<Message> {
        if self.loading {
            return Task::none();
        }
        self.loading = true;
        Task::perform(self.store.load(), Message::ParamsLoaded)
    }

    /// Folds a parameter load into the mirror, the form and the ROI draft.
    /// Fields edited since the last sync keep their text while that sync is
    /// still pending. A request held back for the first load is restarted.
    fn apply_load(&mut self, outcome: ConsoleResult<ParameterSet>) -> Task<Message> {
        let first = !self.store.is_confirmed();
        let pending = self.scheduler.pending_ticket();
        match self.store.apply(outcome) {
            Some(set) => {
                if pending.is_some() {
                    self.form.populate_unedited(set);
                } else {
                    self.form.populate(set);
                }
                self.editor.reconcile(set.roi_points());
            }
            None => {
                self.activity.record("parameters unavailable, keeping last values");
                return Task::none();
            }
        }
        match pending {
            Some(ticket) if first => self.schedule(ticket),
            _ => Task::none(),
        }
    }

    fn refresh_stream(&mut self) {
        self.stream_url = self.store.backend().stream_url(self.stream, now_millis());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linebotcore::api::{FrameSize, OverlayPayload};
    use linebotcore::roi::NormPoint;
    use linebotcore::ConsoleError;

    fn console() -> Console {
        let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
        Console::new(&ConsoleConfig::default(), backend)
    }

    fn loaded(set: ParameterSet) -> Message {
        Message::ParamsLoaded(Ok(set))
    }

    #[test]
    fn load_populates_form_and_draft() {
        let mut console = console();
        let mut set = ParameterSet::default();
        set.set(ParamKey::HofThreshold, ParamValue::Int(52));
        set.set(ParamKey::AutoDrive, ParamValue::Int(1));
        set.set_roi_points(vec![[0.1, 0.1], [0.9, 0.1], [0.5, 0.9]]);
        let _ = console.update(loaded(set));

        assert_eq!(console.form.text(ParamKey::HofThreshold), "52");
        assert_eq!(console.editor.draft().len(), 3);
        assert!(console.store.is_confirmed());
        assert_eq!(
            console.mirror_caption(),
            "Backend values confirmed (load #1, robot in auto drive)"
        );
    }

    #[test]
    fn pending_edit_survives_a_load() {
        let mut console = console();
        let _ = console.update(Message::FieldEdited(ParamKey::SteerK, "9.5".into()));
        assert!(console.scheduler.is_pending());
        let _ = console.update(loaded(ParameterSet::default()));
        assert_eq!(console.form.text(ParamKey::SteerK), "9.5");
    }

    #[test]
    fn unconfirmed_edit_waits_for_backend_values() {
        let mut console = console();
        let _ = console.update(Message::ParamsLoaded(Err(ConsoleError::Transport(
            "connection refused".into(),
        ))));
        assert!(!console.loading);

        let _ = console.update(Message::FieldEdited(ParamKey::BinaryValue, "120".into()));
        let ticket = console.scheduler.pending_ticket().unwrap();
        let _ = console.update(Message::SyncDue(ticket));
        assert_eq!(console.scheduler.pending_ticket(), Some(ticket));
        assert!(console.loading);
        assert_eq!(
            console.activity.recent().next(),
            Some("holding changes until robot parameters load")
        );

        let mut robot = ParameterSet::default();
        robot.set(ParamKey::HofThreshold, ParamValue::Int(33));
        robot.set(ParamKey::SteerK, ParamValue::Float(3.0));
        robot.set(ParamKey::BinaryValue, ParamValue::Int(90));
        let _ = console.update(loaded(robot));
        assert!(!console.loading);
        assert!(console.sync_timer.is_some());
        assert_eq!(console.form.text(ParamKey::BinaryValue), "120");
        assert_eq!(console.form.text(ParamKey::HofThreshold), "33");

        let patch = console
            .scheduler
            .flush(ticket, &console.form, console.editor.draft())
            .unwrap();
        assert_eq!(patch.value(ParamKey::BinaryValue), Some(ParamValue::Int(120)));
        assert_eq!(patch.value(ParamKey::HofThreshold), Some(ParamValue::Int(33)));
        assert_eq!(patch.value(ParamKey::SteerK), Some(ParamValue::Float(3.0)));
    }

    #[test]
    fn connected_poll_retries_missing_load() {
        let mut console = console();
        let _ = console.update(Message::ParamsLoaded(Err(ConsoleError::Transport(
            "timed out".into(),
        ))));
        assert!(!console.loading);
        let _ = console.update(Message::StatusFetched(Ok(TelemetrySnapshot::default())));
        assert!(console.loading);

        let _ = console.update(loaded(ParameterSet::default()));
        let _ = console.update(Message::StatusFetched(Ok(TelemetrySnapshot::default())));
        assert!(!console.loading);
    }

    #[test]
    fn estop_outcome_is_reported_as_a_stop() {
        let mut console = console();
        let mut stopped = ParameterSet::default();
        stopped.set(ParamKey::AutoDrive, ParamValue::Int(0));
        let _ = console.update(Message::Stopped(CommitReport {
            write: Ok(()),
            read: Ok(stopped),
        }));
        assert_eq!(console.activity.recent().next(), Some("emergency stop confirmed"));
        assert!(console.store.is_confirmed());

        let _ = console.update(Message::Stopped(CommitReport {
            write: Err(ConsoleError::Transport("connection refused".into())),
            read: Err(ConsoleError::Transport("connection refused".into())),
        }));
        assert!(console
            .activity
            .recent()
            .any(|entry| entry.starts_with("emergency stop failed")));
    }

    #[test]
    fn toggle_flips_auto_drive_and_requests_sync() {
        let mut console = console();
        assert!(!console.auto_drive_enabled());
        let _ = console.update(Message::ToggleAutoDrive);
        assert!(console.auto_drive_enabled());
        assert!(console.scheduler.is_pending());
        assert!(console.sync_timer.is_some());
    }

    #[test]
    fn manual_apply_forces_manual_mode() {
        let mut console = console();
        let _ = console.update(Message::ToggleAutoDrive);
        let _ = console.update(Message::FieldEdited(ParamKey::ManualMotor, "0.12".into()));
        let _ = console.update(Message::ApplyManual);
        assert!(!console.auto_drive_enabled());
        assert!(console.scheduler.is_pending());
    }

    #[test]
    fn estop_drops_pending_sync() {
        let mut console = console();
        let _ = console.update(Message::ToggleAutoDrive);
        let _ = console.update(Message::Estop);
        assert!(!console.scheduler.is_pending());
        assert!(console.sync_timer.is_none());
    }

    #[test]
    fn clear_flushes_without_waiting() {
        let mut console = console();
        let _ = console.update(loaded(ParameterSet::default()));
        let _ = console.update(Message::Roi(RoiIntent::ToggleEdit));
        let _ = console.update(Message::Roi(RoiIntent::AddPoint(NormPoint::new(0.2, 0.2))));
        assert!(console.scheduler.is_pending());
        let _ = console.update(Message::Roi(RoiIntent::Clear));
        assert!(!console.scheduler.is_pending());
        assert!(console.editor.draft().is_empty());
    }

    #[test]
    fn stale_timer_does_not_cancel_newer_one() {
        let mut console = console();
        let first = console.scheduler.request_sync(None);
        let _ = console.update(Message::FieldEdited(ParamKey::SteerK, "3".into()));
        let _ = console.update(Message::SyncDue(first));
        assert!(console.scheduler.is_pending());
        assert!(console.sync_timer.is_some());
    }

    #[test]
    fn status_outcomes_drive_link_and_chain() {
        let mut console = console();
        let snapshot = TelemetrySnapshot {
            err: 20.0,
            overlay: Some(OverlayPayload {
                frame: FrameSize::new(320.0, 240.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let _ = console.update(Message::StatusFetched(Ok(snapshot)));
        assert_eq!(console.poller.link(), LinkState::Connected);
        assert!(console.poll_task.is_some());

        let _ = console.update(Message::StatusFetched(Err(ConsoleError::Transport(
            "timed out".into(),
        ))));
        assert_eq!(console.poller.link(), LinkState::Disconnected);
        assert!(console.poller.overlay().is_some());
        assert_eq!(console.activity.recent().next(), Some("robot link lost"));
    }

    #[test]
    fn stream_selection_rebuilds_url() {
        let mut console = console();
        let _ = console.update(Message::StreamSelected(StreamName::Canny));
        assert!(console
            .stream_url
            .starts_with("http://127.0.0.1:9/stream/canny?t="));
    }
}
