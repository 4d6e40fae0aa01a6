pub mod drive;
pub mod scene;

use crate::bridge::model::SharedState;
use crate::config::SimulatorConfig;
use drive::DriveController;
use linebotcore::api::{FrameSize, OverlayPayload, RunMode};
use log::debug;
use scene::LaneScene;
use std::time::Duration;

/// Simulated camera + controller loop feeding the shared robot state.
pub struct Robot {
    scene: LaneScene,
    drive: DriveController,
    frame: FrameSize,
    tick: Duration,
    camera_connected: bool,
    chassis_connected: bool,
}

impl Robot {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            scene: LaneScene::new(config.seed, config.noise),
            drive: DriveController::default(),
            frame: FrameSize::new(
                f64::from(config.frame_width),
                f64::from(config.frame_height),
            ),
            tick: Duration::from_millis(config.tick_ms),
            camera_connected: config.camera_connected,
            chassis_connected: config.chassis_connected,
        }
    }

    /// Advances the simulation by one frame and publishes the resulting status.
    pub fn step(&mut self, state: &SharedState) {
        let params = state.params();
        let dt = self.tick.as_secs_f64();
        let observation = self.scene.observe(dt, self.frame);
        let command = self.drive.step(observation.err, &params);
        let roi = scene::roi_in_pixels(params.roi_points(), self.frame);

        state.update_status(|status| {
            status.fps = self.scene.fps(dt);
            status.err = observation.err;
            status.servo_position = f64::from(command.servo);
            status.motor_duty = if self.chassis_connected {
                command.motor
            } else {
                0.0
            };
            status.mode = command.mode;
            status.running = true;
            status.camera_connected = self.camera_connected;
            status.camera_error = if self.camera_connected {
                String::new()
            } else {
                "camera not ready".into()
            };
            status.chassis_connected = self.chassis_connected;
            status.chassis_error = if self.chassis_connected {
                String::new()
            } else {
                "open /dev/ttyTHS1 failed: simulated".into()
            };
            status.overlay = Some(OverlayPayload {
                frame: self.frame,
                lines: observation.lines,
                roi,
            });
        });
        if command.mode == RunMode::Auto {
            debug!(
                "auto step err={:.2} servo={} motor={:.3}",
                observation.err, command.servo, command.motor
            );
        }
    }

    pub async fn run(mut self, state: SharedState) {
        let mut ticker = tokio::time::interval(self.tick);
        loop {
            ticker.tick().await;
            self.step(&state);
        }
    }
}
