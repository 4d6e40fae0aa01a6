use linebotcore::api::{ParamKey, ParameterSet, RunMode};

const MIN_POSITION: i64 = 800;
const MAX_POSITION: i64 = 2200;
const MIN_DUTY: f64 = 0.0;
const MAX_DUTY: f64 = 0.2;

/// Actuator command for one control step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    pub motor: f64,
    pub servo: i32,
    pub mode: RunMode,
}

/// Speed PID that slows down as the lateral error grows.
#[derive(Debug, Clone, Default)]
struct SpeedPid {
    integral: f64,
    prev_err: f64,
}

impl SpeedPid {
    fn compute(&mut self, lateral_error: f64, measured: f64, params: &ParameterSet) -> f64 {
        let f = |key: ParamKey| params.get(key).as_f64();
        let (lo, hi) = (f(ParamKey::MotorMin), f(ParamKey::MotorMax));
        let (lo, hi) = (lo.min(hi), hi.max(lo));
        let dt = f(ParamKey::SpeedDt);

        let target = (f(ParamKey::SpeedTarget)
            - lateral_error.abs() * f(ParamKey::SpeedSlowdownGain))
        .clamp(lo, hi);
        let err = target - measured;
        self.integral = (self.integral + err * dt).clamp(lo, hi);
        let derivative = if dt > 0.0 {
            (err - self.prev_err) / dt
        } else {
            0.0
        };
        self.prev_err = err;
        (f(ParamKey::SpeedKp) * err + f(ParamKey::SpeedKi) * self.integral
            + f(ParamKey::SpeedKd) * derivative)
            .clamp(lo, hi)
    }
}

/// Steering and speed control driven by the parameter set.
#[derive(Debug, Clone, Default)]
pub struct DriveController {
    pid: SpeedPid,
    last_motor: f64,
}

impl DriveController {
    pub fn step(&mut self, err: f64, params: &ParameterSet) -> DriveCommand {
        if params.get(ParamKey::AutoDrive).as_i64() != 1 {
            return DriveCommand {
                motor: params.get(ParamKey::ManualMotor).as_f64(),
                servo: params.get(ParamKey::ManualServo).as_i64() as i32,
                mode: RunMode::Manual,
            };
        }

        let center = params.get(ParamKey::SteerCenter).as_i64() as f64;
        let gain = params.get(ParamKey::SteerK).as_f64();
        let invert = params.get(ParamKey::SteerInvert).as_i64() as f64;
        let servo = ((center + invert * gain * err) as i64).clamp(MIN_POSITION, MAX_POSITION);

        let motor = if params.get(ParamKey::SpeedMode).as_i64() == 1 {
            self.pid.compute(err, self.last_motor, params)
        } else {
            let lo = params.get(ParamKey::MotorMin).as_f64();
            let hi = params.get(ParamKey::MotorMax).as_f64().max(lo);
            (params.get(ParamKey::MotorBase).as_f64()
                - params.get(ParamKey::MotorK).as_f64() * err.abs())
            .clamp(lo, hi)
        };
        let motor = motor.clamp(MIN_DUTY, MAX_DUTY);
        self.last_motor = motor;

        DriveCommand {
            motor,
            servo: servo as i32,
            mode: RunMode::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linebotcore::api::ParamValue;

    fn auto_params() -> ParameterSet {
        let mut params = ParameterSet::default();
        params.set(ParamKey::AutoDrive, ParamValue::Int(1));
        params
    }

    #[test]
    fn manual_mode_passes_operator_values_through() {
        let mut params = ParameterSet::default();
        params.set(ParamKey::ManualMotor, ParamValue::Float(0.12));
        params.set(ParamKey::ManualServo, ParamValue::Int(1700));
        let command = DriveController::default().step(30.0, &params);
        assert_eq!(
            command,
            DriveCommand {
                motor: 0.12,
                servo: 1700,
                mode: RunMode::Manual
            }
        );
    }

    #[test]
    fn linear_mode_steers_and_slows_with_error() {
        let params = auto_params();
        let mut controller = DriveController::default();
        let command = controller.step(10.0, &params);
        assert_eq!(command.servo, 1580);
        assert!((command.motor - 0.08).abs() < 1e-9);
        assert_eq!(command.mode, RunMode::Auto);
    }

    #[test]
    fn servo_is_clamped_to_travel() {
        let mut params = auto_params();
        params.set(ParamKey::SteerK, ParamValue::Float(100.0));
        let command = DriveController::default().step(40.0, &params);
        assert_eq!(command.servo, MAX_POSITION as i32);
    }

    #[test]
    fn pid_mode_stays_within_duty_limits() {
        let mut params = auto_params();
        params.set(ParamKey::SpeedMode, ParamValue::Int(1));
        let mut controller = DriveController::default();
        for step in 0..50 {
            let command = controller.step((step as f64).sin() * 30.0, &params);
            assert!((0.0..=0.18).contains(&command.motor));
        }
    }
}
