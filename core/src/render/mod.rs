pub mod overlay;
pub mod sparkline;
pub mod surface;

pub use overlay::{OverlayRenderer, OverlayScene, OverlayStyle};
pub use sparkline::{Sparkline, ERROR_RANGE, MOTOR_DUTY_RANGE};
pub use surface::{DrawList, DrawOp, Pen, Rgba, Surface};
