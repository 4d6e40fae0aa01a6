//! Reconciliation core for the line-follower operator console.
//!
//! The modules keep a locally edited parameter/ROI state consistent with the
//! robot's authoritative backend state, poll telemetry into bounded history,
//! and compose overlay geometry onto a raster surface.

pub mod api;
pub mod math;
pub mod prelude;
pub mod render;
pub mod roi;
pub mod sync;
pub mod telemetry;

pub use prelude::{ConsoleError, ConsoleResult, RobotBackend, SyncTiming};
