pub mod geometry;
pub mod stats;

pub use geometry::{Point2, Scale2, Size2};
pub use stats::StatsHelper;
