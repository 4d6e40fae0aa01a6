pub mod editor;
pub mod gesture;
pub mod polygon;

pub use editor::{EditorMode, RoiEditor, RoiIntent};
pub use gesture::{ClickKind, ClickTracker};
pub use polygon::{NormPoint, RoiPolygon, MIN_POLYGON_POINTS};
