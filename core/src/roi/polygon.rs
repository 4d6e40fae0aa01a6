use crate::math::{Point2, Size2};

/// Fewest points that make a usable region.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Point in normalized display coordinates; both components lie in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormPoint {
    x: f64,
    y: f64,
}

impl NormPoint {
    /// Builds a point, clamping each component into [0, 1]. Non-finite input
    /// collapses to 0.
    pub fn new(x: f64, y: f64) -> Self {
        let clamp = |value: f64| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    /// Converts a position inside a surface of `size` pixels. `None` for an
    /// empty surface.
    pub fn from_display(position: Point2, size: Size2) -> Option<Self> {
        if size.is_empty() {
            return None;
        }
        Some(Self::new(
            f64::from(position.x / size.width),
            f64::from(position.y / size.height),
        ))
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn to_display(self, size: Size2) -> Point2 {
        Point2::new(self.x as f32 * size.width, self.y as f32 * size.height)
    }
}

/// Ordered ROI polygon in normalized coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoiPolygon {
    points: Vec<NormPoint>,
}

impl RoiPolygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_wire(wire: &[[f64; 2]]) -> Self {
        Self {
            points: wire.iter().map(|[x, y]| NormPoint::new(*x, *y)).collect(),
        }
    }

    pub fn push(&mut self, point: NormPoint) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[NormPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the polygon has enough points to describe an area.
    pub fn is_closed(&self) -> bool {
        self.points.len() >= MIN_POLYGON_POINTS
    }

    /// Wire form: the points in insertion order, or nothing at all when the
    /// polygon is degenerate.
    pub fn to_wire(&self) -> Vec<[f64; 2]> {
        if !self.is_closed() {
            return Vec::new();
        }
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }
}
