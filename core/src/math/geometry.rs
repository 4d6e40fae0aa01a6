/// Point in display (canvas) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Size of a raster surface in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size2 {
    pub width: f32,
    pub height: f32,
}

impl Size2 {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Independent horizontal/vertical factors from a reference frame to the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale2 {
    pub sx: f32,
    pub sy: f32,
}

impl Scale2 {
    /// `None` when the reference frame has no positive area.
    pub fn between(reference_w: f64, reference_h: f64, display: Size2) -> Option<Self> {
        if reference_w <= 0.0 || reference_h <= 0.0 {
            return None;
        }
        Some(Self {
            sx: display.width / reference_w as f32,
            sy: display.height / reference_h as f32,
        })
    }

    pub fn apply(&self, x: f64, y: f64) -> Point2 {
        Point2::new(x as f32 * self.sx, y as f32 * self.sy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_independent_per_axis() {
        let scale = Scale2::between(640.0, 480.0, Size2::new(320.0, 480.0)).unwrap();
        assert_eq!(scale.apply(100.0, 100.0), Point2::new(50.0, 100.0));
    }

    #[test]
    fn zero_reference_has_no_scale() {
        assert!(Scale2::between(0.0, 240.0, Size2::new(320.0, 240.0)).is_none());
    }
}
