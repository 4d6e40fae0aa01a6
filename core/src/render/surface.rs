use crate::math::{Point2, Size2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From 8-bit channels and a float alpha.
    pub fn rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0, a)
    }
}

/// Stroke colour and width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Rgba,
    pub width: f32,
}

impl Pen {
    pub const fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

/// Raster target the renderers draw on. Coordinates are display pixels.
pub trait Surface {
    fn size(&self) -> Size2;
    fn clear(&mut self);
    fn stroke_line(&mut self, from: Point2, to: Point2, pen: Pen);
    /// Strokes the path through `points`, closing it back to the first point
    /// when `closed`, and fills it first when `fill` is given.
    fn draw_path(&mut self, points: &[Point2], closed: bool, fill: Option<Rgba>, pen: Pen);
    fn fill_circle(&mut self, center: Point2, radius: f32, color: Rgba);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Line {
        from: Point2,
        to: Point2,
        pen: Pen,
    },
    Path {
        points: Vec<Point2>,
        closed: bool,
        fill: Option<Rgba>,
        pen: Pen,
    },
    Circle {
        center: Point2,
        radius: f32,
        color: Rgba,
    },
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: Size2,
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new(size: Size2) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }
}

impl Surface for DrawList {
    fn size(&self) -> Size2 {
        self.size
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn stroke_line(&mut self, from: Point2, to: Point2, pen: Pen) {
        self.ops.push(DrawOp::Line { from, to, pen });
    }

    fn draw_path(&mut self, points: &[Point2], closed: bool, fill: Option<Rgba>, pen: Pen) {
        self.ops.push(DrawOp::Path {
            points: points.to_vec(),
            closed,
            fill,
            pen,
        });
    }

    fn fill_circle(&mut self, center: Point2, radius: f32, color: Rgba) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }
}
