pub mod overlay;
pub mod sparkline;
pub mod steering;

pub use overlay::OverlayCanvas;
pub use sparkline::SparklineCanvas;
pub use steering::SteeringGauge;

use iced::widget::canvas::{Frame, Path, Stroke};
use iced::{Color, Point};
use linebotcore::math::{Point2, Size2};
use linebotcore::render::{Pen, Rgba, Surface};

const BACKGROUND: Color = Color {
    r: 0.05,
    g: 0.05,
    b: 0.05,
    a: 1.0,
};

fn color(rgba: Rgba) -> Color {
    Color::from_rgba(rgba.r, rgba.g, rgba.b, rgba.a)
}

fn point(p: Point2) -> Point {
    Point::new(p.x, p.y)
}

fn stroke(pen: Pen) -> Stroke<'static> {
    Stroke::default()
        .with_width(pen.width)
        .with_color(color(pen.color))
}

/// Draws core render output onto an iced canvas frame.
pub struct FrameSurface<'a> {
    frame: &'a mut Frame,
}

impl<'a> FrameSurface<'a> {
    pub fn new(frame: &'a mut Frame) -> Self {
        Self { frame }
    }
}

impl Surface for FrameSurface<'_> {
    fn size(&self) -> Size2 {
        let size = self.frame.size();
        Size2::new(size.width, size.height)
    }

    fn clear(&mut self) {
        let size = self.frame.size();
        self.frame.fill_rectangle(Point::ORIGIN, size, BACKGROUND);
    }

    fn stroke_line(&mut self, from: Point2, to: Point2, pen: Pen) {
        self.frame
            .stroke(&Path::line(point(from), point(to)), stroke(pen));
    }

    fn draw_path(&mut self, points: &[Point2], closed: bool, fill: Option<Rgba>, pen: Pen) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let path = Path::new(|builder| {
            builder.move_to(point(*first));
            for p in rest {
                builder.line_to(point(*p));
            }
            if closed {
                builder.close();
            }
        });
        if let Some(fill) = fill {
            self.frame.fill(&path, color(fill));
        }
        self.frame.stroke(&path, stroke(pen));
    }

    fn fill_circle(&mut self, center: Point2, radius: f32, rgba: Rgba) {
        self.frame
            .fill(&Path::circle(point(center), radius), color(rgba));
    }
}
