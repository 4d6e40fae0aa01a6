use crate::app::Message;
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke};
use iced::{mouse, Color, Point, Rectangle, Renderer, Theme};

/// Horizontal gauge with a marker at the steering offset in [-1, 1].
pub struct SteeringGauge {
    pub offset: f64,
}

impl canvas::Program<Message> for SteeringGauge {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let mid_y = bounds.height / 2.0;
        let center_x = bounds.width / 2.0;
        let track = Path::new(|builder| {
            builder.move_to(Point::new(0.0, mid_y));
            builder.line_to(Point::new(bounds.width, mid_y));
            builder.move_to(Point::new(center_x, 0.0));
            builder.line_to(Point::new(center_x, bounds.height));
        });
        frame.stroke(
            &track,
            Stroke::default()
                .with_color(Color::from_rgb(0.35, 0.35, 0.45))
                .with_width(1.0),
        );

        let x = center_x + self.offset.clamp(-1.0, 1.0) as f32 * (center_x - 6.0);
        let marker = Path::circle(Point::new(x, mid_y), 6.0);
        frame.fill(&marker, Color::from_rgb(0.95, 0.55, 0.2));

        vec![frame.into_geometry()]
    }
}
