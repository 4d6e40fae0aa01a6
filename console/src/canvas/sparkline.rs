use crate::app::Message;
use crate::canvas::FrameSurface;
use iced::widget::canvas::{self, Frame, Geometry};
use iced::{mouse, Rectangle, Renderer, Theme};
use linebotcore::render::Sparkline;
use linebotcore::telemetry::HistoryBuffer;

pub struct SparklineCanvas<'a> {
    pub line: Sparkline,
    pub history: &'a HistoryBuffer,
}

impl canvas::Program<Message> for SparklineCanvas<'_> {
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
        self.line
            .render(&mut FrameSurface::new(&mut frame), self.history);
        vec![frame.into_geometry()]
    }
}
