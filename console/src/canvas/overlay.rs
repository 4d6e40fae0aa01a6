use crate::app::Message;
use crate::canvas::FrameSurface;
use iced::widget::canvas::{self, Event, Frame, Geometry};
use iced::{mouse, Rectangle, Renderer, Theme};
use linebotcore::api::OverlayPayload;
use linebotcore::math::{Point2, Size2};
use linebotcore::render::{OverlayRenderer, OverlayScene};
use linebotcore::roi::{ClickKind, ClickTracker, NormPoint, RoiIntent, RoiPolygon};
use std::time::Instant;

/// Video-area canvas: backend detection overlay plus the local ROI draft.
/// Left clicks become ROI intents while the ROI is being edited.
pub struct OverlayCanvas<'a> {
    pub overlay: Option<&'a OverlayPayload>,
    pub draft: &'a RoiPolygon,
    pub editing: bool,
    pub renderer: &'a OverlayRenderer,
}

impl canvas::Program<Message> for OverlayCanvas<'_> {
    type State = ClickTracker;

    fn update(
        &self,
        clicks: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if !self.editing
            || !matches!(
                event,
                Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))
            )
        {
            return None;
        }
        let position = cursor.position_in(bounds)?;
        let position = Point2::new(position.x, position.y);
        let intent = match clicks.register(position, Instant::now()) {
            ClickKind::Double => RoiIntent::DoubleActivate,
            ClickKind::Single => {
                let size = Size2::new(bounds.width, bounds.height);
                RoiIntent::AddPoint(NormPoint::from_display(position, size)?)
            }
        };
        Some(canvas::Action::publish(Message::Roi(intent)).and_capture())
    }

    fn draw(
        &self,
        _clicks: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        self.renderer.render(
            &mut FrameSurface::new(&mut frame),
            &OverlayScene {
                overlay: self.overlay,
                draft: self.draft,
                editing: self.editing,
            },
        );
        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _clicks: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.editing && cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}
