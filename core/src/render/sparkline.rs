use crate::math::{Point2, StatsHelper};
use crate::render::{Pen, Rgba, Surface};
use crate::telemetry::HistoryBuffer;

/// Fixed vertical bounds of the lateral error sparkline.
pub const ERROR_RANGE: (f64, f64) = (-40.0, 40.0);
/// Fixed vertical bounds of the motor duty sparkline.
pub const MOTOR_DUTY_RANGE: (f64, f64) = (0.0, 0.2);

/// Polyline view over a metric history.
#[derive(Debug, Clone, Copy)]
pub struct Sparkline {
    /// Vertical bounds; the data's own range when `None`.
    pub range: Option<(f64, f64)>,
    pub pen: Pen,
}

impl Sparkline {
    pub fn new(range: Option<(f64, f64)>) -> Self {
        Self {
            range,
            pen: Pen::new(Rgba::rgb8(76, 141, 246, 0.85), 2.0),
        }
    }

    /// Projects `values` onto a `width`×`height` area: evenly spaced on x,
    /// larger values higher up.
    pub fn project(&self, values: &[f64], width: f32, height: f32) -> Vec<Point2> {
        let Some((data_min, data_max)) = StatsHelper::bounds(values) else {
            return Vec::new();
        };
        let (min, max) = self.range.unwrap_or((data_min, data_max));
        let span = if max - min == 0.0 { 1.0 } else { max - min };
        let step = if values.len() > 1 {
            width / (values.len() - 1) as f32
        } else {
            width
        };
        values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let normalized = ((value - min) / span) as f32;
                Point2::new(index as f32 * step, height - normalized * height)
            })
            .collect()
    }

    pub fn render<S: Surface>(&self, surface: &mut S, history: &HistoryBuffer) {
        surface.clear();
        let size = surface.size();
        let points = self.project(&history.values(), size.width, size.height);
        if points.len() > 1 {
            surface.draw_path(&points, false, None, self.pen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Size2;
    use crate::render::{DrawList, DrawOp};

    #[test]
    fn fixed_range_maps_bounds_to_edges() {
        let line = Sparkline::new(Some(ERROR_RANGE));
        let points = line.project(&[-40.0, 0.0, 40.0], 100.0, 80.0);
        assert_eq!(
            points,
            vec![
                Point2::new(0.0, 80.0),
                Point2::new(50.0, 40.0),
                Point2::new(100.0, 0.0)
            ]
        );
    }

    #[test]
    fn flat_series_uses_unit_span() {
        let line = Sparkline::new(None);
        let points = line.project(&[2.0, 2.0], 10.0, 10.0);
        assert_eq!(points[0].y, 10.0);
        assert!(line.project(&[], 10.0, 10.0).is_empty());
    }

    #[test]
    fn render_strokes_open_polyline() {
        let mut history = HistoryBuffer::with_capacity(8);
        history.push(0.0, 0.05);
        history.push(1.0, 0.10);
        let mut surface = DrawList::new(Size2::new(60.0, 20.0));
        Sparkline::new(Some(MOTOR_DUTY_RANGE)).render(&mut surface, &history);
        assert!(matches!(surface.ops()[1], DrawOp::Path { closed: false, fill: None, .. }));
    }
}
