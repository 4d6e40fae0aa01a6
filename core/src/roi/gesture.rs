use crate::math::Point2;
use std::time::{Duration, Instant};

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const DOUBLE_CLICK_RADIUS: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    /// Second click close in time and space to the previous one.
    Double,
}

/// Classifies raw pointer presses into single and double activations.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    radius: f32,
    last: Option<(Instant, Point2)>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_WINDOW, DOUBLE_CLICK_RADIUS)
    }
}

impl ClickTracker {
    pub fn new(window: Duration, radius: f32) -> Self {
        Self {
            window,
            radius,
            last: None,
        }
    }

    pub fn register(&mut self, position: Point2, now: Instant) -> ClickKind {
        let is_double = self.last.is_some_and(|(at, previous)| {
            now.saturating_duration_since(at) <= self.window
                && previous.distance(position) <= self.radius
        });
        if is_double {
            self.last = None;
            ClickKind::Double
        } else {
            self.last = Some((now, position));
            ClickKind::Single
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_nearby_clicks_are_double() {
        let mut tracker = ClickTracker::default();
        let t0 = Instant::now();
        assert_eq!(tracker.register(Point2::new(10.0, 10.0), t0), ClickKind::Single);
        assert_eq!(
            tracker.register(Point2::new(12.0, 11.0), t0 + Duration::from_millis(150)),
            ClickKind::Double
        );
        // a third click starts a fresh sequence
        assert_eq!(
            tracker.register(Point2::new(12.0, 11.0), t0 + Duration::from_millis(200)),
            ClickKind::Single
        );
    }

    #[test]
    fn slow_or_distant_clicks_stay_single() {
        let mut tracker = ClickTracker::default();
        let t0 = Instant::now();
        tracker.register(Point2::new(10.0, 10.0), t0);
        assert_eq!(
            tracker.register(Point2::new(10.0, 10.0), t0 + Duration::from_millis(900)),
            ClickKind::Single
        );
        assert_eq!(
            tracker.register(Point2::new(90.0, 10.0), t0 + Duration::from_millis(950)),
            ClickKind::Single
        );
    }
}
