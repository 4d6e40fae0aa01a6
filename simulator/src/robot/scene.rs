use linebotcore::api::{FrameSize, Segment};
use linebotcore::roi::MIN_POLYGON_POINTS;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Lateral error clamp applied by the vision stage.
const ERROR_LIMIT: f64 = 40.0;
const SWAY_AMPLITUDE: f64 = 25.0;
const SWAY_RATE: f64 = 0.6;

/// What the simulated vision stage reports for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub err: f64,
    pub lines: Vec<Segment>,
}

/// Synthetic lane seen by the camera: the robot sways across it and the two
/// lane edges shift opposite to the lateral error.
pub struct LaneScene {
    rng: StdRng,
    noise: f64,
    elapsed: f64,
}

impl LaneScene {
    pub fn new(seed: u64, noise: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise: noise.abs(),
            elapsed: 0.0,
        }
    }

    pub fn observe(&mut self, dt: f64, frame: FrameSize) -> Observation {
        self.elapsed += dt;
        let jitter = if self.noise > 0.0 {
            self.rng.gen_range(-self.noise..self.noise)
        } else {
            0.0
        };
        let err = (SWAY_AMPLITUDE * (self.elapsed * SWAY_RATE * std::f64::consts::TAU).sin()
            + jitter)
            .clamp(-ERROR_LIMIT, ERROR_LIMIT);

        let (w, h) = (frame.w, frame.h);
        let shift = -err;
        let horizon = (h * 0.45).round();
        let lines = vec![
            Segment::new(
                (w * 0.2 + shift).round(),
                h,
                (w * 0.42 + shift).round(),
                horizon,
            ),
            Segment::new(
                (w * 0.58 + shift).round(),
                horizon,
                (w * 0.8 + shift).round(),
                h,
            ),
        ];
        Observation { err, lines }
    }

    /// Frame rate with a little capture jitter.
    pub fn fps(&mut self, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }
        1.0 / dt + self.rng.gen_range(-0.5..0.5)
    }
}

/// Scales normalized ROI points into the frame's pixel space, falling back to
/// the default lower-half trapezoid when the configured polygon is degenerate.
pub fn roi_in_pixels(points: &[[f64; 2]], frame: FrameSize) -> Vec<[f64; 2]> {
    let (w, h) = (frame.w, frame.h);
    if points.len() >= MIN_POLYGON_POINTS {
        return points
            .iter()
            .map(|[x, y]| [(x * w).round(), (y * h).round()])
            .collect();
    }
    vec![
        [0.0, h],
        [w, h],
        [(w * 0.75).round(), (h * 0.45).round()],
        [(w * 0.25).round(), (h * 0.45).round()],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_identically() {
        let frame = FrameSize::new(320.0, 240.0);
        let mut a = LaneScene::new(13, 2.0);
        let mut b = LaneScene::new(13, 2.0);
        for _ in 0..10 {
            assert_eq!(a.observe(0.033, frame), b.observe(0.033, frame));
        }
    }

    #[test]
    fn error_stays_within_limit() {
        let frame = FrameSize::new(320.0, 240.0);
        let mut scene = LaneScene::new(1, 30.0);
        for _ in 0..200 {
            let observation = scene.observe(0.05, frame);
            assert!(observation.err.abs() <= ERROR_LIMIT);
            assert_eq!(observation.lines.len(), 2);
        }
    }

    #[test]
    fn configured_roi_scales_to_pixels() {
        let frame = FrameSize::new(320.0, 240.0);
        let roi = roi_in_pixels(&[[0.1, 0.1], [0.9, 0.1], [0.5, 0.9]], frame);
        assert_eq!(roi, vec![[32.0, 24.0], [288.0, 24.0], [160.0, 216.0]]);
        assert_eq!(roi_in_pixels(&[[0.5, 0.5]], frame).len(), 4);
    }
}
