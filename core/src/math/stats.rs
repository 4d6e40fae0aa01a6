pub struct StatsHelper;

impl StatsHelper {
    /// Minimum and maximum of the samples, or `None` when empty.
    pub fn bounds(samples: &[f64]) -> Option<(f64, f64)> {
        let mut iter = samples.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), value| {
            (lo.min(value), hi.max(value))
        }))
    }

    pub fn clamp_symmetric(value: f64, limit: f64) -> f64 {
        value.clamp(-limit, limit)
    }
}
