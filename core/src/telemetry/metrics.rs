/// Poll outcome counters for the connection indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkMetrics {
    succeeded: usize,
    failed: usize,
    failure_streak: usize,
}

impl LinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
        self.failure_streak = 0;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
        self.failure_streak += 1;
    }

    /// `(succeeded, failed)` totals.
    pub fn snapshot(&self) -> (usize, usize) {
        (self.succeeded, self.failed)
    }

    pub fn failure_streak(&self) -> usize {
        self.failure_streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_resets_failure_streak() {
        let mut metrics = LinkMetrics::new();
        metrics.record_failure();
        metrics.record_failure();
        assert_eq!(metrics.failure_streak(), 2);
        metrics.record_success();
        assert_eq!(metrics.failure_streak(), 0);
        assert_eq!(metrics.snapshot(), (1, 2));
    }
}
