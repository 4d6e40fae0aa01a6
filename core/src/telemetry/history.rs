use std::collections::VecDeque;

/// Samples kept per tracked metric.
pub const HISTORY_CAPACITY: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySample {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub value: f64,
}

/// Fixed-capacity ring of samples in chronological order.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest on overflow. A timestamp older
    /// than the newest sample is raised to it so the series stays monotonic.
    pub fn push(&mut self, timestamp: f64, value: f64) {
        let timestamp = match self.samples.back() {
            Some(last) if timestamp < last.timestamp => last.timestamp,
            _ => timestamp,
        };
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(HistorySample { timestamp, value });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.value).collect()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }
}

/// Tracked telemetry series.
#[derive(Debug, Clone)]
pub struct MetricHistory {
    pub error: HistoryBuffer,
    pub motor_duty: HistoryBuffer,
}

impl MetricHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            error: HistoryBuffer::with_capacity(capacity),
            motor_duty: HistoryBuffer::with_capacity(capacity),
        }
    }
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_evicts_oldest_and_keeps_order() {
        let mut buffer = HistoryBuffer::with_capacity(HISTORY_CAPACITY);
        for i in 0..=HISTORY_CAPACITY {
            buffer.push(i as f64, i as f64 * 10.0);
        }
        assert_eq!(buffer.len(), HISTORY_CAPACITY);
        let timestamps: Vec<f64> = buffer.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps.first(), Some(&1.0));
        assert_eq!(timestamps.last(), Some(&(HISTORY_CAPACITY as f64)));
        assert!(timestamps.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn stale_timestamps_are_raised() {
        let mut buffer = HistoryBuffer::with_capacity(4);
        buffer.push(10.0, 1.0);
        buffer.push(9.5, 2.0);
        assert_eq!(buffer.latest().map(|s| s.timestamp), Some(10.0));
        assert_eq!(buffer.values(), vec![1.0, 2.0]);
    }
}
