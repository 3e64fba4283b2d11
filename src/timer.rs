//! Running mean of elapsed durations.

use std::time::{Duration, Instant};

/// Accumulates elapsed time samples and reports their mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningAverage {
    total: Duration,
    samples: u64,
}

impl RunningAverage {
    /// Create an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: Duration::ZERO,
            samples: 0,
        }
    }

    /// Record one sample.
    pub fn record(&mut self, elapsed: Duration) {
        self.total = self.total.saturating_add(elapsed);
        self.samples += 1;
    }

    /// Record the time elapsed since `start`.
    pub fn record_since(&mut self, start: Instant) {
        self.record(start.elapsed());
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &Self) {
        self.total = self.total.saturating_add(other.total);
        self.samples += other.samples;
    }

    /// Number of samples recorded.
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    /// Mean over every sample, zero when nothing was recorded.
    #[must_use]
    pub fn average(&self) -> Duration {
        if self.samples == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total.as_nanos() / u128::from(self.samples);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average_is_zero() {
        assert_eq!(RunningAverage::new().average(), Duration::ZERO);
    }

    #[test]
    fn test_average_of_samples() {
        let mut avg = RunningAverage::new();
        avg.record(Duration::from_millis(10));
        avg.record(Duration::from_millis(30));
        assert_eq!(avg.samples(), 2);
        assert_eq!(avg.average(), Duration::from_millis(20));
    }

    #[test]
    fn test_merge() {
        let mut a = RunningAverage::new();
        a.record(Duration::from_micros(100));
        let mut b = RunningAverage::new();
        b.record(Duration::from_micros(300));
        b.record(Duration::from_micros(200));
        a.merge(&b);
        assert_eq!(a.samples(), 3);
        assert_eq!(a.average(), Duration::from_micros(200));
    }
}
