//! Rolling latency windows (C10), grounded in the teacher's `executor.rs` per-call
//! timing (`ExecutionResult`/`ExecutionStep`), generalized into a fixed-capacity window
//! with p50/p99/mean rather than a single most-recent sample.

use std::collections::VecDeque;
use std::time::Duration;

pub struct LatencyWindow {
    capacity: usize,
    samples: VecDeque<Duration>,
}

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, samples: VecDeque::with_capacity(capacity) }
    }

    pub fn record(&mut self, sample: Duration) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    pub fn percentile(&self, p: f64) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<Duration> = self.samples.iter().copied().collect();
        sorted.sort();
        let idx = ((sorted.len() - 1) as f64 * p.clamp(0.0, 1.0)).round() as usize;
        sorted[idx]
    }

    pub fn p50(&self) -> Duration {
        self.percentile(0.50)
    }

    pub fn p99(&self) -> Duration {
        self.percentile(0.99)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentiles_over_known_samples() {
        let mut w = LatencyWindow::new(10);
        for ms in [10u64, 20, 30, 40, 50] {
            w.record(Duration::from_millis(ms));
        }
        assert_eq!(w.p50(), Duration::from_millis(30));
        assert_eq!(w.p99(), Duration::from_millis(50));
    }

    #[test]
    fn drops_oldest_beyond_capacity() {
        let mut w = LatencyWindow::new(2);
        w.record(Duration::from_millis(1));
        w.record(Duration::from_millis(2));
        w.record(Duration::from_millis(3));
        assert_eq!(w.len(), 2);
        assert_eq!(w.mean(), Duration::from_micros(2_500)); // (2ms+3ms)/2
    }

    #[test]
    fn empty_window_has_zero_stats() {
        let w = LatencyWindow::new(10);
        assert_eq!(w.p50(), Duration::ZERO);
        assert_eq!(w.mean(), Duration::ZERO);
    }
}
