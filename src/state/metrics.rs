use std::collections::VecDeque;

pub const METRIC_CEILING: u32 = 120;
const SUCCESS_WEIGHT: u32 = 12;
const FAILURE_WEIGHT: u32 = 8;

/// Rolling per-tick outcome history, scaled for plotting.
pub struct MetricsAggregator {
    successes: VecDeque<u32>,
    failures: VecDeque<u32>,
    len: usize,
}

impl MetricsAggregator {
    pub fn new(len: usize) -> Self {
        let len = len.max(1);
        Self {
            successes: VecDeque::from(vec![0; len]),
            failures: VecDeque::from(vec![0; len]),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn record(&mut self, successes: usize, failures: usize) {
        Self::push(&mut self.successes, self.len, scale(successes, SUCCESS_WEIGHT));
        Self::push(&mut self.failures, self.len, scale(failures, FAILURE_WEIGHT));
    }

    fn push(history: &mut VecDeque<u32>, len: usize, value: u32) {
        history.push_back(value);
        while history.len() > len {
            history.pop_front();
        }
    }

    pub fn successes(&self) -> &VecDeque<u32> {
        &self.successes
    }

    pub fn failures(&self) -> &VecDeque<u32> {
        &self.failures
    }

    #[cfg(test)]
    pub fn latest(&self) -> (u32, u32) {
        (
            self.successes.back().copied().unwrap_or(0),
            self.failures.back().copied().unwrap_or(0),
        )
    }
}

fn scale(count: usize, weight: u32) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    count.saturating_mul(weight).min(METRIC_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_zeroed_at_full_length() {
        let metrics = MetricsAggregator::new(200);
        assert_eq!(200, metrics.successes().len());
        assert_eq!(200, metrics.failures().len());
        assert!(metrics.successes().iter().all(|v| *v == 0));
    }

    #[test]
    fn test_record_evicts_oldest() {
        let mut metrics = MetricsAggregator::new(3);
        metrics.record(1, 0);
        metrics.record(2, 1);
        metrics.record(3, 2);
        metrics.record(4, 3);
        assert_eq!(vec![24, 36, 48], metrics.successes().iter().copied().collect::<Vec<_>>());
        assert_eq!(vec![8, 16, 24], metrics.failures().iter().copied().collect::<Vec<_>>());
        assert_eq!(3, metrics.successes().len());
    }

    #[test]
    fn test_values_are_clamped() {
        let mut metrics = MetricsAggregator::new(5);
        metrics.record(11, 16);
        assert_eq!((120, 120), metrics.latest());
        metrics.record(10, 15);
        assert_eq!((120, 120), metrics.latest());
        metrics.record(usize::MAX, usize::MAX);
        assert_eq!((120, 120), metrics.latest());
    }
}
