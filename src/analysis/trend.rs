use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Compares the mean of the newest `window` samples with the `window`
/// before them.
pub fn history_trend(history: &VecDeque<u32>, window: usize) -> Trend {
    let epsilon = 2.0;
    if window == 0 || history.len() < window * 2 {
        return Trend::Flat;
    }
    let mean = |skip: usize| {
        history.iter().rev().skip(skip).take(window).sum::<u32>() as f64 / window as f64
    };
    let diff = mean(0) - mean(window);
    if diff > epsilon {
        Trend::Up
    } else if diff < -epsilon {
        Trend::Down
    } else {
        Trend::Flat
    }
}

/// Share of successful outcomes over the whole window, by plotted weight.
/// `None` while nothing has happened.
pub fn success_ratio(successes: &VecDeque<u32>, failures: &VecDeque<u32>) -> Option<f64> {
    let ok = successes.iter().map(|v| *v as u64).sum::<u64>();
    let failed = failures.iter().map(|v| *v as u64).sum::<u64>();
    let total = ok + failed;
    if total == 0 {
        None
    } else {
        Some(ok as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn history(values: &[u32]) -> VecDeque<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_trend_detection() {
        assert_eq!(Trend::Up, history_trend(&history(&[0, 0, 0, 12, 24, 12]), 3));
        assert_eq!(Trend::Down, history_trend(&history(&[24, 24, 24, 0, 0, 12]), 3));
        assert_eq!(Trend::Flat, history_trend(&history(&[12, 12, 12, 12, 12, 13]), 3));
    }

    #[test]
    fn test_short_history_is_flat() {
        assert_eq!(Trend::Flat, history_trend(&history(&[0, 120]), 3));
        assert_eq!(Trend::Flat, history_trend(&history(&[0, 120]), 0));
    }

    #[test]
    fn test_success_ratio() {
        assert_eq!(None, success_ratio(&history(&[0, 0]), &history(&[0, 0])));
        assert_relative_eq!(
            0.75,
            success_ratio(&history(&[12, 12]), &history(&[8, 0])).unwrap()
        );
    }
}
