use rand::Rng;
#[cfg(test)]
use std::collections::VecDeque;

/// Every random decision the simulation makes goes through here so tests
/// can script them.
pub trait RandomSource {
    /// `true` with probability `p`, where `p` is in [0.0, 1.0].
    fn chance(&mut self, p: f64) -> bool;
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
    /// Uniform integer in `lo..=hi`.
    fn lane(&mut self, lo: i64, hi: i64) -> i64;
}

pub struct RngSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn lane(&mut self, lo: i64, hi: i64) -> i64 {
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays queued answers; once a queue runs dry it falls back to
/// `p >= 1.0`, index 0 and the low lane. Certain outcomes (`p <= 0.0` or
/// `p >= 1.0`) never consume a scripted chance.
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedRandom {
    chances: VecDeque<bool>,
    picks: VecDeque<usize>,
    lanes: VecDeque<i64>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    pub fn with_lanes(mut self, lanes: impl IntoIterator<Item = i64>) -> Self {
        self.lanes.extend(lanes);
        self
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 || p >= 1.0 {
            return p >= 1.0;
        }
        self.chances.pop_front().unwrap_or(false)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0).min(len.saturating_sub(1))
    }

    fn lane(&mut self, lo: i64, hi: i64) -> i64 {
        self.lanes.pop_front().unwrap_or(lo).clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_rng_source_bounds() {
        let mut source = RngSource::new(StdRng::seed_from_u64(7));
        for _ in 0..500 {
            assert!(!source.chance(0.0));
            assert!(source.chance(1.0));
            assert!(source.pick(2) < 2);
            let lane = source.lane(200, 600);
            assert!((200..=600).contains(&lane));
        }
    }

    #[test]
    fn test_scripted_chances_skip_certain_outcomes() {
        let mut source = ScriptedRandom::new().with_chances([true]);
        assert!(!source.chance(0.0));
        assert!(source.chance(1.0));
        assert!(source.chance(0.5));
        assert!(!source.chance(0.5));
    }

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = RngSource::new(StdRng::seed_from_u64(42));
        let mut b = RngSource::new(StdRng::seed_from_u64(42));
        let xs = (0..20).map(|_| a.lane(0, 1000)).collect::<Vec<_>>();
        let ys = (0..20).map(|_| b.lane(0, 1000)).collect::<Vec<_>>();
        assert_eq!(xs, ys);
    }
}
