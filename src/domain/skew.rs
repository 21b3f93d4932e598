// Clock skew estimation - the viewer half of the serverNow contract

/// Weight kept from the previous estimate when a new observation arrives.
const RETAIN_WEIGHT: f64 = 0.8;
/// Weight given to the newest observation.
const ADOPT_WEIGHT: f64 = 0.2;

/// Exponential-moving-average estimate of `localNow - serverNow`.
///
/// A viewer feeds every status snapshot's `serverNow` through [`observe`] and
/// evaluates the valve interpolation with [`corrected_now`] in place of its
/// own clock, so independently-clocked viewers converge on the same rendered
/// position. The smoothing dampens network-latency noise in individual
/// observations.
///
/// [`observe`]: SkewEstimator::observe
/// [`corrected_now`]: SkewEstimator::corrected_now
#[derive(Debug, Clone, Copy, Default)]
pub struct SkewEstimator {
    skew_ms: Option<f64>,
}

impl SkewEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one snapshot into the estimate. The first observation is adopted
    /// outright; later ones are blended 0.8 old / 0.2 new.
    pub fn observe(&mut self, local_ms: i64, server_ms: i64) {
        let sample = (local_ms - server_ms) as f64;
        self.skew_ms = Some(match self.skew_ms {
            Some(current) => current * RETAIN_WEIGHT + sample * ADOPT_WEIGHT,
            None => sample,
        });
    }

    /// Local clock reading mapped onto the server's timeline. Before any
    /// observation the local clock is passed through unchanged.
    pub fn corrected_now(&self, local_ms: i64) -> i64 {
        match self.skew_ms {
            Some(skew) => local_ms - skew.round() as i64,
            None => local_ms,
        }
    }

    pub fn skew_ms(&self) -> Option<f64> {
        self.skew_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::valve::ValveTimeline;

    #[test]
    fn test_first_observation_is_adopted_outright() {
        let mut estimator = SkewEstimator::new();
        estimator.observe(8_000, 1_000);
        assert_eq!(estimator.skew_ms(), Some(7_000.0));
        assert_eq!(estimator.corrected_now(10_000), 3_000);
    }

    #[test]
    fn test_later_observations_are_blended() {
        let mut estimator = SkewEstimator::new();
        estimator.observe(7_000, 0);
        estimator.observe(10_500, 3_000);
        // 0.8 * 7000 + 0.2 * 7500
        assert_eq!(estimator.skew_ms(), Some(7_100.0));
    }

    #[test]
    fn test_unobserved_estimator_passes_the_clock_through() {
        let estimator = SkewEstimator::new();
        assert_eq!(estimator.corrected_now(123_456), 123_456);
    }

    #[test]
    fn test_viewers_with_different_clocks_converge_on_one_position() {
        // simulated network noise per snapshot, in ms
        let jitter: [i64; 12] = [35, -20, 50, -45, 10, 25, -30, 15, -10, 40, -25, 5];

        let mut fast = SkewEstimator::new(); // clock runs 7 s ahead of the server
        let mut slow = SkewEstimator::new(); // clock runs 4 s behind

        let start = 1_000_000;
        for (i, noise) in jitter.iter().enumerate() {
            let server_now = start + (i as i64) * 500;
            fast.observe(server_now + 7_000 + noise, server_now);
            slow.observe(server_now - 4_000 + noise, server_now);
        }

        let fast_skew = fast.skew_ms().unwrap();
        let slow_skew = slow.skew_ms().unwrap();
        assert!((fast_skew - 7_000.0).abs() < 60.0, "fast skew was {}", fast_skew);
        assert!((slow_skew + 4_000.0).abs() < 60.0, "slow skew was {}", slow_skew);

        // both viewers render the same timeline at the same true instant
        let timeline = ValveTimeline::begin(0.0, 100.0, start, 30_000);
        let true_now = start + 12_000;
        let fast_percent = timeline.percent_at(fast.corrected_now(true_now + 7_000));
        let slow_percent = timeline.percent_at(slow.corrected_now(true_now - 4_000));
        assert!(
            (fast_percent - slow_percent).abs() < 0.5,
            "viewers diverged: {} vs {}",
            fast_percent,
            slow_percent
        );
    }
}
