use std::time::Duration;

use rand::Rng;

/// Plans the randomized pre-request delay, stretched as the recent
/// pushback ratio climbs: `uniform(min_wait, max_wait) * (1 + sensitivity * ratio)`.
#[derive(Debug, Clone)]
pub struct PacingPlanner {
    /// Lower bound of the base delay in seconds. Must not exceed `max_wait`.
    pub min_wait: f64,
    /// Upper bound of the base delay in seconds.
    pub max_wait: f64,
    /// How strongly the pushback ratio stretches the base delay.
    pub sensitivity: f64,
}

impl Default for PacingPlanner {
    fn default() -> Self {
        Self {
            min_wait: 3.0,
            max_wait: 6.0,
            sensitivity: 1.2,
        }
    }
}

impl PacingPlanner {
    /// Zero-delay planner, for tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            min_wait: 0.0,
            max_wait: 0.0,
            sensitivity: 0.0,
        }
    }

    /// The delay for a fixed base draw and pushback ratio.
    pub fn delay_with_base(&self, base: f64, ratio: f64) -> f64 {
        base * (1.0 + self.sensitivity * ratio)
    }

    /// Draws a base delay and applies the pushback multiplier.
    pub fn plan_delay<R: Rng + ?Sized>(&self, rng: &mut R, ratio: f64) -> Duration {
        let base = rng.random_range(self.min_wait..=self.max_wait);
        Duration::from_secs_f64(self.delay_with_base(base, ratio))
    }
}
