//! Pre-game win probability from team ratings.
//!
//! The model is a single logistic curve over the net-rating differential:
//!
//! ```text
//! diff   = (home_off - home_def) - (away_off - away_def)
//! p_home = 1 / (1 + e^(-diff / k))
//! ```
//!
//! `k` controls how quickly a rating gap turns into certainty; at the default
//! `k = 10` a 10 point net-rating gap is worth roughly 73%.

use log::{error, info};

use crate::config::ModelConfig;
use crate::error::ComputationFailure;
use crate::models::{ProbabilityPair, Rating};

/// Logistic function for probability calculation
#[inline]
fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone)]
pub struct ModelEstimator {
    config: ModelConfig,
}

impl ModelEstimator {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn scale(&self) -> f64 {
        self.config.scale
    }

    /// Home/away win probability, or the reason it couldn't be computed.
    pub fn estimate_checked(
        &self,
        home: &Rating,
        away: &Rating,
    ) -> Result<ProbabilityPair, ComputationFailure> {
        let k = self.config.scale;
        if !k.is_finite() || k <= 0.0 {
            return Err(ComputationFailure::InvalidScale(k));
        }
        for rating in [home, away] {
            if !rating.is_finite() {
                return Err(ComputationFailure::NonFiniteRating {
                    offensive: rating.offensive,
                    defensive: rating.defensive,
                });
            }
        }

        let diff = home.net() - away.net();
        let p_home = logistic(diff / k);
        if !p_home.is_finite() {
            return Err(ComputationFailure::NonFiniteProbability(p_home));
        }

        // Bounded already; the clamp guards the 1 - p_home below
        let p_home = p_home.clamp(0.0, 1.0);
        Ok(ProbabilityPair::new(p_home, 1.0 - p_home))
    }

    /// Total variant: any computational failure yields (0.5, 0.5).
    pub fn estimate(&self, home: &Rating, away: &Rating) -> ProbabilityPair {
        match self.estimate_checked(home, away) {
            Ok(pair) => {
                info!(
                    "Model calculated probabilities: Home={:.3}, Away={:.3}",
                    pair.home, pair.away
                );
                pair
            }
            Err(e) => {
                error!("Error calculating model probability: {}", e);
                ProbabilityPair::NEUTRAL
            }
        }
    }
}

impl Default for ModelEstimator {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_equal_net_ratings_are_even() {
        let estimator = ModelEstimator::default();
        let pair = estimator.estimate(&Rating::new(112.0, 108.0), &Rating::new(110.0, 106.0));
        assert_eq!(pair.as_tuple(), (0.5, 0.5));
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let estimator = ModelEstimator::default();
        for diff in [-60.0, -15.5, -1.0, 0.3, 4.0, 22.2, 80.0] {
            let pair = estimator.estimate(&Rating::new(110.0 + diff, 110.0), &Rating::new(110.0, 110.0));
            assert!((pair.home + pair.away - 1.0).abs() < EPS, "diff={diff}");
            assert!((0.0..=1.0).contains(&pair.home));
            assert!((0.0..=1.0).contains(&pair.away));
        }
    }

    #[test]
    fn test_monotonic_in_net_rating_gap() {
        let estimator = ModelEstimator::default();
        let away = Rating::new(110.0, 110.0);
        let mut last = 0.0;
        for step in -20..=20 {
            let home = Rating::new(110.0 + step as f64, 110.0);
            let p = estimator.estimate(&home, &away).home;
            assert!(p > last, "step={step} p={p} last={last}");
            last = p;
        }
    }

    #[test]
    fn test_known_matchup() {
        // Celtics (118.5/110.2) hosting Lakers (115.2/108.7): diff = 8.3 - 6.5
        let estimator = ModelEstimator::default();
        let home = Rating::new(118.5, 110.2);
        let away = Rating::new(115.2, 108.7);
        let diff = home.net() - away.net();
        let expected = 1.0 / (1.0 + (-diff / 10.0).exp());

        let pair = estimator.estimate(&home, &away);
        assert!((pair.home - expected).abs() < 1e-6);
        assert!((pair.home - 0.544_879).abs() < 1e-6);
    }

    #[test]
    fn test_scale_controls_steepness() {
        let home = Rating::new(120.0, 110.0);
        let away = Rating::new(110.0, 110.0);
        let flat = ModelEstimator::new(ModelConfig { scale: 20.0 }).estimate(&home, &away);
        let steep = ModelEstimator::new(ModelConfig { scale: 5.0 }).estimate(&home, &away);
        assert!(steep.home > flat.home);
    }

    #[test]
    fn test_bad_inputs_fall_back_to_neutral() {
        let estimator = ModelEstimator::default();
        let good = Rating::new(110.0, 110.0);
        let bad = Rating::new(f64::NAN, 110.0);

        assert!(matches!(
            estimator.estimate_checked(&bad, &good),
            Err(ComputationFailure::NonFiniteRating { .. })
        ));
        assert!(estimator.estimate(&bad, &good).is_neutral());
        assert!(estimator.estimate(&good, &Rating::new(110.0, f64::INFINITY)).is_neutral());

        let zero_scale = ModelEstimator::new(ModelConfig { scale: 0.0 });
        assert_eq!(
            zero_scale.estimate_checked(&good, &good),
            Err(ComputationFailure::InvalidScale(0.0))
        );
        assert!(zero_scale.estimate(&good, &good).is_neutral());
    }
}
