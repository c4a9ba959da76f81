//! Edge classification: model probability vs market-implied probability.

use crate::config::ClassifierConfig;
use crate::models::{EdgeLabel, EdgeResult};

#[derive(Debug, Clone)]
pub struct EdgeClassifier {
    config: ClassifierConfig,
}

impl EdgeClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Label the home-side edge `model_prob - market_prob`.
    ///
    /// Both thresholds are inclusive lower bounds. The edge is not clamped.
    pub fn classify(&self, model_prob: f64, market_prob: f64) -> EdgeResult {
        let edge = model_prob - market_prob;
        EdgeResult {
            model_prob,
            market_prob,
            edge,
            label: self.label_for(edge),
        }
    }

    pub fn label_for(&self, edge: f64) -> EdgeLabel {
        if edge >= self.config.good_bet_edge {
            EdgeLabel::GoodBet
        } else if edge >= self.config.small_edge {
            EdgeLabel::SmallEdge
        } else {
            EdgeLabel::NoBet
        }
    }
}

impl Default for EdgeClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_bet() {
        let result = EdgeClassifier::default().classify(0.60, 0.50);
        assert_eq!(result.label, EdgeLabel::GoodBet);
        assert!((result.edge - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_small_edge() {
        let result = EdgeClassifier::default().classify(0.54, 0.50);
        assert_eq!(result.label, EdgeLabel::SmallEdge);
        assert!((result.edge - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_no_bet() {
        let result = EdgeClassifier::default().classify(0.51, 0.50);
        assert_eq!(result.label, EdgeLabel::NoBet);
        assert!((result.edge - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_negative_edge_is_not_clamped() {
        let result = EdgeClassifier::default().classify(0.40, 0.50);
        assert_eq!(result.label, EdgeLabel::NoBet);
        assert!((result.edge + 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let classifier = EdgeClassifier::default();
        assert_eq!(classifier.label_for(0.07), EdgeLabel::GoodBet);
        assert_eq!(classifier.label_for(0.03), EdgeLabel::SmallEdge);
        assert_eq!(classifier.label_for(0.0299), EdgeLabel::NoBet);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = EdgeClassifier::new(ClassifierConfig {
            good_bet_edge: 0.15,
            small_edge: 0.05,
        });
        assert_eq!(classifier.classify(0.60, 0.50).label, EdgeLabel::SmallEdge);
        assert_eq!(classifier.classify(0.70, 0.50).label, EdgeLabel::GoodBet);
    }
}
