//! Tunables for the edge pipeline.
//!
//! Every component receives its slice of [`EdgeConfig`] at construction, so a
//! report is fully determined by its inputs plus this struct.

use serde::{Deserialize, Serialize};

use crate::matching::MatchStrategy;
use crate::models::{Rating, NEUTRAL_PROBABILITY};

/// Offensive and defensive rating assumed for teams the store doesn't know.
pub const DEFAULT_NEUTRAL_RATING: f64 = 110.0;

/// Logistic scale `k` in `1 / (1 + e^(-diff / k))`.
pub const DEFAULT_SCALE_K: f64 = 10.0;

/// Partial-ratio score (0-100) a name must strictly exceed to count as present.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 75;

/// Minimum edge for GOOD BET (inclusive).
pub const DEFAULT_GOOD_BET_EDGE: f64 = 0.07;

/// Minimum edge for SMALL EDGE (inclusive).
pub const DEFAULT_SMALL_EDGE: f64 = 0.03;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub ratings: RatingConfig,
    pub model: ModelConfig,
    pub matcher: MatcherConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub neutral_offense: f64,
    pub neutral_defense: f64,
}

impl RatingConfig {
    pub fn neutral_rating(&self) -> Rating {
        Rating::new(self.neutral_offense, self.neutral_defense)
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            neutral_offense: DEFAULT_NEUTRAL_RATING,
            neutral_defense: DEFAULT_NEUTRAL_RATING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub scale: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE_K,
        }
    }
}

/// Literal rewrite applied to lower-cased market titles before matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRewrite {
    pub from: String,
    pub to: String,
}

impl TitleRewrite {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub threshold: u8,
    /// Applied in order.
    pub title_rewrites: Vec<TitleRewrite>,
    pub strategy: MatchStrategy,
    /// Substituted for a missing/falsy outcome price.
    pub neutral_price: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            title_rewrites: vec![
                TitleRewrite::new("will the", ""),
                TitleRewrite::new("win vs", "vs"),
            ],
            strategy: MatchStrategy::default(),
            neutral_price: NEUTRAL_PROBABILITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub good_bet_edge: f64,
    pub small_edge: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            good_bet_edge: DEFAULT_GOOD_BET_EDGE,
            small_edge: DEFAULT_SMALL_EDGE,
        }
    }
}
