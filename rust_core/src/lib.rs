//! Edge Core - NBA value detection from team ratings and prediction markets.
//!
//! This module provides:
//! - Team rating store with neutral fallback for unknown teams
//! - Logistic home-win model over net-rating differentials
//! - Fuzzy market matching (team-name variants against market titles)
//! - Edge classification (model probability vs market-implied probability)
//! - Report building, with games evaluated in parallel via rayon
//! - ESPN scoreboard and Polymarket Gamma adapters
//!
//! Every step degrades to neutral values instead of failing; the `*_checked`
//! variants expose the underlying failure.

pub mod config;
pub mod edge;
pub mod error;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod ratings;
pub mod report;
pub mod utils;
pub mod win_prob;

// Upstream adapters
pub mod clients;

pub use config::EdgeConfig;
pub use edge::EdgeClassifier;
pub use error::{ComputationFailure, RecordError, ResolutionFailure};
pub use matching::{MarketMatcher, MatchStrategy};
pub use models::*;
pub use pipeline::{GameSource, QuoteSource, ReportPipeline};
pub use ratings::{RatingSource, StaticRatingStore};
pub use report::{ReportBuilder, ReportOutcome};
pub use win_prob::ModelEstimator;
