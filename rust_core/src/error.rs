//! Failure kinds of the edge pipeline.
//!
//! None of these escape the report: every public operation that can hit one
//! has a total counterpart that substitutes the neutral value instead. The
//! typed variants exist so callers and tests can see *why* a fallback fired.

use thiserror::Error;

/// An input could not be resolved (unknown team, missing market, ...).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionFailure {
    #[error("no rating found for team ID {0}")]
    UnknownTeam(String),

    #[error("market quote fetch failed: {0}")]
    QuoteFetch(String),

    #[error("no market quotes available")]
    NoQuotes,

    #[error("no market found for {home} vs {away}")]
    NoMatchingMarket { home: String, away: String },

    #[error("market '{title}' has no outcome for {team}")]
    UnresolvedOutcome { title: String, team: String },
}

/// The logistic model was handed something it cannot compute with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationFailure {
    #[error("non-finite rating (off={offensive}, def={defensive})")]
    NonFiniteRating { offensive: f64, defensive: f64 },

    #[error("logistic scale must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("logistic transform produced {0}")]
    NonFiniteProbability(f64),
}

/// A record from an external source failed validation at the boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("{outcomes} outcome labels but {prices} prices")]
    LengthMismatch { outcomes: usize, prices: usize },

    #[error("price {0} is outside [0, 1]")]
    PriceOutOfRange(f64),
}
