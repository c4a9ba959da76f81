// Shared value types for the edge pipeline
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RecordError;

mod quote;

pub use quote::MarketQuote;

/// Probability used whenever a side cannot be resolved.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

// ============================================================================
// Teams & Ratings
// ============================================================================

/// Opaque team key as issued by the game-listing source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TeamId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for TeamId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    id: TeamId,
    name: String,
}

impl Team {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Result<Self, RecordError> {
        let id = id.into();
        let name = name.into();
        if id.as_str().trim().is_empty() {
            return Err(RecordError::MissingField("team_id"));
        }
        if name.trim().is_empty() {
            return Err(RecordError::MissingField("team_name"));
        }
        Ok(Self { id, name })
    }

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    /// Display name, used verbatim for matching and in the report.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Offensive/defensive rating pair (points per 100 possessions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "off_rating")]
    pub offensive: f64,
    #[serde(rename = "def_rating")]
    pub defensive: f64,
}

impl Rating {
    pub const fn new(offensive: f64, defensive: f64) -> Self {
        Self {
            offensive,
            defensive,
        }
    }

    /// Net rating: offense minus defense. Higher is better.
    #[inline]
    pub fn net(&self) -> f64 {
        self.offensive - self.defensive
    }

    pub fn is_finite(&self) -> bool {
        self.offensive.is_finite() && self.defensive.is_finite()
    }
}

// ============================================================================
// Games
// ============================================================================

/// One scheduled matchup, valid for a single reporting cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    game_id: String,
    date: NaiveDate,
    home: Team,
    away: Team,
}

impl Game {
    pub fn new(
        game_id: impl Into<String>,
        date: NaiveDate,
        home: Team,
        away: Team,
    ) -> Result<Self, RecordError> {
        let game_id = game_id.into();
        if game_id.trim().is_empty() {
            return Err(RecordError::MissingField("game_id"));
        }
        Ok(Self {
            game_id,
            date,
            home,
            away,
        })
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn home(&self) -> &Team {
        &self.home
    }

    pub fn away(&self) -> &Team {
        &self.away
    }

    pub fn home_team_id(&self) -> &TeamId {
        self.home.id()
    }

    pub fn away_team_id(&self) -> &TeamId {
        self.away.id()
    }
}

// ============================================================================
// Probabilities & Edges
// ============================================================================

/// Home/away probability pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPair {
    pub home: f64,
    pub away: f64,
}

impl ProbabilityPair {
    pub const NEUTRAL: Self = Self {
        home: NEUTRAL_PROBABILITY,
        away: NEUTRAL_PROBABILITY,
    };

    pub const fn new(home: f64, away: f64) -> Self {
        Self { home, away }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.home, self.away)
    }
}

impl Default for ProbabilityPair {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeLabel {
    GoodBet,
    SmallEdge,
    NoBet,
}

impl EdgeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLabel::GoodBet => "GOOD BET",
            EdgeLabel::SmallEdge => "SMALL EDGE",
            EdgeLabel::NoBet => "NO BET",
        }
    }

    /// Marker printed in front of the game header line.
    pub fn marker(&self) -> &'static str {
        match self {
            EdgeLabel::GoodBet => "💡",
            EdgeLabel::SmallEdge => "📈",
            EdgeLabel::NoBet => "🧱",
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, EdgeLabel::NoBet)
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Home-side edge of the model over the market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeResult {
    pub model_prob: f64,
    pub market_prob: f64,
    /// `model_prob - market_prob`, unclamped (negative when the market is
    /// more bullish on the home side).
    pub edge: f64,
    pub label: EdgeLabel,
}

/// Everything the report needs to render one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEdge {
    pub game: Game,
    pub market: ProbabilityPair,
    pub model: ProbabilityPair,
    pub edge: EdgeResult,
    pub home_net_rating: f64,
    pub away_net_rating: f64,
}
