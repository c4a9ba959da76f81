//! Team rating store.
//!
//! Lookups never fail from the caller's point of view: an unknown team gets
//! the configured neutral rating and a warning in the log.

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ResolutionFailure;
use crate::models::{Rating, TeamId};

/// Source of offensive/defensive ratings keyed by team.
pub trait RatingSource: Send + Sync {
    /// Strict lookup, `UnknownTeam` when the store has no entry.
    fn lookup(&self, team_id: &TeamId) -> Result<Rating, ResolutionFailure>;

    /// Rating handed out for unknown teams.
    fn neutral_rating(&self) -> Rating;

    fn get_rating(&self, team_id: &TeamId) -> Rating {
        match self.lookup(team_id) {
            Ok(rating) => {
                info!("Fetched rating for team ID {}", team_id);
                rating
            }
            Err(e) => {
                warn!("{}, using neutral rating", e);
                self.neutral_rating()
            }
        }
    }
}

/// In-memory ratings, loaded once per reporting cycle.
#[derive(Debug, Clone)]
pub struct StaticRatingStore {
    ratings: HashMap<TeamId, Rating>,
    neutral: Rating,
}

impl StaticRatingStore {
    /// Create an empty store (every team is neutral).
    pub fn new(neutral: Rating) -> Self {
        Self {
            ratings: HashMap::new(),
            neutral,
        }
    }

    pub fn with_ratings<I>(neutral: Rating, ratings: I) -> Self
    where
        I: IntoIterator<Item = (TeamId, Rating)>,
    {
        Self {
            ratings: ratings.into_iter().collect(),
            neutral,
        }
    }

    /// Parse `{ "<team_id>": { "off_rating": .., "def_rating": .. }, .. }`.
    pub fn from_json_str(content: &str, neutral: Rating) -> Result<Self> {
        let parsed: HashMap<String, Rating> =
            serde_json::from_str(content).context("invalid ratings JSON")?;
        Ok(Self::with_ratings(
            neutral,
            parsed.into_iter().map(|(id, rating)| (TeamId::new(id), rating)),
        ))
    }

    /// Load from a JSON file. A missing or broken file yields an empty store.
    pub fn load(path: Option<&Path>, neutral: Rating) -> Self {
        let Some(path) = path else {
            info!("No ratings file configured, all teams use the neutral rating");
            return Self::new(neutral);
        };

        let loaded = fs::read_to_string(path)
            .with_context(|| format!("failed to read ratings file {}", path.display()))
            .and_then(|content| Self::from_json_str(&content, neutral));

        match loaded {
            Ok(store) => {
                info!("Loaded {} team ratings from {}", store.len(), path.display());
                store
            }
            Err(e) => {
                error!("Error loading team ratings: {:#}", e);
                Self::new(neutral)
            }
        }
    }

    pub fn insert(&mut self, team_id: TeamId, rating: Rating) {
        self.ratings.insert(team_id, rating);
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl RatingSource for StaticRatingStore {
    fn lookup(&self, team_id: &TeamId) -> Result<Rating, ResolutionFailure> {
        self.ratings
            .get(team_id)
            .copied()
            .ok_or_else(|| ResolutionFailure::UnknownTeam(team_id.to_string()))
    }

    fn neutral_rating(&self) -> Rating {
        self.neutral
    }
}
