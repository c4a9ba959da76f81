//! Market Matching
//!
//! Locates the prediction market for a home/away matchup in a list of quotes
//! and reads the implied probability for each side.
//!
//! A quote is a candidate when both team names (in any of their spellings)
//! fuzzily appear in its normalized title. Outcome labels are then mapped back
//! to the two sides with the same similarity test. Anything that can't be
//! resolved degrades to the neutral (0.5, 0.5) pair.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strsim::jaro_winkler;

use crate::config::MatcherConfig;
use crate::error::ResolutionFailure;
use crate::models::{MarketQuote, ProbabilityPair};
use crate::utils::fuzzy::partial_ratio;

pub mod team;

use team::{best_variant_score, name_variants, normalize_title};

/// How to choose among several quotes that mention both teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// First candidate in input order.
    #[default]
    FirstMatch,
    /// Candidate whose weaker side scores highest.
    BestScore,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::FirstMatch => f.write_str("first"),
            MatchStrategy::BestScore => f.write_str("best"),
        }
    }
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first_match" => Ok(MatchStrategy::FirstMatch),
            "best" | "best_score" => Ok(MatchStrategy::BestScore),
            other => Err(format!("unknown match strategy '{other}' (expected first|best)")),
        }
    }
}

/// A resolved market for one matchup.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMatch {
    pub quote_index: usize,
    pub title: String,
    /// Weaker of the two sides' title scores (0-100).
    pub score: u8,
    pub home_outcome: usize,
    pub away_outcome: usize,
    pub probabilities: ProbabilityPair,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    score: u8,
    tie_break: f64,
}

#[derive(Debug, Clone)]
pub struct MarketMatcher {
    config: MatcherConfig,
}

impl MarketMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.config.strategy
    }

    pub fn normalize_title(&self, title: &str) -> String {
        normalize_title(title, &self.config.title_rewrites)
    }

    /// Market probabilities for the matchup, or why they couldn't be found.
    pub fn match_checked(
        &self,
        home_team: &str,
        away_team: &str,
        quotes: &[MarketQuote],
    ) -> Result<MarketMatch, ResolutionFailure> {
        if quotes.is_empty() {
            return Err(ResolutionFailure::NoQuotes);
        }

        let candidate = self
            .select_candidate(home_team, away_team, quotes)
            .ok_or_else(|| ResolutionFailure::NoMatchingMarket {
                home: home_team.to_string(),
                away: away_team.to_string(),
            })?;
        let quote = &quotes[candidate.index];

        let (home_outcome, away_outcome) = self.resolve_outcomes(home_team, away_team, quote)?;
        let neutral = self.config.neutral_price;
        let probabilities = ProbabilityPair::new(
            quote.price(home_outcome).unwrap_or(neutral),
            quote.price(away_outcome).unwrap_or(neutral),
        );

        Ok(MarketMatch {
            quote_index: candidate.index,
            title: quote.title().to_string(),
            score: candidate.score,
            home_outcome,
            away_outcome,
            probabilities,
        })
    }

    /// Total variant: any resolution failure yields (0.5, 0.5).
    pub fn match_quotes(
        &self,
        home_team: &str,
        away_team: &str,
        quotes: &[MarketQuote],
    ) -> ProbabilityPair {
        match self.match_checked(home_team, away_team, quotes) {
            Ok(found) => {
                info!(
                    "Found market odds for {} vs {} in '{}': Home={}, Away={}",
                    home_team, away_team, found.title, found.probabilities.home, found.probabilities.away
                );
                found.probabilities
            }
            Err(e) => {
                warn!("{} ({} vs {}), using default 0.5/0.5", e, home_team, away_team);
                ProbabilityPair::NEUTRAL
            }
        }
    }

    fn select_candidate(
        &self,
        home_team: &str,
        away_team: &str,
        quotes: &[MarketQuote],
    ) -> Option<Candidate> {
        let home_variants = name_variants(home_team);
        let away_variants = name_variants(away_team);
        let matchup = format!("{} vs {}", home_team.to_lowercase(), away_team.to_lowercase());

        let mut best: Option<Candidate> = None;
        for (index, quote) in quotes.iter().enumerate() {
            let title = self.normalize_title(quote.title());

            let home_score = best_variant_score(&home_variants, &title);
            let away_score = best_variant_score(&away_variants, &title);
            if !self.passes(home_score) || !self.passes(away_score) {
                continue;
            }

            let candidate = Candidate {
                index,
                score: home_score.min(away_score),
                tie_break: jaro_winkler(&title, &matchup),
            };

            match self.config.strategy {
                MatchStrategy::FirstMatch => return Some(candidate),
                MatchStrategy::BestScore => {
                    let better = best.map_or(true, |current| {
                        candidate.score > current.score
                            || (candidate.score == current.score
                                && candidate.tie_break > current.tie_break)
                    });
                    if better {
                        best = Some(candidate);
                    }
                }
            }
        }

        best
    }

    /// Index of the outcome for each side. Each side takes the first label
    /// clearing the threshold while it is still open; a label that clears it
    /// for both open sides goes to the closer name (home on a tie). A label
    /// claimed by home is not offered to away.
    fn resolve_outcomes(
        &self,
        home_team: &str,
        away_team: &str,
        quote: &MarketQuote,
    ) -> Result<(usize, usize), ResolutionFailure> {
        let home_lower = home_team.to_lowercase();
        let away_lower = away_team.to_lowercase();

        let mut home_idx: Option<usize> = None;
        let mut away_idx: Option<usize> = None;

        for (i, outcome) in quote.outcomes().iter().enumerate() {
            let outcome_text = outcome.to_lowercase();
            let home_score = partial_ratio(&home_lower, &outcome_text);
            let away_score = partial_ratio(&away_lower, &outcome_text);
            let home_open = home_idx.is_none() && self.passes(home_score);
            let away_open = away_idx.is_none() && self.passes(away_score);

            match (home_open, away_open) {
                (true, true) if away_score > home_score => away_idx = Some(i),
                (true, _) => home_idx = Some(i),
                (false, true) => away_idx = Some(i),
                (false, false) => {}
            }
        }

        let unresolved = |team: &str| ResolutionFailure::UnresolvedOutcome {
            title: quote.title().to_string(),
            team: team.to_string(),
        };
        let home_idx = home_idx.ok_or_else(|| unresolved(home_team))?;
        let away_idx = away_idx.ok_or_else(|| unresolved(away_team))?;
        Ok((home_idx, away_idx))
    }

    #[inline]
    fn passes(&self, score: u8) -> bool {
        score > self.config.threshold
    }
}

impl Default for MarketMatcher {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}
