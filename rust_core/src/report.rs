//! Report assembly.
//!
//! For every game the builder runs the market matcher and the rating model
//! independently, classifies the home-side edge, and renders a fixed-shape
//! block. Games are evaluated in parallel; the report keeps input order.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::sync::Arc;

use crate::config::EdgeConfig;
use crate::edge::EdgeClassifier;
use crate::matching::MarketMatcher;
use crate::models::{Game, GameEdge, MarketQuote};
use crate::ratings::RatingSource;
use crate::win_prob::ModelEstimator;

pub const REPORT_TITLE: &str = "🏀 NBA Value Betting Report";

pub const NO_GAMES_MESSAGE: &str = "🏀 NBA Value Betting Report\n\nNo games scheduled for today.";

/// Result of one build: either a rendered report or nothing to report on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    NoGames,
    Report(String),
}

impl ReportOutcome {
    pub fn is_no_games(&self) -> bool {
        matches!(self, ReportOutcome::NoGames)
    }

    /// Text to deliver: the report body, or the fixed "no games" notice.
    pub fn into_message(self) -> String {
        match self {
            ReportOutcome::NoGames => NO_GAMES_MESSAGE.to_string(),
            ReportOutcome::Report(text) => text,
        }
    }
}

pub struct ReportBuilder {
    ratings: Arc<dyn RatingSource>,
    estimator: ModelEstimator,
    matcher: MarketMatcher,
    classifier: EdgeClassifier,
}

impl ReportBuilder {
    pub fn new(config: &EdgeConfig, ratings: Arc<dyn RatingSource>) -> Self {
        Self {
            ratings,
            estimator: ModelEstimator::new(config.model.clone()),
            matcher: MarketMatcher::new(config.matcher.clone()),
            classifier: EdgeClassifier::new(config.classifier.clone()),
        }
    }

    pub fn evaluate_game(&self, game: &Game, quotes: &[MarketQuote]) -> GameEdge {
        let home = game.home();
        let away = game.away();

        let market = self.matcher.match_quotes(home.name(), away.name(), quotes);

        let home_rating = self.ratings.get_rating(home.id());
        let away_rating = self.ratings.get_rating(away.id());
        let model = self.estimator.estimate(&home_rating, &away_rating);

        let edge = self.classifier.classify(model.home, market.home);

        GameEdge {
            game: game.clone(),
            market,
            model,
            edge,
            home_net_rating: home_rating.net(),
            away_net_rating: away_rating.net(),
        }
    }

    /// Evaluate every game; output order matches `games`.
    pub fn evaluate(&self, games: &[Game], quotes: &[MarketQuote]) -> Vec<GameEdge> {
        games
            .par_iter()
            .map(|game| self.evaluate_game(game, quotes))
            .collect()
    }

    pub fn build(&self, games: &[Game], quotes: &[MarketQuote]) -> ReportOutcome {
        self.build_at(games, quotes, Utc::now())
    }

    pub fn build_at(
        &self,
        games: &[Game],
        quotes: &[MarketQuote],
        now: DateTime<Utc>,
    ) -> ReportOutcome {
        if games.is_empty() {
            return ReportOutcome::NoGames;
        }
        let edges = self.evaluate(games, quotes);
        ReportOutcome::Report(render(&edges, now))
    }
}

/// Render evaluated games under the title/timestamp header.
pub fn render(edges: &[GameEdge], now: DateTime<Utc>) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(3 + edges.len() * 6);
    lines.push(REPORT_TITLE.to_string());
    lines.push(format!("Date: {} UTC", now.format("%Y-%m-%d %H:%M:%S")));
    lines.push(String::new());

    for e in edges {
        let home = e.game.home().name();
        let away = e.game.away().name();

        lines.push(format!(
            "{} <b>{} vs {}</b>",
            e.edge.label.marker(),
            escape_html(home),
            escape_html(away)
        ));
        lines.push(format!("Market: {} vs {}", pct(e.market.home), pct(e.market.away)));
        lines.push(format!("Model: {} vs {}", pct(e.model.home), pct(e.model.away)));
        lines.push(format!("Edge: {} ({})", pct(e.edge.edge), e.edge.label));
        lines.push(format!(
            "Reason: {} Net Rating: {:.1}, {} Net Rating: {:.1}",
            escape_html(home),
            e.home_net_rating,
            escape_html(away),
            e.away_net_rating
        ));
        lines.push(String::new());
    }

    lines.join("\n")
}

#[inline]
fn pct(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Escape the characters Telegram's HTML parse mode treats as markup.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EdgeLabel, Rating, Team, TeamId};
    use crate::ratings::StaticRatingStore;
    use chrono::{NaiveDate, TimeZone};

    fn game(id: &str, home: (&str, &str), away: (&str, &str)) -> Game {
        Game::new(
            id,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Team::new(home.0, home.1).unwrap(),
            Team::new(away.0, away.1).unwrap(),
        )
        .unwrap()
    }

    fn builder() -> ReportBuilder {
        let store = StaticRatingStore::with_ratings(
            Rating::new(110.0, 110.0),
            vec![
                (TeamId::from(14), Rating::new(115.2, 108.7)),
                (TeamId::from(2), Rating::new(118.5, 110.2)),
                (TeamId::from(17), Rating::new(112.8, 109.1)),
                (TeamId::from(15), Rating::new(110.3, 107.8)),
            ],
        );
        ReportBuilder::new(&EdgeConfig::default(), Arc::new(store))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 16, 30, 0).unwrap()
    }

    fn quotes() -> Vec<MarketQuote> {
        vec![MarketQuote::new(
            "New York Knicks vs. Miami Heat",
            vec!["New York Knicks".to_string(), "Miami Heat".to_string()],
            vec![Some(0.48), Some(0.52)],
        )
        .unwrap()]
    }

    #[test]
    fn test_empty_game_list_is_no_games() {
        let outcome = builder().build(&[], &quotes());
        assert!(outcome.is_no_games());
        assert_eq!(outcome.into_message(), NO_GAMES_MESSAGE);
    }

    #[test]
    fn test_evaluate_game_with_market() {
        let edge = builder().evaluate_game(&game("2", ("17", "New York Knicks"), ("15", "Miami Heat")), &quotes());
        assert_eq!(edge.market.as_tuple(), (0.48, 0.52));
        assert!((edge.home_net_rating - 3.7).abs() < 1e-9);
        assert!((edge.away_net_rating - 2.5).abs() < 1e-9);
        // diff 1.2 -> model ~0.530, edge ~0.050
        assert_eq!(edge.edge.label, EdgeLabel::SmallEdge);
        assert!((edge.edge.edge - (edge.model.home - 0.48)).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_teams_are_neutral_everywhere() {
        let edge = builder().evaluate_game(
            &game("3", ("11", "Golden State Warriors"), ("23", "Phoenix Suns")),
            &quotes(),
        );
        assert!(edge.market.is_neutral());
        assert!(edge.model.is_neutral());
        assert_eq!(edge.edge.edge, 0.0);
        assert_eq!(edge.edge.label, EdgeLabel::NoBet);
        assert_eq!(edge.home_net_rating, 0.0);
    }

    #[test]
    fn test_render_block_shape() {
        let games = vec![game("2", ("17", "New York Knicks"), ("15", "Miami Heat"))];
        let ReportOutcome::Report(text) = builder().build_at(&games, &quotes(), fixed_now()) else {
            panic!("expected a report");
        };

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], REPORT_TITLE);
        assert_eq!(lines[1], "Date: 2024-01-15 16:30:00 UTC");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "📈 <b>New York Knicks vs Miami Heat</b>");
        assert_eq!(lines[4], "Market: 48.0% vs 52.0%");
        assert_eq!(lines[5], "Model: 53.0% vs 47.0%");
        assert_eq!(lines[6], "Edge: 5.0% (SMALL EDGE)");
        assert_eq!(
            lines[7],
            "Reason: New York Knicks Net Rating: 3.7, Miami Heat Net Rating: 2.5"
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_report_keeps_input_order() {
        let games = vec![
            game("1", ("14", "Los Angeles Lakers"), ("2", "Boston Celtics")),
            game("2", ("17", "New York Knicks"), ("15", "Miami Heat")),
            game("3", ("11", "Golden State Warriors"), ("23", "Phoenix Suns")),
        ];
        let edges = builder().evaluate(&games, &quotes());
        let ids: Vec<&str> = edges.iter().map(|e| e.game.game_id()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let text = builder().build_at(&games, &quotes(), fixed_now()).into_message();
        let lakers = text.find("Los Angeles Lakers vs Boston Celtics").unwrap();
        let knicks = text.find("New York Knicks vs Miami Heat").unwrap();
        let warriors = text.find("Golden State Warriors vs Phoenix Suns").unwrap();
        assert!(lakers < knicks && knicks < warriors);
    }

    #[test]
    fn test_negative_edge_renders_sign() {
        // Lakers (6.5) host Celtics (8.3): model below a neutral market
        let games = vec![game("1", ("14", "Los Angeles Lakers"), ("2", "Boston Celtics"))];
        let text = builder().build_at(&games, &[], fixed_now()).into_message();
        assert!(text.contains("🧱 <b>Los Angeles Lakers vs Boston Celtics</b>"));
        assert!(text.contains("Market: 50.0% vs 50.0%"));
        assert!(text.contains("Edge: -4.5% (NO BET)"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A&M <Aggies>"), "A&amp;M &lt;Aggies&gt;");
    }
}
