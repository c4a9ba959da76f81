//! One reporting cycle: fetch games, fetch quotes once, build the report.
//!
//! Upstream failures never abort a cycle. A failed game fetch reads as an
//! empty schedule; a failed or slow quote fetch leaves every market neutral.

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::ResolutionFailure;
use crate::models::{Game, MarketQuote};
use crate::report::{ReportBuilder, ReportOutcome};

/// Today's schedule.
#[async_trait]
pub trait GameSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn fetch_games(&self) -> Result<Vec<Game>>;
}

/// Open prediction-market quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn fetch_quotes(&self) -> Result<Vec<MarketQuote>>;
}

pub struct ReportPipeline {
    games: Arc<dyn GameSource>,
    quotes: Arc<dyn QuoteSource>,
    builder: Arc<ReportBuilder>,
    fetch_timeout: Option<Duration>,
}

impl ReportPipeline {
    pub fn new(
        games: Arc<dyn GameSource>,
        quotes: Arc<dyn QuoteSource>,
        builder: ReportBuilder,
    ) -> Self {
        Self {
            games,
            quotes,
            builder: Arc::new(builder),
            fetch_timeout: None,
        }
    }

    /// Bound the quote fetch; hitting the limit counts as a fetch failure.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub async fn run_cycle(&self) -> ReportOutcome {
        let cycle_id = Uuid::new_v4();
        info!("Starting report cycle {}", cycle_id);

        let games = match self.games.fetch_games().await {
            Ok(games) => games,
            Err(e) => {
                error!(
                    "Error fetching games from {}: {:#}",
                    self.games.source_name(),
                    e
                );
                Vec::new()
            }
        };

        if games.is_empty() {
            info!("Cycle {}: no games scheduled", cycle_id);
            return ReportOutcome::NoGames;
        }
        info!("Cycle {}: found {} games", cycle_id, games.len());

        let outcome = self.build_report(&games).await;
        info!("Finished report cycle {}", cycle_id);
        outcome
    }

    /// Build the report for a known schedule, fetching quotes once.
    pub async fn build_report(&self, games: &[Game]) -> ReportOutcome {
        if games.is_empty() {
            return ReportOutcome::NoGames;
        }

        let quotes = match self.fetch_quotes().await {
            Ok(quotes) => {
                info!(
                    "Fetched {} market quotes from {}",
                    quotes.len(),
                    self.quotes.source_name()
                );
                quotes
            }
            Err(e) => {
                error!("{}, all markets default to 0.5/0.5", e);
                Vec::new()
            }
        };

        // Scoring fans out over rayon; keep it off the async workers
        let builder = Arc::clone(&self.builder);
        let games = games.to_vec();
        match tokio::task::spawn_blocking(move || builder.build(&games, &quotes)).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                error!("Report build task was cancelled: {}", e);
                ReportOutcome::NoGames
            }
        }
    }

    async fn fetch_quotes(&self) -> Result<Vec<MarketQuote>, ResolutionFailure> {
        let fetch = self.quotes.fetch_quotes();
        let result = match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, fetch).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "Quote fetch from {} timed out after {:?}",
                        self.quotes.source_name(),
                        limit
                    );
                    return Err(ResolutionFailure::QuoteFetch(format!(
                        "timed out after {}s",
                        limit.as_secs_f64()
                    )));
                }
            },
            None => fetch.await,
        };

        result.map_err(|e| ResolutionFailure::QuoteFetch(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgeConfig;
    use crate::models::{Rating, Team, TeamId};
    use crate::ratings::StaticRatingStore;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FixedGames(Result<Vec<Game>, String>);

    #[async_trait]
    impl GameSource for FixedGames {
        fn source_name(&self) -> &str {
            "fixed"
        }

        async fn fetch_games(&self) -> Result<Vec<Game>> {
            self.0.clone().map_err(|e| anyhow!(e))
        }
    }

    struct CountingQuotes {
        quotes: Result<Vec<MarketQuote>, String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl CountingQuotes {
        fn ok(quotes: Vec<MarketQuote>) -> Self {
            Self {
                quotes: Ok(quotes),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuoteSource for CountingQuotes {
        fn source_name(&self) -> &str {
            "counting"
        }

        async fn fetch_quotes(&self) -> Result<Vec<MarketQuote>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.quotes.clone().map_err(|e| anyhow!(e))
        }
    }

    fn lakers_celtics() -> Game {
        Game::new(
            "401585001",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Team::new("2", "Boston Celtics").unwrap(),
            Team::new("14", "Los Angeles Lakers").unwrap(),
        )
        .unwrap()
    }

    fn market() -> MarketQuote {
        MarketQuote::new(
            "Boston Celtics vs. Los Angeles Lakers",
            vec!["Boston Celtics".to_string(), "Los Angeles Lakers".to_string()],
            vec![Some(0.62), Some(0.38)],
        )
        .unwrap()
    }

    fn builder() -> ReportBuilder {
        let store = StaticRatingStore::with_ratings(
            Rating::new(110.0, 110.0),
            vec![
                (TeamId::from(2), Rating::new(118.5, 110.2)),
                (TeamId::from(14), Rating::new(115.2, 108.7)),
            ],
        );
        ReportBuilder::new(&EdgeConfig::default(), Arc::new(store))
    }

    #[tokio::test]
    async fn test_no_games_skips_quote_fetch() {
        let quotes = Arc::new(CountingQuotes::ok(vec![market()]));
        let pipeline = ReportPipeline::new(Arc::new(FixedGames(Ok(vec![]))), quotes.clone(), builder());

        assert!(pipeline.run_cycle().await.is_no_games());
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_game_fetch_failure_reads_as_no_games() {
        let pipeline = ReportPipeline::new(
            Arc::new(FixedGames(Err("scoreboard down".to_string()))),
            Arc::new(CountingQuotes::ok(vec![market()])),
            builder(),
        );
        assert!(pipeline.run_cycle().await.is_no_games());
    }

    #[tokio::test]
    async fn test_quotes_fetched_once_per_cycle() {
        let quotes = Arc::new(CountingQuotes::ok(vec![market()]));
        let games = vec![lakers_celtics(), lakers_celtics(), lakers_celtics()];
        let pipeline = ReportPipeline::new(Arc::new(FixedGames(Ok(games))), quotes.clone(), builder());

        let text = pipeline.run_cycle().await.into_message();
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 1);
        assert_eq!(text.matches("Market: 62.0% vs 38.0%").count(), 3);
    }

    #[tokio::test]
    async fn test_quote_fetch_failure_uses_neutral_markets() {
        let quotes = Arc::new(CountingQuotes {
            quotes: Err("gamma 503".to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        });
        let pipeline = ReportPipeline::new(
            Arc::new(FixedGames(Ok(vec![lakers_celtics()]))),
            quotes,
            builder(),
        );

        let text = pipeline.run_cycle().await.into_message();
        assert!(text.contains("Market: 50.0% vs 50.0%"));
        assert!(text.contains("Model: 54.5% vs 45.5%"));
    }

    #[tokio::test]
    async fn test_quote_fetch_timeout_uses_neutral_markets() {
        let quotes = Arc::new(CountingQuotes {
            quotes: Ok(vec![market()]),
            delay: Some(Duration::from_millis(500)),
            calls: AtomicUsize::new(0),
        });
        let pipeline = ReportPipeline::new(
            Arc::new(FixedGames(Ok(vec![lakers_celtics()]))),
            quotes,
            builder(),
        )
        .with_fetch_timeout(Duration::from_millis(20));

        let text = pipeline.run_cycle().await.into_message();
        assert!(text.contains("Market: 50.0% vs 50.0%"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_report_build_yields_to_other_tasks() {
        let games: Vec<Game> = (0..200).map(|_| lakers_celtics()).collect();
        let pipeline = ReportPipeline::new(
            Arc::new(FixedGames(Ok(games.clone()))),
            Arc::new(CountingQuotes::ok(vec![market()])),
            builder(),
        );

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        let text = pipeline.build_report(&games).await.into_message();
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(text.matches("Market: 62.0% vs 38.0%").count(), 200);
    }
}
