use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use edge_core::clients::espn::ESPN_NBA_SCOREBOARD;
use edge_core::clients::polymarket::POLY_API;
use edge_core::config::{
    EdgeConfig, DEFAULT_GOOD_BET_EDGE, DEFAULT_MATCH_THRESHOLD, DEFAULT_SCALE_K,
    DEFAULT_SMALL_EDGE,
};
use edge_core::MatchStrategy;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Quote fetch pages through up to ten Gamma batches.
const DEFAULT_QUOTE_FETCH_TIMEOUT_SECS: u64 = 60;

/// Delivery settings, read on their own so later config errors can still be
/// reported through the bot.
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            token: required_env("TELEGRAM_TOKEN")?,
            chat_id: required_env("TELEGRAM_CHAT_ID")?,
            api_base: env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_BASE.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,

    pub espn_base_url: String,
    pub polymarket_url: String,
    pub ratings_path: Option<PathBuf>,

    pub edge: EdgeConfig,

    pub quote_fetch_timeout: Option<Duration>,
    /// `None` runs a single cycle and exits.
    pub report_interval: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram = TelegramConfig::from_env()?;

        let espn_base_url =
            env::var("ESPN_BASE_URL").unwrap_or_else(|_| ESPN_NBA_SCOREBOARD.to_string());
        let polymarket_url = env::var("POLYMARKET_URL").unwrap_or_else(|_| POLY_API.to_string());
        let ratings_path = env::var("RATINGS_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let mut edge = EdgeConfig::default();
        edge.model.scale = parse_f64_env("MODEL_SCALE_K", DEFAULT_SCALE_K)?;
        if !(edge.model.scale.is_finite() && edge.model.scale > 0.0) {
            return Err(anyhow!(
                "Invalid MODEL_SCALE_K: {} (expected a positive number)",
                edge.model.scale
            ));
        }
        edge.matcher.threshold = parse_u8_env("MATCH_THRESHOLD", DEFAULT_MATCH_THRESHOLD)?;
        edge.matcher.strategy = parse_strategy_env("MATCH_STRATEGY", MatchStrategy::FirstMatch)?;
        edge.classifier.good_bet_edge = parse_f64_env("GOOD_BET_EDGE", DEFAULT_GOOD_BET_EDGE)?;
        edge.classifier.small_edge = parse_f64_env("SMALL_EDGE", DEFAULT_SMALL_EDGE)?;
        if edge.classifier.small_edge > edge.classifier.good_bet_edge {
            return Err(anyhow!(
                "SMALL_EDGE ({}) must not exceed GOOD_BET_EDGE ({})",
                edge.classifier.small_edge,
                edge.classifier.good_bet_edge
            ));
        }

        let quote_fetch_timeout =
            parse_secs_env("QUOTE_FETCH_TIMEOUT_SECS", Some(DEFAULT_QUOTE_FETCH_TIMEOUT_SECS))?;
        let report_interval = parse_secs_env("REPORT_INTERVAL_SECS", None)?;

        Ok(Self {
            telegram,
            espn_base_url,
            polymarket_url,
            ratings_path,
            edge,
            quote_fetch_timeout,
            report_interval,
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    let raw = env::var(key).with_context(|| format!("{key} must be set"))?;
    if raw.trim().is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(raw.trim().to_string())
}

fn parse_f64_env(key: &str, default: f64) -> Result<f64> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid {key}: {raw} (expected number)"))
}

fn parse_u8_env(key: &str, default: u8) -> Result<u8> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    let value = raw
        .trim()
        .parse::<u8>()
        .with_context(|| format!("Invalid {key}: {raw} (expected integer 0-100)"))?;
    if value > 100 {
        return Err(anyhow!("Invalid {key}: {value} (expected integer 0-100)"));
    }
    Ok(value)
}

/// Seconds as a `Duration`; unset, empty or `0` means `default`/disabled.
fn parse_secs_env(key: &str, default: Option<u64>) -> Result<Option<Duration>> {
    let secs = match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid {key}: {raw} (expected seconds)"))?,
        _ => match default {
            Some(secs) => secs,
            None => return Ok(None),
        },
    };
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

fn parse_strategy_env(key: &str, default: MatchStrategy) -> Result<MatchStrategy> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .parse::<MatchStrategy>()
            .map_err(|e| anyhow!("Invalid {key}: {e}")),
        _ => Ok(default),
    }
}
