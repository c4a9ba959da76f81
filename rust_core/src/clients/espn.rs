use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::models::{Game, Team};
use crate::pipeline::GameSource;

pub const ESPN_NBA_SCOREBOARD: &str =
    "http://site.api.espn.com/apis/site/v2/sports/basketball/nba/scoreboard";

#[derive(Clone)]
pub struct EspnClient {
    client: Client,
    base_url: String,
    date: Option<NaiveDate>,
}

impl std::fmt::Debug for EspnClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EspnClient")
            .field("base_url", &self.base_url)
            .field("date", &self.date)
            .finish()
    }
}

impl EspnClient {
    pub fn new() -> Self {
        Self::with_base_url(ESPN_NBA_SCOREBOARD)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
            date: None,
        }
    }

    /// Ask for a specific day's slate instead of ESPN's "today".
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub async fn get_games(&self, date: Option<NaiveDate>) -> Result<Vec<Game>> {
        let mut request = self.client.get(&self.base_url);
        if let Some(date) = date {
            request = request.query(&[("dates", date.format("%Y%m%d").to_string())]);
        }

        let resp = request
            .send()
            .await
            .context("ESPN scoreboard request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("ESPN scoreboard returned {}", resp.status()));
        }
        let data: Value = resp
            .json()
            .await
            .context("ESPN scoreboard body is not JSON")?;

        let games = parse_scoreboard(&data);
        info!("ESPN returned {} NBA games", games.len());
        Ok(games)
    }
}

impl Default for EspnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameSource for EspnClient {
    fn source_name(&self) -> &str {
        "espn"
    }

    async fn fetch_games(&self) -> Result<Vec<Game>> {
        self.get_games(self.date).await
    }
}

/// Games from a scoreboard payload. Events missing an id, a date or either
/// side are skipped.
pub fn parse_scoreboard(data: &Value) -> Vec<Game> {
    let Some(events) = data["events"].as_array() else {
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|event| match parse_event(event) {
            Ok(game) => Some(game),
            Err(e) => {
                warn!("Skipping ESPN event {}: {:#}", event["id"], e);
                None
            }
        })
        .collect()
}

fn parse_event(event: &Value) -> Result<Game> {
    let id = event["id"].as_str().unwrap_or_default();

    // "2024-01-15T00:30Z"
    let raw_date = event["date"].as_str().unwrap_or_default();
    let date = raw_date
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| anyhow!("unparsable date '{}'", raw_date))?;

    let mut home: Option<Team> = None;
    let mut away: Option<Team> = None;
    if let Some(comps) = event["competitions"][0]["competitors"].as_array() {
        for comp in comps {
            let team = &comp["team"];
            let team_id = match &team["id"] {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => String::new(),
            };
            let team_name = team["displayName"].as_str().unwrap_or_default();
            let parsed = Team::new(team_id, team_name)?;

            match comp["homeAway"].as_str() {
                Some("home") => home = Some(parsed),
                Some("away") => away = Some(parsed),
                _ => {}
            }
        }
    }

    let home = home.ok_or_else(|| anyhow!("no home competitor"))?;
    let away = away.ok_or_else(|| anyhow!("no away competitor"))?;
    Ok(Game::new(id, date, home, away)?)
}
