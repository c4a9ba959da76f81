use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::models::MarketQuote;
use crate::pipeline::QuoteSource;

pub const POLY_API: &str = "https://gamma-api.polymarket.com/markets";

/// Gamma tag id for NBA markets (see https://gamma-api.polymarket.com/tags).
/// `/markets` only filters by the numeric `tag_id`, not by slug.
pub const NBA_TAG_ID: u64 = 745;

const BATCH_SIZE: usize = 500;
const MAX_FETCH: usize = 5000;

#[derive(Debug, Clone)]
pub struct PolymarketClient {
    client: Client,
    base_url: String,
    tag_id: u64,
}

impl PolymarketClient {
    pub fn new() -> Self {
        Self::with_base_url(POLY_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut client_builder = Client::builder().timeout(std::time::Duration::from_secs(10));

        // Check for proxy in environment
        if let Ok(proxy_url) = std::env::var("POLYMARKET_PROXY_URL") {
            if !proxy_url.is_empty() {
                if let Ok(proxy) = reqwest::Proxy::all(&proxy_url) {
                    client_builder = client_builder.proxy(proxy);
                    info!("Polymarket client using proxy: {}", proxy_url);
                }
            }
        }

        Self {
            client: client_builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
            tag_id: NBA_TAG_ID,
        }
    }

    /// Page through the open markets for the tag, largest volume first.
    pub async fn get_markets(&self) -> Result<Vec<MarketQuote>> {
        let mut all: Vec<MarketQuote> = Vec::new();
        let mut offset: usize = 0;
        let mut fetched: usize = 0;

        loop {
            let params = [
                ("limit", BATCH_SIZE.to_string()),
                ("offset", offset.to_string()),
                ("closed", "false".to_string()),
                ("active", "true".to_string()),
                ("tag_id", self.tag_id.to_string()),
                ("order", "volume".to_string()),
                ("ascending", "false".to_string()),
            ];

            let resp = self
                .client
                .get(&self.base_url)
                .query(&params)
                .send()
                .await
                .context("Polymarket request failed")?;

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                error!("Polymarket API Error: {} - {}", status, text);
                // A later page failing still leaves the earlier pages usable
                if offset == 0 {
                    return Err(anyhow!("Polymarket API returned {}", status));
                }
                break;
            }

            let body: Value = match resp.json().await {
                Ok(body) => body,
                Err(e) if offset > 0 => {
                    error!("Polymarket page at offset {} is not JSON: {}", offset, e);
                    break;
                }
                Err(e) => return Err(e).context("Polymarket response is not JSON"),
            };
            let batch = market_list(&body);
            let count = batch.len();
            if count == 0 {
                break;
            }

            all.extend(parse_markets(batch));
            fetched += count;
            offset += count;

            if count < BATCH_SIZE || fetched >= MAX_FETCH {
                break;
            }
        }

        info!(
            "Polymarket fetched {} markets ({} usable) for tag_id={}",
            fetched,
            all.len(),
            self.tag_id
        );
        Ok(all)
    }
}

impl Default for PolymarketClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for PolymarketClient {
    fn source_name(&self) -> &str {
        "polymarket"
    }

    async fn fetch_quotes(&self) -> Result<Vec<MarketQuote>> {
        self.get_markets().await
    }
}

/// Gamma answers with either a bare array or `{ "data": [...] }`.
fn market_list(body: &Value) -> &[Value] {
    match body {
        Value::Array(arr) => arr,
        Value::Object(_) => body["data"].as_array().map(Vec::as_slice).unwrap_or(&[]),
        _ => &[],
    }
}

/// Quotes from raw market objects; unusable markets are logged and dropped.
pub fn parse_markets(markets: &[Value]) -> Vec<MarketQuote> {
    markets
        .iter()
        .filter_map(|market| match parse_market(market) {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("Skipping Polymarket market {}: {:#}", market["id"], e);
                None
            }
        })
        .collect()
}

/// Parse a full response body (array or `data` envelope).
pub fn parse_response(body: &Value) -> Vec<MarketQuote> {
    parse_markets(market_list(body))
}

fn parse_market(market: &Value) -> Result<MarketQuote> {
    let question = market["question"].as_str().unwrap_or_default();
    let outcomes = parse_json_string_or_array(&market["outcomes"])
        .iter()
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect();

    let raw_prices = match &market["outcomePrices"] {
        Value::Null => &market["prices"],
        other => other,
    };
    let prices = parse_json_string_or_array(raw_prices)
        .iter()
        .map(parse_price)
        .collect();

    Ok(MarketQuote::new(question, outcomes, prices)?)
}

/// Gamma encodes list fields either as JSON arrays or as JSON strings holding
/// an array (`"[\"Yes\", \"No\"]"`).
pub fn parse_json_string_or_array(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(arr) => arr.clone(),
        Value::String(s) => match serde_json::from_str(s) {
            Ok(Value::Array(arr)) => arr,
            _ => vec![],
        },
        _ => vec![],
    }
}

/// Numbers or numeric strings; empty, null and unparsable entries are missing.
fn parse_price(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
