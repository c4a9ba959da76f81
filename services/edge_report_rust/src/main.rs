mod config;
mod telegram_client;

use anyhow::{anyhow, Result};
use config::{Config, TelegramConfig};
use dotenv::dotenv;
use edge_core::clients::{EspnClient, PolymarketClient};
use edge_core::{ReportBuilder, ReportPipeline, StaticRatingStore};
use log::{error, info};
use std::sync::Arc;
use telegram_client::TelegramClient;

/// Fresh pipeline for one cycle; ratings are re-read so file edits apply.
fn build_pipeline(cfg: &Config) -> ReportPipeline {
    let ratings = StaticRatingStore::load(
        cfg.ratings_path.as_deref(),
        cfg.edge.ratings.neutral_rating(),
    );
    let builder = ReportBuilder::new(&cfg.edge, Arc::new(ratings));

    let pipeline = ReportPipeline::new(
        Arc::new(EspnClient::with_base_url(cfg.espn_base_url.clone())),
        Arc::new(PolymarketClient::with_base_url(cfg.polymarket_url.clone())),
        builder,
    );
    match cfg.quote_fetch_timeout {
        Some(timeout) => pipeline.with_fetch_timeout(timeout),
        None => pipeline,
    }
}

fn bot_error_message(err: &anyhow::Error) -> String {
    format!("🚨 Bot Error: {:#}", err)
}

/// Delivery outcome is logged, never propagated.
async fn deliver(telegram: &TelegramClient, message: &str) -> bool {
    match telegram.send(message).await {
        Ok(()) => {
            info!("Report sent successfully");
            true
        }
        Err(e) => {
            error!("Error sending message: {:#}", e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    info!("Starting NBA edge report...");

    let telegram_cfg = TelegramConfig::from_env()?;
    let telegram = TelegramClient::new(
        telegram_cfg.api_base.clone(),
        telegram_cfg.token.clone(),
        telegram_cfg.chat_id.clone(),
    );

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            deliver(&telegram, &bot_error_message(&e)).await;
            return Err(e);
        }
    };
    info!(
        "Config: strategy={} threshold={} k={} edges={}/{} interval={:?}",
        cfg.edge.matcher.strategy,
        cfg.edge.matcher.threshold,
        cfg.edge.model.scale,
        cfg.edge.classifier.good_bet_edge,
        cfg.edge.classifier.small_edge,
        cfg.report_interval,
    );

    loop {
        let pipeline = build_pipeline(&cfg);
        let cycle = tokio::spawn(async move { pipeline.run_cycle().await });

        match cycle.await {
            Ok(outcome) => {
                if outcome.is_no_games() {
                    info!("No games scheduled for today");
                }
                deliver(&telegram, &outcome.into_message()).await;
            }
            Err(e) => {
                error!("Report cycle aborted: {}", e);
                let err = anyhow!("report cycle aborted: {}", e);
                deliver(&telegram, &bot_error_message(&err)).await;
                return Err(err);
            }
        }

        match cfg.report_interval {
            Some(interval) => {
                info!("Next report in {:?}", interval);
                tokio::time::sleep(interval).await;
            }
            None => break,
        }
    }

    Ok(())
}
