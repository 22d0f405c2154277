// src/services/strategies/manager.rs
//
// Strategy selection and dry-run testing. Selection is persisted twice,
// to the per-user settings table and to the runtime config, so both the
// dashboard and a restarted process agree on the active strategy.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::config::store::ConfigStore;
use crate::db::Database;
use crate::services::market_data::{self, fetch_series_with_fallback};
use crate::services::pionex::ExchangeApi;
use crate::services::strategies::{strategy_for, Signal, StrategyKind};
use crate::utils::errors::TradeError;

pub const DEFAULT_USER: &str = "default";

const TEST_CANDLES: u32 = 100;

#[derive(Debug, Serialize)]
pub struct StrategyOverview {
    pub current_strategy: String,
    pub available_strategies: Vec<&'static str>,
    pub descriptions: HashMap<&'static str, &'static str>,
}

fn overview(current: String) -> StrategyOverview {
    StrategyOverview {
        current_strategy: current,
        available_strategies: StrategyKind::ALL.iter().map(|k| k.as_str()).collect(),
        descriptions: StrategyKind::ALL
            .iter()
            .map(|k| (k.as_str(), k.description()))
            .collect(),
    }
}

/// Active strategy plus the full catalogue for the selection UI. The
/// per-user settings row is authoritative; the config default covers
/// users who never picked one.
pub async fn current_strategy(
    config: &ConfigStore,
    db: &Database,
    user: Option<&str>,
) -> Result<StrategyOverview, TradeError> {
    let user = user.unwrap_or(DEFAULT_USER);
    let settings = db.user_settings(user).await.map_err(TradeError::Api)?;
    let current = match settings.get("default_strategy") {
        Some(name) => name.clone(),
        None => config.get().await.default_strategy,
    };
    Ok(overview(current))
}

/// Switch the active strategy. Unknown names are rejected before anything
/// is written.
pub async fn update_strategy(
    config: &ConfigStore,
    db: &Database,
    user: Option<&str>,
    name: &str,
) -> Result<StrategyOverview, TradeError> {
    let kind = StrategyKind::from_name(name)
        .ok_or_else(|| TradeError::InvalidStrategy(name.to_string()))?;

    let user = user.unwrap_or(DEFAULT_USER);
    db.update_user_setting(user, "default_strategy", kind.as_str())
        .await
        .map_err(TradeError::Api)?;
    let updated = config
        .update(|c| c.default_strategy = kind.as_str().to_string())
        .await
        .map_err(TradeError::Api)?;

    info!("strategy for {user} switched to {}", kind.as_str());
    Ok(overview(updated.default_strategy))
}

/// Outcome of a dry strategy run against live market data.
#[derive(Debug, Serialize)]
pub struct StrategyTestReport {
    pub strategy: String,
    pub symbol: String,
    pub formatted_symbol: String,
    pub signal: Signal,
    pub market_data_points: usize,
    pub current_price: f64,
    pub balance: f64,
    pub timestamp: DateTime<Utc>,
}

/// Evaluate a strategy against current candles without placing an order.
/// Falls back to the configured trading pair when no symbol is given.
pub async fn test_strategy(
    api: &dyn ExchangeApi,
    config: &ConfigStore,
    name: &str,
    symbol: Option<&str>,
) -> Result<StrategyTestReport, TradeError> {
    let kind = StrategyKind::from_name(name)
        .ok_or_else(|| TradeError::InvalidStrategy(name.to_string()))?;

    let cfg = config.get().await;
    let symbol = symbol.unwrap_or(&cfg.trading_pair).to_string();
    let formatted = market_data::normalize_symbol(&symbol);

    // Market data first: a symbol with no candles is reported as such
    // even when the balance fetch would also fail.
    let series =
        fetch_series_with_fallback(api, &formatted, &cfg.default_interval, TEST_CANDLES)
            .await
            .map_err(|e| match e {
                TradeError::NoDataAvailable(_) | TradeError::NoValidData(_) => {
                    TradeError::NoMarketData
                }
                other => other,
            })?;

    let balance = api
        .get_account_balance()
        .await
        .map_err(|_| TradeError::BalanceUnavailable)?;

    let signal = strategy_for(kind).evaluate(&series, balance.available);
    info!(
        "tested {} on {formatted}: {:?} over {} candles",
        kind.as_str(),
        signal,
        series.len()
    );

    Ok(StrategyTestReport {
        strategy: kind.as_str().to_string(),
        symbol,
        formatted_symbol: formatted,
        current_price: series.last_close().unwrap_or(0.0),
        market_data_points: series.len(),
        signal,
        balance: balance.available,
        timestamp: Utc::now(),
    })
}
