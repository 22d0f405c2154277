//! Account views derived from the balance snapshot: open holdings as
//! positions, and the aggregated portfolio the dashboard renders.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::pionex::api::{AccountBalance, AssetBalance, ExchangeApi};
use crate::utils::errors::TradeError;

/// A holding viewed as a position. Derived per request from the balance
/// snapshot, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub symbol: String,
    pub size: f64,
    pub notional: f64,
}

#[derive(Debug, Serialize)]
pub struct Portfolio {
    pub balance: AccountBalance,
    pub positions: Vec<Position>,
    pub total_value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Non-zero holdings from a balance snapshot.
pub fn positions_from_balances(balances: &[AssetBalance]) -> Vec<Position> {
    balances
        .iter()
        .filter(|b| b.total() > 0.0)
        .map(|b| Position {
            symbol: b.currency.clone(),
            size: b.total(),
            notional: b.total(),
        })
        .collect()
}

pub async fn positions(api: &dyn ExchangeApi) -> Result<Vec<Position>, TradeError> {
    Ok(positions_from_balances(&api.get_positions().await?))
}

pub async fn portfolio(api: &dyn ExchangeApi) -> Result<Portfolio, TradeError> {
    let balance = api.get_account_balance().await?;
    let positions = positions_from_balances(&api.get_positions().await?);
    let total_value = positions.iter().map(|p| p.notional).sum();

    Ok(Portfolio {
        balance,
        positions,
        total_value,
        timestamp: Utc::now(),
    })
}
