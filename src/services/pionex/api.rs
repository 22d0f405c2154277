// src/services/pionex/api.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::errors::ApiError;

/// Order side as the exchange spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Per-currency slice of the account snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBalance {
    pub currency: String,
    pub free: f64,
    pub frozen: f64,
}

impl AssetBalance {
    pub fn total(&self) -> f64 {
        self.free + self.frozen
    }
}

/// Account snapshot as the core consumes it: USDT funding figures up
/// front, full per-currency breakdown behind them. Fetched fresh per
/// call; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub total: f64,
    pub available: f64,
    pub balances: Vec<AssetBalance>,
}

impl AccountBalance {
    pub fn from_balances(balances: Vec<AssetBalance>) -> Self {
        let (total, available) = balances
            .iter()
            .find(|b| b.currency == "USDT")
            .map(|b| (b.total(), b.free))
            .unwrap_or((0.0, 0.0));
        Self {
            total,
            available,
            balances,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub price: f64,
}

/// One kline exactly as the exchange ships it:
/// `[open_time_ms, open, high, low, close, volume, ...]`.
/// Field count and numeric validity are *not* guaranteed; the market-data
/// gateway parses defensively.
pub type RawKline = Vec<serde_json::Value>;

/// Exchange acknowledgement for a placed order, passed through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    #[serde(rename = "clientOrderId", default)]
    pub client_order_id: Option<String>,
}

/// Typed boundary to the exchange. Every failure mode arrives as an
/// `ApiError`; the `result: false` marker in exchange responses becomes
/// `ApiError::Exchange` inside the client.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    async fn get_account_balance(&self) -> Result<AccountBalance, ApiError>;

    /// Per-currency holdings; positions are derived from this snapshot.
    async fn get_positions(&self) -> Result<Vec<AssetBalance>, ApiError>;

    async fn get_ticker_price(&self, symbol: &str) -> Result<Ticker, ApiError>;

    async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<RawKline>, ApiError>;

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
    ) -> Result<Order, ApiError>;

    async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
        price: f64,
    ) -> Result<Order, ApiError>;
}
