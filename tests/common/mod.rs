// tests/common/mod.rs
//
// Shared fixtures for route-level tests: a scriptable exchange stub and
// an application state wired to a throwaway config file and an in-memory
// database.

use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use piondash_backend::config::store::ConfigStore;
use piondash_backend::db::Database;
use piondash_backend::routes::common::AppState;
use piondash_backend::services::market_data::PriceBus;
use piondash_backend::services::pionex::{
    AccountBalance, AssetBalance, ExchangeApi, Order, RawKline, Side, Ticker,
};
use piondash_backend::utils::errors::ApiError;

pub struct StubExchange {
    pub available: f64,
    pub holdings: Vec<(String, f64)>,
    pub price: Option<f64>,
    /// Served for every interval; empty means "no candles anywhere".
    pub klines: Vec<RawKline>,
    pub placed: Mutex<Vec<String>>,
}

impl Default for StubExchange {
    fn default() -> Self {
        Self {
            available: 100_000.0,
            holdings: vec![],
            price: Some(50_000.0),
            klines: rising_klines(60, 100.0),
            placed: Mutex::new(vec![]),
        }
    }
}

pub fn rising_klines(n: usize, start: f64) -> Vec<RawKline> {
    (0..n)
        .map(|i| {
            let close = start + i as f64;
            vec![
                json!(1_700_000_000_000i64 + (i as i64) * 300_000),
                json!((close - 1.0).to_string()),
                json!((close + 1.0).to_string()),
                json!((close - 2.0).to_string()),
                json!(close.to_string()),
                json!("10.0"),
            ]
        })
        .collect()
}

#[async_trait]
impl ExchangeApi for StubExchange {
    async fn get_account_balance(&self) -> Result<AccountBalance, ApiError> {
        let balances = vec![AssetBalance {
            currency: "USDT".into(),
            free: self.available,
            frozen: 0.0,
        }];
        Ok(AccountBalance {
            total: self.available,
            available: self.available,
            balances,
        })
    }

    async fn get_positions(&self) -> Result<Vec<AssetBalance>, ApiError> {
        Ok(self
            .holdings
            .iter()
            .map(|(currency, size)| AssetBalance {
                currency: currency.clone(),
                free: *size,
                frozen: 0.0,
            })
            .collect())
    }

    async fn get_ticker_price(&self, symbol: &str) -> Result<Ticker, ApiError> {
        match self.price {
            Some(price) => Ok(Ticker {
                symbol: symbol.to_string(),
                price,
            }),
            None => Err(ApiError::Other("stub: no ticker".into())),
        }
    }

    async fn get_klines(
        &self,
        _symbol: &str,
        _interval: &str,
        _limit: u32,
    ) -> Result<Vec<RawKline>, ApiError> {
        Ok(self.klines.clone())
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
    ) -> Result<Order, ApiError> {
        self.placed
            .lock()
            .unwrap()
            .push(format!("MARKET {side} {quantity} {symbol}"));
        Ok(Order {
            order_id: 7,
            client_order_id: None,
        })
    }

    async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
        price: f64,
    ) -> Result<Order, ApiError> {
        self.placed
            .lock()
            .unwrap()
            .push(format!("LIMIT {side} {quantity} {symbol} @ {price}"));
        Ok(Order {
            order_id: 8,
            client_order_id: None,
        })
    }
}

/// App state backed by a temp config file and an in-memory database. The
/// `TempDir` must stay alive for the duration of the test.
pub async fn test_state(api: Arc<dyn ExchangeApi>) -> (TempDir, web::Data<AppState>) {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigStore::load(dir.path().join("config.json")).await.unwrap();
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let state = web::Data::new(AppState {
        api,
        config: Arc::new(config),
        db,
        bus: Arc::new(PriceBus::new()),
    });
    (dir, state)
}
