pub mod api;
pub mod auth;
pub mod client;
pub mod ws;

pub use api::{AccountBalance, AssetBalance, ExchangeApi, Order, RawKline, Side, Ticker};
pub use client::PionexClient;

/// Scriptable in-memory exchange for unit tests. `None` on a field means
/// "this call fails"; order placements are recorded for assertions.
#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::api::{AccountBalance, AssetBalance, ExchangeApi, Order, RawKline, Side, Ticker};
    use crate::utils::errors::ApiError;

    pub enum KlineOutcome {
        Fail,
        Empty,
        Data(Vec<RawKline>),
    }

    #[derive(Default)]
    pub struct MockExchange {
        pub balance: Option<AccountBalance>,
        pub positions: Option<Vec<AssetBalance>>,
        pub ticker_price: Option<f64>,
        /// Keyed by interval; intervals not present behave as `Empty`.
        pub klines: HashMap<String, KlineOutcome>,
        pub order_fails: bool,
        pub placed: Mutex<Vec<String>>,
        pub kline_calls: Mutex<Vec<String>>,
    }

    impl MockExchange {
        pub fn with_available(available: f64) -> Self {
            Self {
                balance: Some(AccountBalance {
                    total: available,
                    available,
                    balances: vec![AssetBalance {
                        currency: "USDT".into(),
                        free: available,
                        frozen: 0.0,
                    }],
                }),
                positions: Some(vec![]),
                ..Default::default()
            }
        }

        pub fn holding(mut self, currency: &str, size: f64) -> Self {
            let asset = AssetBalance {
                currency: currency.into(),
                free: size,
                frozen: 0.0,
            };
            self.positions.get_or_insert_with(Vec::new).push(asset);
            self
        }

        pub fn priced(mut self, price: f64) -> Self {
            self.ticker_price = Some(price);
            self
        }

        pub fn with_series(mut self, interval: &str, klines: Vec<RawKline>) -> Self {
            self.klines.insert(interval.into(), KlineOutcome::Data(klines));
            self
        }
    }

    pub fn raw_kline(ts: i64, o: f64, h: f64, l: f64, c: f64, v: f64) -> RawKline {
        vec![
            json!(ts),
            json!(o.to_string()),
            json!(h.to_string()),
            json!(l.to_string()),
            json!(c.to_string()),
            json!(v.to_string()),
        ]
    }

    /// `n` candles with closes walking from `start` by `step`.
    pub fn kline_walk(n: usize, start: f64, step: f64) -> Vec<RawKline> {
        (0..n)
            .map(|i| {
                let close = start + step * i as f64;
                raw_kline(
                    1_700_000_000_000 + (i as i64) * 300_000,
                    close - step,
                    close + close.abs() * 0.01,
                    close - close.abs() * 0.01,
                    close,
                    10.0,
                )
            })
            .collect()
    }

    fn unavailable(what: &str) -> ApiError {
        ApiError::Other(format!("mock: {what} unavailable"))
    }

    #[async_trait]
    impl ExchangeApi for MockExchange {
        async fn get_account_balance(&self) -> Result<AccountBalance, ApiError> {
            self.balance.clone().ok_or_else(|| unavailable("balance"))
        }

        async fn get_positions(&self) -> Result<Vec<AssetBalance>, ApiError> {
            self.positions.clone().ok_or_else(|| unavailable("positions"))
        }

        async fn get_ticker_price(&self, symbol: &str) -> Result<Ticker, ApiError> {
            match self.ticker_price {
                Some(price) => Ok(Ticker {
                    symbol: symbol.to_string(),
                    price,
                }),
                None => Err(unavailable("ticker")),
            }
        }

        async fn get_klines(
            &self,
            _symbol: &str,
            interval: &str,
            _limit: u32,
        ) -> Result<Vec<RawKline>, ApiError> {
            self.kline_calls.lock().unwrap().push(interval.to_string());
            match self.klines.get(interval) {
                Some(KlineOutcome::Fail) => Err(unavailable("klines")),
                Some(KlineOutcome::Empty) | None => Ok(vec![]),
                Some(KlineOutcome::Data(k)) => Ok(k.clone()),
            }
        }

        async fn place_market_order(
            &self,
            symbol: &str,
            side: Side,
            quantity: f64,
        ) -> Result<Order, ApiError> {
            if self.order_fails {
                return Err(unavailable("order"));
            }
            self.placed
                .lock()
                .unwrap()
                .push(format!("MARKET {side} {quantity} {symbol}"));
            Ok(Order {
                order_id: 1,
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
            if self.order_fails {
                return Err(unavailable("order"));
            }
            self.placed
                .lock()
                .unwrap()
                .push(format!("LIMIT {side} {quantity} {symbol} @ {price}"));
            Ok(Order {
                order_id: 2,
                client_order_id: None,
            })
        }
    }
}
