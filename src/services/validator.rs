//! Balance & position validator: the hard gate every trade passes
//! before an order may reach the exchange.
//!
//! `validate` never fails as a call; every outcome, including upstream
//! faults, is encoded in the returned `ValidationResult` so the caller
//! has exactly one shape to inspect.

use serde::Serialize;

use crate::services::market_data;
use crate::services::pionex::api::{ExchangeApi, Side};
use crate::services::trading_engine::TradeRequest;

/// Above this fraction of available balance a BUY gets an advisory
/// warning. Advisory only, never blocking.
const LARGE_TRADE_FRACTION: f64 = 0.8;

#[derive(Debug, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub estimated_cost: f64,
    pub available_balance: f64,
}

impl ValidationResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            warnings: vec![],
            estimated_cost: 0.0,
            available_balance: 0.0,
        }
    }

    fn reject(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.error = Some(error.into());
    }
}

pub async fn validate(api: &dyn ExchangeApi, req: &TradeRequest) -> ValidationResult {
    // Hard precondition: no balance snapshot, no trade.
    let balance = match api.get_account_balance().await {
        Ok(b) => b,
        Err(e) => {
            log::error!("balance fetch during validation: {e}");
            return ValidationResult::failed("Failed to check account balance");
        }
    };

    let mut result = ValidationResult {
        valid: true,
        error: None,
        warnings: vec![],
        estimated_cost: 0.0,
        available_balance: balance.available,
    };

    match req.side {
        Side::Buy => {
            // Buys are funded from USDT only.
            if !req.symbol.contains("USDT") {
                result.reject("Only USDT pairs are supported for buying");
                return result;
            }

            let symbol = market_data::normalize_symbol(&req.symbol);
            let ticker = match market_data::fetch_ticker(api, &symbol).await {
                Ok(t) => t,
                Err(e) => {
                    log::error!("ticker fetch during validation: {e}");
                    result.reject(format!("Failed to get price for {}", req.symbol));
                    return result;
                }
            };

            // Comparison on full precision; rounding only in the message.
            let estimated_cost = req.quantity * ticker.price;
            result.estimated_cost = estimated_cost;

            if balance.available < estimated_cost {
                result.reject(format!(
                    "Insufficient USDT balance. Required: ${:.2}, Available: ${:.2}",
                    estimated_cost, balance.available
                ));
                return result;
            }

            if estimated_cost > balance.available * LARGE_TRADE_FRACTION {
                result.warnings.push(format!(
                    "This trade will use {:.1}% of your available balance",
                    estimated_cost / balance.available * 100.0
                ));
            }
        }
        Side::Sell => {
            let asset = market_data::base_asset(&req.symbol);
            match api.get_positions().await {
                Ok(balances) => {
                    let held: f64 = balances
                        .iter()
                        .filter(|b| b.currency == asset)
                        .map(|b| b.total())
                        .sum();
                    // Exact comparison, no rounding on quantities.
                    if held < req.quantity {
                        result.reject(format!(
                            "Insufficient {} balance. Required: {}, Available: {}",
                            asset, req.quantity, held
                        ));
                        return result;
                    }
                }
                Err(e) => {
                    log::error!("positions fetch during validation: {e}");
                    result.reject("Failed to check asset balance");
                    return result;
                }
            }
        }
    }

    result
}

// ──────────────────────────────────────────────────────────────
// UNIT-TESTS
// ──────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pionex::mock::MockExchange;

    fn buy(symbol: &str, quantity: f64) -> TradeRequest {
        TradeRequest {
            symbol: symbol.into(),
            side: Side::Buy,
            quantity,
            order_type: "MARKET".into(),
            price: None,
        }
    }

    fn sell(symbol: &str, quantity: f64) -> TradeRequest {
        TradeRequest {
            symbol: symbol.into(),
            side: Side::Sell,
            quantity,
            order_type: "MARKET".into(),
            price: None,
        }
    }

    #[tokio::test]
    async fn balance_fetch_failure_blocks_everything() {
        let api = MockExchange::default(); // no balance configured
        let result = validate(&api, &buy("BTCUSDT", 1.0)).await;
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Failed to check account balance"));
    }

    #[tokio::test]
    async fn buy_rejects_non_usdt_pairs_before_any_price_fetch() {
        // no ticker configured: rejection must happen without needing one
        let api = MockExchange::with_available(1_000.0);
        let result = validate(&api, &buy("BTCEUR", 1.0)).await;
        assert!(!result.valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Only USDT pairs are supported for buying")
        );
    }

    #[tokio::test]
    async fn buy_without_price_is_invalid() {
        let api = MockExchange::with_available(1_000.0); // ticker missing
        let result = validate(&api, &buy("BTCUSDT", 1.0)).await;
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("Failed to get price for BTCUSDT"));
    }

    #[tokio::test]
    async fn insufficient_funds_reports_both_figures() {
        let api = MockExchange::with_available(40_000.0).priced(50_000.0);
        let result = validate(&api, &buy("BTCUSDT", 1.0)).await;
        assert!(!result.valid);
        let msg = result.error.unwrap();
        assert!(msg.contains("50000.00"), "message was: {msg}");
        assert!(msg.contains("40000.00"), "message was: {msg}");
        assert_eq!(result.estimated_cost, 50_000.0);
        assert_eq!(result.available_balance, 40_000.0);
    }

    #[tokio::test]
    async fn affordable_buy_is_valid_with_no_warnings() {
        let api = MockExchange::with_available(1_000.0).priced(100.0);
        let result = validate(&api, &buy("ETHUSDT", 5.0)).await; // 50% of balance
        assert!(result.valid);
        assert!(result.error.is_none());
        assert!(result.warnings.is_empty());
        assert_eq!(result.estimated_cost, 500.0);
    }

    #[tokio::test]
    async fn buy_over_eighty_percent_carries_exactly_one_warning() {
        let api = MockExchange::with_available(1_000.0).priced(100.0);
        let result = validate(&api, &buy("ETHUSDT", 9.0)).await; // 90%
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("90.0%"), "warning: {}", result.warnings[0]);
    }

    #[tokio::test]
    async fn buy_at_exactly_eighty_percent_has_no_warning() {
        let api = MockExchange::with_available(1_000.0).priced(100.0);
        let result = validate(&api, &buy("ETHUSDT", 8.0)).await; // exactly 80%
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn sell_with_sufficient_holdings_is_valid() {
        let api = MockExchange::with_available(100.0).holding("ETH", 5.0);
        let result = validate(&api, &sell("ETHUSDT", 2.0)).await;
        assert!(result.valid);
        assert!(result.error.is_none());
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn sell_more_than_held_is_invalid_regardless_of_price() {
        let api = MockExchange::with_available(1_000_000.0).holding("ETH", 1.0);
        let result = validate(&api, &sell("ETHUSDT", 2.0)).await;
        assert!(!result.valid);
        let msg = result.error.unwrap();
        assert!(msg.contains("Insufficient ETH balance"), "message: {msg}");
        assert!(msg.contains("Required: 2"), "message: {msg}");
    }

    #[tokio::test]
    async fn sell_of_unheld_asset_sees_zero_available() {
        let api = MockExchange::with_available(100.0);
        let result = validate(&api, &sell("SOLUSDT", 0.5)).await;
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("Available: 0"));
    }

    #[tokio::test]
    async fn positions_fetch_failure_fails_the_sell_check() {
        let mut api = MockExchange::with_available(100.0);
        api.positions = None;
        let result = validate(&api, &sell("ETHUSDT", 1.0)).await;
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Failed to check asset balance"));
    }
}
