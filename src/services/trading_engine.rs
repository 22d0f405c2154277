// src/services/trading_engine.rs
//
// Trade execution coordinator. Strict sequence per request: reject bad
// input before any external call, run the balance/position validator,
// then dispatch exactly one order-placement call. No internal retry;
// the exchange's answer is passed through verbatim.

use serde::Deserialize;

use crate::services::market_data;
use crate::services::pionex::api::{ExchangeApi, Order, Side};
use crate::services::validator;
use crate::utils::errors::TradeError;

#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    /// "MARKET" or "LIMIT"; anything else is rejected without touching
    /// the exchange.
    pub order_type: String,
    pub price: Option<f64>,
}

pub async fn execute_trade(api: &dyn ExchangeApi, req: &TradeRequest) -> Result<Order, TradeError> {
    // Input checks first: nothing leaves the process for a request we
    // would reject anyway.
    if req.quantity <= 0.0 {
        return Err(TradeError::InvalidRequest(
            "quantity must be greater than zero".into(),
        ));
    }

    enum Dispatch {
        Market,
        Limit(f64),
    }

    let dispatch = match req.order_type.as_str() {
        "MARKET" => Dispatch::Market,
        "LIMIT" => match req.price {
            Some(p) if p > 0.0 => Dispatch::Limit(p),
            _ => {
                return Err(TradeError::InvalidRequest(
                    "a positive price is required for LIMIT orders".into(),
                ))
            }
        },
        other => return Err(TradeError::InvalidOrderType(other.to_string())),
    };

    // One validation policy for the whole system: the same validator the
    // /trade/validate endpoint uses gates execution here.
    let validation = validator::validate(api, req).await;
    if !validation.valid {
        let reason = validation
            .error
            .unwrap_or_else(|| "trade validation failed".into());
        log::warn!("trade rejected for {}: {reason}", req.symbol);
        return Err(TradeError::Rejected(reason));
    }
    for warning in &validation.warnings {
        log::warn!("trade warning for {}: {warning}", req.symbol);
    }

    let symbol = market_data::normalize_symbol(&req.symbol);
    let order = match dispatch {
        Dispatch::Market => api.place_market_order(&symbol, req.side, req.quantity).await?,
        Dispatch::Limit(price) => {
            api.place_limit_order(&symbol, req.side, req.quantity, price)
                .await?
        }
    };

    log::info!(
        "order {} placed: {} {} {} {}",
        order.order_id,
        req.order_type,
        req.side,
        req.quantity,
        symbol
    );
    Ok(order)
}
