// src/routes/trading.rs

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::db::NewTrade;
use crate::routes::common::{error_response, AppState};
use crate::services::market_data;
use crate::services::trading_engine::{execute_trade, TradeRequest};
use crate::services::{account, validator};
use crate::utils::types::ApiResponse;

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

#[get("/balance")]
pub async fn balance(state: web::Data<AppState>) -> impl Responder {
    match state.api.get_account_balance().await {
        Ok(b) => HttpResponse::Ok().json(ApiResponse::ok(b)),
        Err(e) => {
            HttpResponse::InternalServerError().json(ApiResponse::<()>::err(e.to_string()))
        }
    }
}

#[get("/positions")]
pub async fn positions(state: web::Data<AppState>) -> impl Responder {
    match account::positions(state.api.as_ref()).await {
        Ok(p) => HttpResponse::Ok().json(ApiResponse::ok(p)),
        Err(e) => error_response(&e),
    }
}

#[get("/portfolio")]
pub async fn portfolio(state: web::Data<AppState>) -> impl Responder {
    match account::portfolio(state.api.as_ref()).await {
        Ok(p) => HttpResponse::Ok().json(ApiResponse::ok(p)),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

#[get("/history")]
pub async fn history(
    state: web::Data<AppState>,
    params: web::Query<HistoryParams>,
) -> impl Responder {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    match state.db.recent_trades(limit).await {
        Ok(trades) => HttpResponse::Ok().json(ApiResponse::ok(trades)),
        Err(e) => {
            HttpResponse::InternalServerError().json(ApiResponse::<()>::err(e.to_string()))
        }
    }
}

#[post("/trade")]
pub async fn trade(
    state: web::Data<AppState>,
    params: web::Json<TradeRequest>,
) -> impl Responder {
    match execute_trade(state.api.as_ref(), &params).await {
        Ok(order) => {
            let record = NewTrade {
                symbol: market_data::normalize_symbol(&params.symbol),
                side: params.side.to_string(),
                order_type: params.order_type.clone(),
                quantity: params.quantity,
                price: params.price,
                order_id: order.order_id.to_string(),
            };
            // History is best-effort; a placed order is reported placed
            // even if recording it fails.
            if let Err(e) = state.db.record_trade(&record).await {
                log::error!("recording trade {}: {e}", order.order_id);
            }
            HttpResponse::Ok().json(ApiResponse {
                success: true,
                message: Some("Trade executed successfully".to_string()),
                data: Some(order),
            })
        }
        Err(e) => error_response(&e),
    }
}

#[post("/trade/validate")]
pub async fn validate_trade(
    state: web::Data<AppState>,
    params: web::Json<TradeRequest>,
) -> impl Responder {
    let result = validator::validate(state.api.as_ref(), &params).await;
    HttpResponse::Ok().json(ApiResponse::ok(result))
}
