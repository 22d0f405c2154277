// src/routes/analysis.rs

use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::routes::common::{error_response, AppState};
use crate::services::market_data::{self, fetch_series_with_fallback, fetch_ticker, PriceUpdate};
use crate::services::analysis;
use crate::utils::types::ApiResponse;

const CHART_CANDLES: u32 = 100;

/// Live price: the WebSocket feed's most recent trade when available,
/// otherwise a fresh REST ticker.
#[get("/price/{symbol}")]
pub async fn live_price(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let symbol = market_data::normalize_symbol(&path);

    if let Some(update) = state.bus.latest(&symbol) {
        return HttpResponse::Ok().json(ApiResponse::ok(update));
    }

    match fetch_ticker(state.api.as_ref(), &symbol).await {
        Ok(ticker) => HttpResponse::Ok().json(ApiResponse::ok(PriceUpdate {
            symbol: ticker.symbol,
            price: ticker.price,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })),
        Err(e) => error_response(&e),
    }
}

#[get("/analysis/{symbol}")]
pub async fn analyze_symbol(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    match analysis::analyze(state.api.as_ref(), &path).await {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::ok(result)),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartParams {
    pub timeframe: Option<String>,
}

#[get("/chart-data/{symbol}")]
pub async fn chart_data(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<ChartParams>,
) -> impl Responder {
    let symbol = market_data::normalize_symbol(&path);
    let interval = match &params.timeframe {
        Some(tf) => tf.clone(),
        None => state.config.get().await.default_interval,
    };

    match fetch_series_with_fallback(state.api.as_ref(), &symbol, &interval, CHART_CANDLES).await
    {
        Ok(series) => HttpResponse::Ok().json(ApiResponse::ok(series)),
        Err(e) => error_response(&e),
    }
}
