// src/routes/strategy.rs

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::routes::common::{error_response, AppState};
use crate::services::market_data;
use crate::services::strategies::manager;
use crate::services::strategies::StrategyKind;
use crate::utils::errors::TradeError;
use crate::utils::types::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: Option<String>,
}

#[get("/strategy")]
pub async fn current_strategy(
    state: web::Data<AppState>,
    params: web::Query<UserParams>,
) -> impl Responder {
    let user = params.user_id.as_deref();
    match manager::current_strategy(&state.config, &state.db, user).await {
        Ok(view) => HttpResponse::Ok().json(ApiResponse::ok(view)),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct StrategyParams {
    pub strategy: String,
    pub user_id: Option<String>,
}

#[post("/strategy")]
pub async fn set_strategy(
    state: web::Data<AppState>,
    params: web::Json<StrategyParams>,
) -> impl Responder {
    let user = params.user_id.as_deref();
    match manager::update_strategy(&state.config, &state.db, user, &params.strategy).await {
        Ok(view) => HttpResponse::Ok().json(ApiResponse::ok(view)),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct StrategyTestParams {
    pub strategy: String,
    pub symbol: Option<String>,
}

#[post("/strategy/test")]
pub async fn test_strategy(
    state: web::Data<AppState>,
    params: web::Json<StrategyTestParams>,
) -> impl Responder {
    let symbol = params.symbol.as_deref();
    match manager::test_strategy(state.api.as_ref(), &state.config, &params.strategy, symbol)
        .await
    {
        Ok(report) => HttpResponse::Ok().json(ApiResponse::ok(report)),
        Err(e) => error_response(&e),
    }
}

#[get("/settings")]
pub async fn get_settings(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::ok(state.config.get().await))
}

/// Partial update: absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub trading_pair: Option<String>,
    pub default_interval: Option<String>,
    pub default_strategy: Option<String>,
    pub position_size: Option<f64>,
    pub stop_loss_percentage: Option<f64>,
    pub take_profit_percentage: Option<f64>,
}

#[post("/settings")]
pub async fn update_settings(
    state: web::Data<AppState>,
    params: web::Json<SettingsUpdate>,
) -> impl Responder {
    if let Some(name) = &params.default_strategy {
        if StrategyKind::from_name(name).is_none() {
            return error_response(&TradeError::InvalidStrategy(name.clone()));
        }
    }

    let update = params.into_inner();
    let result = state
        .config
        .update(move |c| {
            if let Some(pair) = update.trading_pair {
                c.trading_pair = market_data::normalize_symbol(&pair);
            }
            if let Some(interval) = update.default_interval {
                c.default_interval = interval;
            }
            if let Some(strategy) = update.default_strategy {
                c.default_strategy = strategy;
            }
            if let Some(size) = update.position_size {
                c.position_size = size;
            }
            if let Some(sl) = update.stop_loss_percentage {
                c.stop_loss_percentage = sl;
            }
            if let Some(tp) = update.take_profit_percentage {
                c.take_profit_percentage = tp;
            }
        })
        .await;

    match result {
        Ok(config) => HttpResponse::Ok().json(ApiResponse::ok(config)),
        Err(e) => error_response(&TradeError::Api(e)),
    }
}
