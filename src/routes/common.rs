// src/routes/common.rs
//
// Shared route plumbing: the application state handed to every handler
// and the mapping from orchestration errors to HTTP statuses.

use std::sync::Arc;

use actix_web::{web, HttpResponse, Scope};

use crate::config::store::ConfigStore;
use crate::db::Database;
use crate::services::market_data::PriceBus;
use crate::services::pionex::ExchangeApi;
use crate::utils::errors::TradeError;
use crate::utils::types::ApiResponse;

pub struct AppState {
    pub api: Arc<dyn ExchangeApi>,
    pub config: Arc<ConfigStore>,
    pub db: Database,
    pub bus: Arc<PriceBus>,
}

/// Everything the dashboard talks to, mounted under one `/api` prefix.
pub fn api_scope() -> Scope {
    use crate::routes::{analysis, strategy, trading};

    web::scope("/api")
        .service(trading::balance)
        .service(trading::positions)
        .service(trading::portfolio)
        .service(trading::history)
        .service(trading::trade)
        .service(trading::validate_trade)
        .service(analysis::analyze_symbol)
        .service(analysis::chart_data)
        .service(analysis::live_price)
        .service(strategy::current_strategy)
        .service(strategy::set_strategy)
        .service(strategy::test_strategy)
        .service(strategy::get_settings)
        .service(strategy::update_settings)
}

/// Bad input is the caller's fault, missing market data is not found,
/// everything upstream is a server error. The envelope carries the
/// error's display text either way.
pub fn error_response(e: &TradeError) -> HttpResponse {
    let body = ApiResponse::<()>::err(e.to_string());
    match e {
        TradeError::InvalidOrderType(_)
        | TradeError::InvalidStrategy(_)
        | TradeError::InvalidRequest(_)
        | TradeError::Rejected(_) => HttpResponse::BadRequest().json(body),
        TradeError::NoDataAvailable(_)
        | TradeError::NoValidData(_)
        | TradeError::NoPriceData(_)
        | TradeError::NoMarketData => HttpResponse::NotFound().json(body),
        TradeError::BalanceUnavailable | TradeError::Api(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}
