// src/db/models.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Executed trade as stored, returned by the history endpoint.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TradeRecord {
    pub id: i64,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub quantity: f64,
    pub price: Option<f64>,
    pub order_id: String,
    pub created_at: DateTime<Utc>,
}

/// Trade about to be recorded; the id and timestamp are assigned on
/// insert.
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub quantity: f64,
    pub price: Option<f64>,
    pub order_id: String,
}
