// src/utils/errors.rs

use thiserror::Error;
use tungstenite::Error as WsError;

/// Errors coming back across the exchange / persistence boundary.
///
/// The exchange communicates failures as a structured `result: false`
/// marker in the response body; the client converts that into `Exchange`
/// so the rest of the core never probes raw payloads for error strings.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("exchange error {code}: {message}")]
    Exchange { code: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Errors at the orchestration level: upstream faults plus everything the
/// core rejects on its own. Validation outcomes (insufficient funds or
/// holdings) are *not* errors; they live in `ValidationResult`.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid order type: {0}")]
    InvalidOrderType(String),

    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Trade rejected by the balance/position validator. Carries the
    /// validator's message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Failed to check account balance")]
    BalanceUnavailable,

    #[error("No data available for {0}")]
    NoDataAvailable(String),

    #[error("Failed to process chart data for {0}")]
    NoValidData(String),

    #[error("Could not get price data for {0}")]
    NoPriceData(String),

    #[error("No market data available for testing")]
    NoMarketData,
}
