//! Technical-analysis assembler: one call in, one displayable result out.
//!
//! The full path runs RSI / MACD / Bollinger over a fetched candle
//! series. When no candles exist anywhere (newly listed or illiquid
//! symbol) the assembler degrades to a single-ticker estimate instead of
//! blocking the dashboard: neutral RSI, flat MACD, synthetic ±2% bands.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::indicators;
use crate::services::market_data::{self, fetch_series_with_fallback, fetch_ticker};
use crate::services::pionex::api::ExchangeApi;
use crate::utils::errors::TradeError;

const ANALYSIS_INTERVAL: &str = "5M";
const ANALYSIS_CANDLES: u32 = 100;

const RSI_PERIOD: usize = 14;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD_DEV: f64 = 2.0;

/// Width of the synthetic bands on the degraded path.
const DEGRADED_BAND_PCT: f64 = 0.02;
const NEUTRAL_RSI: f64 = 50.0;

#[derive(Debug, Clone, Serialize)]
pub struct MacdSnapshot {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BollingerSnapshot {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub current_price: f64,
    pub rsi: f64,
    pub macd: MacdSnapshot,
    pub bollinger_bands: BollingerSnapshot,
    pub timestamp: DateTime<Utc>,
    pub degraded: bool,
}

pub async fn analyze(api: &dyn ExchangeApi, symbol: &str) -> Result<AnalysisResult, TradeError> {
    let normalized = market_data::normalize_symbol(symbol);

    let series =
        match fetch_series_with_fallback(api, &normalized, ANALYSIS_INTERVAL, ANALYSIS_CANDLES)
            .await
        {
            Ok(series) => series,
            Err(TradeError::NoDataAvailable(_)) | Err(TradeError::NoValidData(_)) => {
                return degraded_analysis(api, symbol, &normalized).await;
            }
            Err(e) => return Err(e),
        };

    let closes = &series.close;
    let current_price = series.last_close().unwrap_or(0.0);

    let rsi_series = indicators::rsi(closes, RSI_PERIOD);
    let (macd_line, macd_signal, macd_histogram) = indicators::macd(closes);
    let (bb_upper, bb_middle, bb_lower) =
        indicators::bollinger(closes, BOLLINGER_PERIOD, BOLLINGER_STD_DEV);

    // An indicator series can come back empty on a short candle history;
    // substitute the neutral value rather than failing the whole call.
    Ok(AnalysisResult {
        symbol: symbol.to_string(),
        current_price,
        rsi: rsi_series.last().copied().unwrap_or(NEUTRAL_RSI),
        macd: MacdSnapshot {
            line: macd_line.last().copied().unwrap_or(0.0),
            signal: macd_signal.last().copied().unwrap_or(0.0),
            histogram: macd_histogram.last().copied().unwrap_or(0.0),
        },
        bollinger_bands: BollingerSnapshot {
            upper: bb_upper.last().copied().unwrap_or(0.0),
            middle: bb_middle.last().copied().unwrap_or(0.0),
            lower: bb_lower.last().copied().unwrap_or(0.0),
        },
        timestamp: Utc::now(),
        degraded: false,
    })
}

async fn degraded_analysis(
    api: &dyn ExchangeApi,
    symbol: &str,
    normalized: &str,
) -> Result<AnalysisResult, TradeError> {
    let ticker = fetch_ticker(api, normalized)
        .await
        .map_err(|_| TradeError::NoPriceData(symbol.to_string()))?;
    let price = ticker.price;
    log::info!("degraded analysis for {symbol}: ticker price only");

    Ok(AnalysisResult {
        symbol: symbol.to_string(),
        current_price: price,
        rsi: NEUTRAL_RSI,
        macd: MacdSnapshot {
            line: 0.0,
            signal: 0.0,
            histogram: 0.0,
        },
        bollinger_bands: BollingerSnapshot {
            upper: price * (1.0 + DEGRADED_BAND_PCT),
            middle: price,
            lower: price * (1.0 - DEGRADED_BAND_PCT),
        },
        timestamp: Utc::now(),
        degraded: true,
    })
}
