//! Market-data gateway: symbol normalization, kline retrieval with the
//! ordered interval fallback, and the live price fan-out bus.
//!
//! Every fetch goes straight to the exchange; nothing here is cached, so
//! callers always see a fresh snapshot at the cost of a round trip.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::{self, Sender};

use crate::services::pionex::api::{ExchangeApi, RawKline, Ticker};
use crate::utils::errors::TradeError;

/// Quote assets whose concatenated pairs we recognize (`BTCUSDT` etc).
const QUOTE_ASSETS: [&str; 3] = ["USDT", "USDC", "BUSD"];

/// Interval candidates appended after the requested one, in the order
/// they are tried.
const FALLBACK_INTERVALS: [&str; 4] = ["5M", "1M", "15M", "1H"];

const CAPACITY: usize = 256; // ring-buffer for the price topic

/// Insert the `_` separator before a recognized quote suffix:
/// `BTCUSDT` becomes `BTC_USDT`. Symbols that already carry a separator
/// pass through unchanged, so normalization is idempotent.
pub fn normalize_symbol(symbol: &str) -> String {
    if symbol.contains('_') {
        return symbol.to_string();
    }
    for quote in QUOTE_ASSETS {
        if let Some(base) = symbol.strip_suffix(quote) {
            if !base.is_empty() {
                return format!("{base}_{quote}");
            }
        }
    }
    symbol.to_string()
}

/// Strip separator and quote suffix: `ETH_USDT` / `ETHUSDT` -> `ETH`.
pub fn base_asset(symbol: &str) -> String {
    let stripped = symbol.replace('_', "");
    for quote in QUOTE_ASSETS {
        if let Some(base) = stripped.strip_suffix(quote) {
            if !base.is_empty() {
                return base.to_string();
            }
        }
    }
    stripped
}

/// Parallel OHLCV vectors plus the interval that actually produced them.
/// All vectors are the same length by construction.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub timestamps: Vec<i64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub resolved_interval: String,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}

pub async fn fetch_ticker(api: &dyn ExchangeApi, symbol: &str) -> Result<Ticker, TradeError> {
    Ok(api.get_ticker_price(symbol).await?)
}

pub async fn fetch_klines(
    api: &dyn ExchangeApi,
    symbol: &str,
    interval: &str,
    limit: u32,
) -> Result<ChartSeries, TradeError> {
    let raw = api.get_klines(symbol, interval, limit).await?;
    parse_klines(symbol, interval, &raw)
}

/// Try `[requested, "5M", "1M", "15M", "1H"]` (deduplicated) and return
/// the first candidate that succeeds with a non-empty kline list. The
/// resulting series records which interval won. No retry once every
/// candidate has been exhausted.
pub async fn fetch_series_with_fallback(
    api: &dyn ExchangeApi,
    symbol: &str,
    interval: &str,
    limit: u32,
) -> Result<ChartSeries, TradeError> {
    let mut candidates: Vec<&str> = vec![interval];
    for fallback in FALLBACK_INTERVALS {
        if !candidates.contains(&fallback) {
            candidates.push(fallback);
        }
    }

    for candidate in candidates {
        match api.get_klines(symbol, candidate, limit).await {
            Ok(raw) if !raw.is_empty() => {
                log::info!("got {} klines for {symbol} at interval {candidate}", raw.len());
                return parse_klines(symbol, candidate, &raw);
            }
            Ok(_) => {
                log::warn!("empty kline response for {symbol} at interval {candidate}");
            }
            Err(e) => {
                log::warn!("klines {symbol} interval {candidate} failed: {e}");
            }
        }
    }

    Err(TradeError::NoDataAvailable(symbol.to_string()))
}

/// Per-candle parsing is defensive: a candle with fewer than 6 fields or
/// a field that refuses to parse is skipped, not fatal. Only a series
/// where *nothing* parses fails.
fn parse_klines(
    symbol: &str,
    interval: &str,
    raw: &[RawKline],
) -> Result<ChartSeries, TradeError> {
    let mut series = ChartSeries {
        timestamps: Vec::with_capacity(raw.len()),
        open: Vec::with_capacity(raw.len()),
        high: Vec::with_capacity(raw.len()),
        low: Vec::with_capacity(raw.len()),
        close: Vec::with_capacity(raw.len()),
        volume: Vec::with_capacity(raw.len()),
        resolved_interval: interval.to_string(),
    };

    for kline in raw {
        if kline.len() < 6 {
            log::warn!("skipping short kline for {symbol}: {} fields", kline.len());
            continue;
        }
        let parsed = (
            field_i64(&kline[0]),
            field_f64(&kline[1]),
            field_f64(&kline[2]),
            field_f64(&kline[3]),
            field_f64(&kline[4]),
            field_f64(&kline[5]),
        );
        match parsed {
            (Some(ts), Some(o), Some(h), Some(l), Some(c), Some(v)) => {
                series.timestamps.push(ts);
                series.open.push(o);
                series.high.push(h);
                series.low.push(l);
                series.close.push(c);
                series.volume.push(v);
            }
            _ => log::warn!("skipping malformed kline for {symbol}"),
        }
    }

    if series.is_empty() {
        return Err(TradeError::NoValidData(symbol.to_string()));
    }
    Ok(series)
}

/// Kline fields arrive as JSON numbers or as quoted decimal strings
/// depending on the endpoint; accept both.
fn field_f64(v: &Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str()?.parse().ok())
}

fn field_i64(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_str()?.parse().ok())
}

/* ───────────────────────────── live price fan-out ───────────────────── */

#[derive(Debug, Clone, Serialize)]
pub struct PriceUpdate {
    pub symbol: String,
    pub price: f64,
    pub timestamp: i64,
}

/// Fan-out bus for real-time prices published by the WebSocket feed.
/// Keeps the most recent update per symbol so request handlers can read
/// the live price without holding a subscription open.
pub struct PriceBus {
    tx: Sender<PriceUpdate>,
    latest: RwLock<HashMap<String, PriceUpdate>>,
}

impl PriceBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CAPACITY);
        Self {
            tx,
            latest: RwLock::new(HashMap::new()),
        }
    }

    /// Record the update as current for its symbol and fan it out. A send
    /// with no live subscriber is fine; the snapshot still serves reads.
    pub fn publish(&self, update: PriceUpdate) {
        if let Ok(mut latest) = self.latest.write() {
            latest.insert(update.symbol.clone(), update.clone());
        }
        let _ = self.tx.send(update);
    }

    /// Most recent update for `symbol`, if the feed has seen one.
    pub fn latest(&self, symbol: &str) -> Option<PriceUpdate> {
        self.latest.read().ok()?.get(symbol).cloned()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PriceUpdate> {
        self.tx.subscribe()
    }
}

impl Default for PriceBus {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────────────────────
// UNIT-TESTS
// ──────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pionex::mock::{raw_kline, KlineOutcome, MockExchange};
    use serde_json::json;

    #[test]
    fn normalization_inserts_separator_before_quote() {
        assert_eq!(normalize_symbol("BTCUSDT"), "BTC_USDT");
        assert_eq!(normalize_symbol("ETHUSDC"), "ETH_USDC");
        assert_eq!(normalize_symbol("DOGEBUSD"), "DOGE_BUSD");
    }

    #[test]
    fn normalization_is_idempotent() {
        assert_eq!(normalize_symbol("BTC_USDT"), "BTC_USDT");
        assert_eq!(normalize_symbol(&normalize_symbol("BTCUSDT")), "BTC_USDT");
    }

    #[test]
    fn unknown_quote_passes_through() {
        assert_eq!(normalize_symbol("BTCEUR"), "BTCEUR");
        // a bare quote asset is not a pair
        assert_eq!(normalize_symbol("USDT"), "USDT");
    }

    #[test]
    fn base_asset_strips_quote() {
        assert_eq!(base_asset("ETHUSDT"), "ETH");
        assert_eq!(base_asset("ETH_USDT"), "ETH");
        assert_eq!(base_asset("BTC_USDC"), "BTC");
    }

    #[tokio::test]
    async fn fallback_reports_the_interval_that_yielded_data() {
        let mut api = MockExchange::default();
        // requested 1D fails, 5M errors, 1M empty, 15M finally has data
        api.klines.insert("1D".into(), KlineOutcome::Fail);
        api.klines.insert("5M".into(), KlineOutcome::Fail);
        api.klines.insert("1M".into(), KlineOutcome::Empty);
        api.klines.insert(
            "15M".into(),
            KlineOutcome::Data(vec![raw_kline(1_700_000_000_000, 1.0, 2.0, 0.5, 1.5, 10.0)]),
        );

        let series = fetch_series_with_fallback(&api, "BTC_USDT", "1D", 100)
            .await
            .unwrap();
        assert_eq!(series.resolved_interval, "15M");
        assert_eq!(series.len(), 1);
    }

    #[tokio::test]
    async fn fallback_exhaustion_is_no_data_available() {
        let mut api = MockExchange::default();
        for interval in ["5M", "1M", "15M", "1H"] {
            api.klines.insert(interval.into(), KlineOutcome::Fail);
        }
        let err = fetch_series_with_fallback(&api, "BTC_USDT", "5M", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::NoDataAvailable(_)));
    }

    #[tokio::test]
    async fn requested_interval_is_tried_first_and_deduplicated() {
        let mut api = MockExchange::default();
        api.klines.insert(
            "5M".into(),
            KlineOutcome::Data(vec![raw_kline(1, 1.0, 1.0, 1.0, 1.0, 1.0)]),
        );
        let series = fetch_series_with_fallback(&api, "BTC_USDT", "5M", 100)
            .await
            .unwrap();
        assert_eq!(series.resolved_interval, "5M");
        assert_eq!(*api.kline_calls.lock().unwrap(), vec!["5M".to_string()]);
    }

    #[test]
    fn malformed_candles_are_skipped_not_fatal() {
        let raw = vec![
            raw_kline(1, 1.0, 2.0, 0.5, 1.5, 10.0),
            vec![json!(2), json!("oops")],                       // short
            vec![json!(3), json!("x"), json!("1"), json!("1"), json!("1"), json!("1")], // bad field
            raw_kline(4, 1.1, 2.1, 0.6, 1.6, 11.0),
        ];
        let series = parse_klines("BTC_USDT", "5M", &raw).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.timestamps, vec![1, 4]);
    }

    #[test]
    fn all_candles_malformed_is_no_valid_data() {
        let raw = vec![vec![json!(1)], vec![json!("junk")]];
        let err = parse_klines("BTC_USDT", "5M", &raw).unwrap_err();
        assert!(matches!(err, TradeError::NoValidData(_)));
    }

    #[test]
    fn bus_serves_the_latest_price_per_symbol() {
        let bus = PriceBus::new();
        assert!(bus.latest("BTC_USDT").is_none());

        bus.publish(PriceUpdate {
            symbol: "BTC_USDT".into(),
            price: 50_000.0,
            timestamp: 1,
        });
        bus.publish(PriceUpdate {
            symbol: "BTC_USDT".into(),
            price: 50_100.0,
            timestamp: 2,
        });
        bus.publish(PriceUpdate {
            symbol: "ETH_USDT".into(),
            price: 3_000.0,
            timestamp: 3,
        });

        assert_eq!(bus.latest("BTC_USDT").unwrap().price, 50_100.0);
        assert_eq!(bus.latest("ETH_USDT").unwrap().price, 3_000.0);
        assert!(bus.latest("SOL_USDT").is_none());
    }

    #[tokio::test]
    async fn subscribers_receive_published_updates() {
        let bus = PriceBus::new();
        let mut rx = bus.subscribe();
        bus.publish(PriceUpdate {
            symbol: "BTC_USDT".into(),
            price: 50_000.0,
            timestamp: 1,
        });
        let update = rx.recv().await.unwrap();
        assert_eq!(update.symbol, "BTC_USDT");
        assert_eq!(update.price, 50_000.0);
    }

    #[test]
    fn numeric_and_string_fields_both_parse() {
        let mixed = vec![vec![
            json!(1_700_000_000_000_i64),
            json!(100.5),
            json!("101.0"),
            json!("99.5"),
            json!(100.0),
            json!("12.25"),
        ]];
        let series = parse_klines("BTC_USDT", "1M", &mixed).unwrap();
        assert_eq!(series.high, vec![101.0]);
        assert_eq!(series.volume, vec![12.25]);
    }
}
