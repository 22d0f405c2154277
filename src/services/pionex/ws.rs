//! Public WebSocket trade feed. Connects, subscribes to the TRADE topic
//! for one symbol and forwards every price onto the [`PriceBus`].
//!
//! The feed only publishes; request handling never depends on it, so a
//! dropped connection degrades the dashboard's live ticker and nothing
//! else.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_tungstenite::connect_async;
use tungstenite::Message;

use crate::services::market_data::{PriceBus, PriceUpdate};

const WS_URL: &str = "wss://ws.pionex.com/wsPub";

#[derive(Debug, Deserialize)]
struct WsFrame {
    #[serde(default)]
    op: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    data: Option<Vec<WsTrade>>,
}

#[derive(Debug, Deserialize)]
struct WsTrade {
    price: String,
    #[serde(default)]
    timestamp: i64,
}

pub async fn run_price_feed(symbol: String, bus: Arc<PriceBus>) {
    let (mut ws, _) = match connect_async(WS_URL).await {
        Ok(t) => t,
        Err(e) => {
            log::error!("pionex ws connect: {e}");
            return;
        }
    };

    let sub = json!({ "op": "SUBSCRIBE", "topic": "TRADE", "symbol": symbol }).to_string();
    if let Err(e) = ws.send(Message::Text(sub.into())).await {
        log::error!("pionex ws subscribe: {e}");
        return;
    }
    log::info!("subscribed to TRADE feed for {symbol}");

    while let Some(Ok(msg)) = ws.next().await {
        let Message::Text(txt) = &msg else { continue };
        let Ok(frame) = serde_json::from_str::<WsFrame>(txt.as_str()) else {
            continue;
        };

        // server-initiated keepalive must be answered or we get dropped
        if frame.op.as_deref() == Some("PING") {
            let pong = json!({ "op": "PONG", "timestamp": frame.timestamp.unwrap_or_default() })
                .to_string();
            if let Err(e) = ws.send(Message::Text(pong.into())).await {
                log::error!("pionex ws pong: {e}");
                break;
            }
            continue;
        }

        if frame.topic.as_deref() != Some("TRADE") {
            continue;
        }
        let sym = frame.symbol.unwrap_or_else(|| symbol.clone());
        for trade in frame.data.unwrap_or_default() {
            if let Ok(price) = trade.price.parse::<f64>() {
                bus.publish(PriceUpdate {
                    symbol: sym.clone(),
                    price,
                    timestamp: trade.timestamp,
                });
            }
        }
    }

    log::warn!("pionex ws feed for {symbol} ended");
}
