// src/services/strategies/mod.rs
//
// One `Strategy` capability with five fixed implementations, selected by
// `StrategyKind` lookup. Strategies are pure: candle series plus the
// available balance in, discrete signal out. Fetching and persistence
// stay in the manager.

pub mod advanced;
pub mod dca;
pub mod grid;
pub mod manager;
pub mod rsi;
pub mod volume_filter;

use serde::{Deserialize, Serialize};

use crate::services::market_data::ChartSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "HOLD")]
    Hold,
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Evaluate the series and the available funding balance into a
    /// signal. Must hold on insufficient data, never panic.
    fn evaluate(&self, series: &ChartSeries, balance: f64) -> Signal;
}

/// The five strategies the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Rsi,
    VolumeFilter,
    Advanced,
    GridTrading,
    Dca,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Rsi,
        StrategyKind::VolumeFilter,
        StrategyKind::Advanced,
        StrategyKind::GridTrading,
        StrategyKind::Dca,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Rsi => "RSI_STRATEGY",
            StrategyKind::VolumeFilter => "VOLUME_FILTER_STRATEGY",
            StrategyKind::Advanced => "ADVANCED_STRATEGY",
            StrategyKind::GridTrading => "GRID_TRADING_STRATEGY",
            StrategyKind::Dca => "DCA_STRATEGY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Rsi => {
                "Uses RSI indicator for entry/exit signals. Good for trending markets."
            }
            StrategyKind::VolumeFilter => {
                "Combines volume analysis with price action. Filters out low-volume periods."
            }
            StrategyKind::Advanced => {
                "Multi-indicator approach combining RSI, MACD and Bollinger Bands."
            }
            StrategyKind::GridTrading => {
                "Places buy/sell orders at regular intervals. Good for range-bound markets."
            }
            StrategyKind::Dca => {
                "Dollar Cost Averaging approach. Buys more when price drops."
            }
        }
    }
}

/// Lookup instead of a branch chain: every caller dispatches through
/// here.
pub fn strategy_for(kind: StrategyKind) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::Rsi => Box::new(rsi::RsiStrategy::default()),
        StrategyKind::VolumeFilter => Box::new(volume_filter::VolumeFilterStrategy::default()),
        StrategyKind::Advanced => Box::new(advanced::AdvancedStrategy::default()),
        StrategyKind::GridTrading => Box::new(grid::GridTradingStrategy::default()),
        StrategyKind::Dca => Box::new(dca::DcaStrategy::default()),
    }
}

#[cfg(test)]
pub(crate) fn series_from_closes(closes: &[f64]) -> ChartSeries {
    ChartSeries {
        timestamps: (0..closes.len() as i64).collect(),
        open: closes.to_vec(),
        high: closes.iter().map(|c| c * 1.01).collect(),
        low: closes.iter().map(|c| c * 0.99).collect(),
        close: closes.to_vec(),
        volume: vec![10.0; closes.len()],
        resolved_interval: "5M".into(),
    }
}
