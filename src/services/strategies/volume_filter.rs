// src/services/strategies/volume_filter.rs

use crate::services::market_data::ChartSeries;
use crate::services::strategies::{Signal, Strategy};

/// Price action confirmed by volume: only candles trading well above the
/// recent average volume are allowed to signal.
pub struct VolumeFilterStrategy {
    pub lookback: usize,
    pub volume_factor: f64,
}

impl Default for VolumeFilterStrategy {
    fn default() -> Self {
        Self {
            lookback: 20,
            volume_factor: 1.5,
        }
    }
}

impl Strategy for VolumeFilterStrategy {
    fn name(&self) -> &'static str {
        "VOLUME_FILTER_STRATEGY"
    }

    fn evaluate(&self, series: &ChartSeries, balance: f64) -> Signal {
        let n = series.len();
        if n < self.lookback + 1 {
            return Signal::Hold;
        }

        let window = &series.volume[n - 1 - self.lookback..n - 1];
        let avg_volume = window.iter().sum::<f64>() / window.len() as f64;
        let last_volume = series.volume[n - 1];

        // low-volume candles carry no information for this strategy
        if avg_volume <= 0.0 || last_volume < avg_volume * self.volume_factor {
            return Signal::Hold;
        }

        let last = series.close[n - 1];
        let prev = series.close[n - 2];
        if last > prev && balance > 0.0 {
            Signal::Buy
        } else if last < prev {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::strategies::series_from_closes;

    fn series_with_volume_spike(up: bool) -> ChartSeries {
        let closes: Vec<f64> = if up {
            (0..25).map(|i| 100.0 + i as f64 * 0.1).collect()
        } else {
            (0..25).map(|i| 100.0 - i as f64 * 0.1).collect()
        };
        let mut series = series_from_closes(&closes);
        *series.volume.last_mut().unwrap() = 100.0; // 10x the base volume
        series
    }

    #[test]
    fn volume_spike_with_rising_close_buys() {
        let series = series_with_volume_spike(true);
        assert_eq!(
            VolumeFilterStrategy::default().evaluate(&series, 1_000.0),
            Signal::Buy
        );
    }

    #[test]
    fn volume_spike_with_falling_close_sells() {
        let series = series_with_volume_spike(false);
        assert_eq!(
            VolumeFilterStrategy::default().evaluate(&series, 1_000.0),
            Signal::Sell
        );
    }

    #[test]
    fn quiet_volume_holds_even_in_a_trend() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes); // flat volume
        assert_eq!(
            VolumeFilterStrategy::default().evaluate(&series, 1_000.0),
            Signal::Hold
        );
    }
}
