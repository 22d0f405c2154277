//! Pure indicator math over a closing-price series. Output sequences are
//! aligned to the input, shorter by the warm-up window where one exists;
//! the last element is always the "current" value.

/// Simple moving average of the final `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(values[values.len() - period..].iter().sum::<f64>() / period as f64)
}

/// Exponential moving average, seeded with the first value, aligned to
/// the input.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return vec![];
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    for &v in values {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// RSI series over `period`-sized windows of price changes. Returns one
/// value per window, i.e. `len - period` entries; fewer than `period + 1`
/// prices yield an empty series.
pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() <= period {
        return vec![];
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let mut out = Vec::with_capacity(changes.len() - period + 1);

    for window in changes.windows(period) {
        let gain: f64 = window.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
        let loss: f64 = window.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>()
            / period as f64;
        if loss == 0.0 {
            out.push(100.0);
        } else {
            let rs = gain / loss;
            out.push(100.0 - 100.0 / (1.0 + rs));
        }
    }
    out
}

/// MACD(12, 26, 9): line, signal and histogram series aligned to the
/// input.
pub fn macd(prices: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    if prices.is_empty() {
        return (vec![], vec![], vec![]);
    }
    let fast = ema(prices, 12);
    let slow = ema(prices, 26);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, 9);
    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();
    (line, signal, histogram)
}

/// Bollinger bands (20-period SMA ± `std_dev_factor`σ). One entry per
/// full window, i.e. `len - period + 1` values.
pub fn bollinger(
    prices: &[f64],
    period: usize,
    std_dev_factor: f64,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    if period == 0 || prices.len() < period {
        return (vec![], vec![], vec![]);
    }

    let mut upper = Vec::new();
    let mut middle = Vec::new();
    let mut lower = Vec::new();

    for window in prices.windows(period) {
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
        let std = var.sqrt();
        upper.push(mean + std_dev_factor * std);
        middle.push(mean);
        lower.push(mean - std_dev_factor * std);
    }
    (upper, middle, lower)
}
