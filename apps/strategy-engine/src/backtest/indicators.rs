//! Technical indicators over intraday closes.

use super::math::{rolling_mean, rolling_population_std};

/// Relative strength index using Wilder-style exponential smoothing.
///
/// Gains and losses are smoothed with `alpha = 1 / period` using
/// bias-corrected weights, so every observation since the start of the
/// series contributes. The value is undefined until `period` price changes
/// have been observed.
#[must_use]
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < 2 {
        return out;
    }

    #[allow(clippy::cast_precision_loss)]
    let decay = 1.0 - 1.0 / period as f64;
    let mut gain_num = 0.0;
    let mut loss_num = 0.0;
    let mut weight = 0.0;
    let mut observed = 0usize;

    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        if !change.is_finite() {
            continue;
        }
        gain_num = change.max(0.0) + decay * gain_num;
        loss_num = (-change).max(0.0) + decay * loss_num;
        weight = 1.0 + decay * weight;
        observed += 1;

        if observed >= period {
            let gain = gain_num / weight;
            let loss = loss_num / weight;
            let total = gain + loss;
            out[i] = if total > 0.0 {
                Some(100.0 * gain / total)
            } else {
                None
            };
        }
    }
    out
}

/// Bollinger bands around a simple moving average.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BollingerBands {
    /// Middle band (simple moving average).
    pub middle: Vec<Option<f64>>,
    /// Upper band.
    pub upper: Vec<Option<f64>>,
    /// Lower band.
    pub lower: Vec<Option<f64>>,
}

/// Bands at `num_std` population standard deviations from the mean.
#[must_use]
pub fn bollinger_bands(closes: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let values: Vec<Option<f64>> = closes
        .iter()
        .map(|c| Some(*c).filter(|v| v.is_finite()))
        .collect();
    let middle = rolling_mean(&values, period);
    let std = rolling_population_std(&values, period);

    let (upper, lower) = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + num_std * s), Some(m - num_std * s)),
            _ => (None, None),
        })
        .unzip();

    BollingerBands {
        middle,
        upper,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rsi_warmup() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
        let values = rsi(&closes, 20);

        assert!(values[..20].iter().all(Option::is_none));
        assert!(values[20].is_some());
    }

    #[test]
    fn test_rsi_monotonic_series() {
        let rising: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let falling: Vec<f64> = (0..40).map(|i| 100.0 - i as f64 * 0.5).collect();

        assert!(approx(rsi(&rising, 20)[39].unwrap(), 100.0));
        assert!(approx(rsi(&falling, 20)[39].unwrap(), 0.0));
    }

    #[test]
    fn test_rsi_flat_series_is_undefined() {
        let flat = vec![50.0; 30];
        assert!(rsi(&flat, 20).iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_matches_hand_computation() {
        // period 2: alpha 0.5, changes +1, -1, +2
        let closes = [10.0, 11.0, 10.0, 12.0];
        let values = rsi(&closes, 2);

        // After two changes: gain = (0 + 0.5*1) / 1.5, loss = 1 / 1.5
        assert!(approx(values[2].unwrap(), 100.0 * 0.5 / 1.5));
        // After three: gain = (2 + 0.25) / 1.75, loss = 0.5 / 1.75
        assert!(approx(values[3].unwrap(), 100.0 * 2.25 / 2.75));
    }

    #[test]
    fn test_bollinger_bands() {
        let closes = [1.0, 2.0, 3.0, 4.0];
        let bands = bollinger_bands(&closes, 2, 2.0);

        assert_eq!(bands.middle[0], None);
        assert!(approx(bands.middle[1].unwrap(), 1.5));
        // population std of {1, 2} is 0.5
        assert!(approx(bands.upper[1].unwrap(), 2.5));
        assert!(approx(bands.lower[3].unwrap(), 2.5));
    }
}
