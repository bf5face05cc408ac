//! Statistical helpers over series with undefined entries.
//!
//! Rolling statistics follow the "complete window" rule: a value is defined
//! only when every observation in its trailing window is defined.

/// Calculate mean of a slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n - 1 denominator).
///
/// A window of identical values has exactly zero variance.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if is_constant(values) {
        return Some(0.0);
    }

    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Population variance (n denominator).
pub fn population_variance(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    if is_constant(values) {
        return Some(0.0);
    }

    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    Some(sum_sq / values.len() as f64)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Apply `stat` over each complete trailing window.
///
/// Output is index-aligned with `values`. Positions before the first full
/// window, and windows containing an undefined entry, yield `None`.
pub fn rolling<F>(values: &[Option<f64>], window: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut buffer = Vec::with_capacity(window);
    for end in window..=values.len() {
        buffer.clear();
        buffer.extend(values[end - window..end].iter().map_while(|v| *v));
        if buffer.len() == window {
            out[end - 1] = stat(&buffer);
        }
    }
    out
}

/// Rolling sample variance.
pub fn rolling_sample_variance(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, sample_variance)
}

/// Rolling sample standard deviation.
pub fn rolling_sample_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| sample_variance(w).map(f64::sqrt))
}

/// Rolling mean.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, mean)
}

/// Rolling population standard deviation.
pub fn rolling_population_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| population_variance(w).map(f64::sqrt))
}

/// Replace infinities with `None`.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_variance() {
        let var = sample_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((var - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(sample_variance(&[1.0]), None);
    }

    #[test]
    fn test_population_variance() {
        let var = population_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((var - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_window_is_exactly_zero() {
        let values = vec![0.013_7; 180];
        assert_eq!(sample_variance(&values), Some(0.0));
        assert_eq!(population_variance(&values), Some(0.0));
    }

    #[test]
    fn test_rolling_requires_complete_window() {
        let values = vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let out = rolling_mean(&values, 3);

        assert_eq!(out.len(), 5);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], None); // window contains the undefined first value
        assert_eq!(out[3], Some(2.0));
        assert_eq!(out[4], Some(3.0));
    }

    #[test]
    fn test_rolling_gap_poisons_only_overlapping_windows() {
        let values = vec![Some(1.0), Some(1.0), None, Some(1.0), Some(1.0), Some(1.0)];
        let out = rolling_sample_std(&values, 2);

        assert_eq!(out[1], Some(0.0));
        assert_eq!(out[2], None);
        assert_eq!(out[3], None);
        assert_eq!(out[4], Some(0.0));
    }

    #[test]
    fn test_rolling_shorter_than_window() {
        let values = vec![Some(1.0), Some(2.0)];
        assert!(rolling_sample_variance(&values, 5).iter().all(Option::is_none));
        assert!(rolling_sample_variance(&values, 0).iter().all(Option::is_none));
    }

    #[test]
    fn test_finite() {
        assert_eq!(finite(Some(f64::INFINITY)), None);
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(Some(1.5)), Some(1.5));
    }
}
