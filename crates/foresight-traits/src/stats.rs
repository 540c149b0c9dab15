//! Statistical utility functions shared by feature and label computations.

/// Arithmetic mean of the finite values, or `None` if there are none.
pub fn mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.is_empty() {
        None
    } else {
        Some(finite.iter().sum::<f64>() / finite.len() as f64)
    }
}

/// Sample standard deviation (N-1 denominator) of the finite values.
///
/// Returns `None` with fewer than two finite values.
///
/// # Examples
///
/// ```
/// use foresight_traits::stats::sample_std;
///
/// let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((std - 2.138_089_935).abs() < 1e-9);
/// ```
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return None;
    }
    let mean = mean(&finite)?;
    // Bessel's correction
    let variance = finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// One-step log returns; the first element is NaN.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; prices.len()];
    for i in 1..prices.len() {
        let (prev, cur) = (prices[i - 1], prices[i]);
        if prev > 0.0 && cur > 0.0 {
            out[i] = (cur / prev).ln();
        }
    }
    out
}

/// Rolling sample standard deviation over a trailing window.
///
/// The value at `t` uses `values[t + 1 - window..=t]` and is NaN until the
/// window is full or whenever the window holds a non-finite value.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window < 2 {
        return out;
    }
    for t in (window - 1)..values.len() {
        let slice = &values[t + 1 - window..=t];
        if slice.iter().all(|v| v.is_finite()) {
            if let Some(std) = sample_std(slice) {
                out[t] = std;
            }
        }
    }
    out
}
