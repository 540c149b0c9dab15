//! Causal trend indicators over a close series.
//!
//! Every function returns a vector aligned with its input. The value at index
//! `t` depends only on inputs at indices `<= t`; positions without enough
//! history are NaN.

/// Index of the first finite value.
fn first_finite(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| v.is_finite())
}

/// Exponential moving average seeded with a simple average.
///
/// The first defined value sits `n - 1` positions after the first finite
/// input and equals the mean of those `n` inputs. Afterwards
/// `EMA_t = k * x_t + (1 - k) * EMA_{t-1}` with `k = 2 / (n + 1)`.
///
/// Leading NaNs are skipped, which lets EMAs be chained.
///
/// # Examples
///
/// ```
/// use foresight_features::indicators::ema_seeded;
///
/// let ema = ema_seeded(&[1.0, 2.0, 3.0, 4.0], 3);
/// assert!(ema[1].is_nan());
/// assert_eq!(ema[2], 2.0);
/// assert_eq!(ema[3], 3.0);
/// ```
pub fn ema_seeded(values: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let Some(start) = first_finite(values) else {
        return out;
    };
    if n == 0 || values.len() - start < n {
        return out;
    }

    let k = 2.0 / (n as f64 + 1.0);
    let seed_idx = start + n - 1;
    let mut prev = values[start..=seed_idx].iter().sum::<f64>() / n as f64;
    out[seed_idx] = prev;
    for t in (seed_idx + 1)..values.len() {
        prev = k * values[t] + (1.0 - k) * prev;
        out[t] = prev;
    }
    out
}

/// Triple exponential moving average: `3 * EMA1 - 3 * EMA2 + EMA3`.
///
/// Each inner EMA is seeded on the defined values of the previous one, so the
/// first defined value appears at `3 * (n - 1)`.
pub fn tema(values: &[f64], n: usize) -> Vec<f64> {
    let e1 = ema_seeded(values, n);
    let e2 = ema_seeded(&e1, n);
    let e3 = ema_seeded(&e2, n);
    e1.iter()
        .zip(&e2)
        .zip(&e3)
        .map(|((a, b), c)| 3.0 * a - 3.0 * b + c)
        .collect()
}

/// Ratio of a series to itself `ofs` positions earlier.
fn lagged_ratio(values: &[f64], ofs: usize) -> Vec<f64> {
    (0..values.len())
        .map(|t| {
            if t < ofs {
                return f64::NAN;
            }
            let base = values[t - ofs];
            if base == 0.0 { f64::NAN } else { values[t] / base }
        })
        .collect()
}

/// `MomEma(n, ofs)`: `EMA_t(n) / EMA_{t-ofs}(n)`.
pub fn mom_ema(closes: &[f64], n: usize, ofs: usize) -> Vec<f64> {
    lagged_ratio(&ema_seeded(closes, n), ofs)
}

/// `MomTema(n, ofs)`: `TEMA_t(n) / TEMA_{t-ofs}(n)`.
pub fn mom_tema(closes: &[f64], n: usize, ofs: usize) -> Vec<f64> {
    lagged_ratio(&tema(closes, n), ofs)
}

/// `RCTema(n)`: close divided by `TEMA_t(n)`.
pub fn rc_tema(closes: &[f64], n: usize) -> Vec<f64> {
    closes
        .iter()
        .zip(tema(closes, n))
        .map(|(c, t)| if t == 0.0 { f64::NAN } else { c / t })
        .collect()
}

/// `LogReturn(n)`: `ln(C_t / C_{t-n})`.
pub fn log_return(closes: &[f64], n: usize) -> Vec<f64> {
    lagged_ratio(closes, n)
        .into_iter()
        .map(|r| if r > 0.0 { r.ln() } else { f64::NAN })
        .collect()
}

/// Average and minimum of the forecast SMA path at each date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardSma {
    /// Mean of the next `n` SMA(n) values.
    pub avg: Vec<f64>,
    /// Minimum of the next `n` SMA(n) values.
    pub min: Vec<f64>,
}

/// Forward SMA metrics on a flat exponential-smoothing forecast.
///
/// At each `t` the smoothing level `l_t = alpha * C_t + (1 - alpha) * l_{t-1}`
/// (with `l` starting at `C_0`) is projected flat for `n` steps. The last
/// `n - 1` actual closes, left-padded with the earliest of them at the start
/// of the series, precede the forecast. The `n` SMA(n) values over that
/// sequence are summarised by their mean and minimum.
///
/// Only closes up to `t` are used, so the output is defined from the first
/// row.
pub fn ses_forward_sma(closes: &[f64], alpha: f64, n: usize) -> ForwardSma {
    let len = closes.len();
    let mut out = ForwardSma {
        avg: vec![f64::NAN; len],
        min: vec![f64::NAN; len],
    };
    if len == 0 || n == 0 {
        return out;
    }

    let nf = n as f64;
    let mut level = closes[0];
    let mut seed = Vec::with_capacity(n.saturating_sub(1));
    for t in 0..len {
        level = alpha * closes[t] + (1.0 - alpha) * level;

        seed.clear();
        let start = (t + 2).saturating_sub(n);
        let actual = &closes[start..=t];
        let actual = &actual[actual.len().saturating_sub(n - 1)..];
        if let Some(&first) = actual.first() {
            seed.resize(n - 1 - actual.len(), first);
        }
        seed.extend_from_slice(actual);

        // SMA_j = (sum(seed[j..]) + (j + 1) * level) / n
        let mut tail_sum: f64 = seed.iter().sum();
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        for j in 0..n {
            let sma = (tail_sum + (j as f64 + 1.0) * level) / nf;
            sum += sma;
            min = min.min(sma);
            if j < seed.len() {
                tail_sum -= seed[j];
            }
        }
        out.avg[t] = sum / nf;
        out.min[t] = min;
    }
    out
}

/// Index of the first defined value of `ema_seeded(n)` on a gap-free series.
#[must_use]
pub const fn ema_warmup(n: usize) -> usize {
    n.saturating_sub(1)
}

/// Index of the first defined value of `tema(n)` on a gap-free series.
#[must_use]
pub const fn tema_warmup(n: usize) -> usize {
    3 * n.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_ema_seed_and_recursion() {
        let closes = [2.0, 4.0, 6.0, 8.0, 10.0];
        let ema = ema_seeded(&closes, 3);
        assert!(ema[0].is_nan() && ema[1].is_nan());
        assert_relative_eq!(ema[2], 4.0);
        // k = 0.5
        assert_relative_eq!(ema[3], 6.0);
        assert_relative_eq!(ema[4], 8.0);
    }

    #[test]
    fn test_ema_too_short() {
        assert!(ema_seeded(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
        assert!(ema_seeded(&[], 3).is_empty());
    }

    #[test]
    fn test_tema_warmup_position() {
        let closes = ramp(40);
        let t = tema(&closes, 5);
        assert_eq!(t.iter().position(|v| v.is_finite()), Some(tema_warmup(5)));
    }

    #[test]
    fn test_tema_tracks_constant_series() {
        let closes = vec![50.0; 30];
        let t = tema(&closes, 4);
        for v in t.iter().filter(|v| v.is_finite()) {
            assert_relative_eq!(*v, 50.0, epsilon = 1e-12);
        }
        let rc = rc_tema(&closes, 4);
        assert_relative_eq!(rc[29], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mom_ema_offset() {
        let closes = ramp(30);
        let mom = mom_ema(&closes, 5, 3);
        assert_eq!(
            mom.iter().position(|v| v.is_finite()),
            Some(ema_warmup(5) + 3)
        );
        // an increasing series has a rising EMA
        assert!(mom[29] > 1.0);
    }

    #[test]
    fn test_log_return() {
        let closes = [100.0, 105.0, 110.0];
        let r = log_return(&closes, 2);
        assert!(r[0].is_nan() && r[1].is_nan());
        assert_relative_eq!(r[2], (1.1_f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_forward_sma_constant_series() {
        let closes = vec![20.0; 10];
        let fwd = ses_forward_sma(&closes, 0.5, 4);
        for t in 0..10 {
            assert_relative_eq!(fwd.avg[t], 20.0, epsilon = 1e-12);
            assert_relative_eq!(fwd.min[t], 20.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_forward_sma_by_hand() {
        // n = 3, alpha = 0.5 at t = 2: level = 0.5*30 + 0.5*(0.5*20 + 0.5*10) = 22.5
        // seed = [20, 30], SMAs: (20+30+22.5)/3, (30+2*22.5)/3, 22.5
        let fwd = ses_forward_sma(&[10.0, 20.0, 30.0], 0.5, 3);
        let smas = [72.5 / 3.0, 75.0 / 3.0, 22.5];
        assert_relative_eq!(fwd.avg[2], smas.iter().sum::<f64>() / 3.0, epsilon = 1e-12);
        assert_relative_eq!(fwd.min[2], 22.5, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_sma_left_pads_at_start() {
        // t = 0: level = 10, seed = [10, 10]; every SMA is 10
        let fwd = ses_forward_sma(&[10.0, 40.0], 0.5, 3);
        assert_relative_eq!(fwd.avg[0], 10.0, epsilon = 1e-12);
        // t = 1: level = 25, seed = [10, 40] -> (75/3, 90/3, 25)
        assert_relative_eq!(fwd.min[1], 25.0, epsilon = 1e-12);
        assert_relative_eq!(fwd.avg[1], (25.0 + 30.0 + 25.0) / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_indicators_are_causal() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let cut = 80;
        let full = mom_tema(&closes, 10, 5);
        let truncated = mom_tema(&closes[..cut], 10, 5);
        for t in 0..cut {
            if full[t].is_finite() {
                assert_relative_eq!(full[t], truncated[t], epsilon = 1e-12);
            }
        }
        let full = ses_forward_sma(&closes, 0.5, 30);
        let truncated = ses_forward_sma(&closes[..cut], 0.5, 30);
        assert_relative_eq!(full.avg[cut - 1], truncated.avg[cut - 1], epsilon = 1e-12);
    }
}
