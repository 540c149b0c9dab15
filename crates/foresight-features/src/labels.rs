//! Forward-looking label rules.
//!
//! A label at `t` looks at closes after `t`, so the last `horizon` dates of a
//! series can never be labeled.

use foresight_traits::{Label, Labeler, PriceSeries, stats};
use serde::{Deserialize, Serialize};

/// Configuration for the fixed band rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedBand {
    /// Trading days to look ahead (default: 70).
    pub horizon: usize,
    /// Minimum relative rise that must be reached (default: 0.10).
    pub rise: f64,
    /// Relative drop that must not be reached (default: 0.05).
    pub max_drop: f64,
}

impl Default for FixedBand {
    fn default() -> Self {
        Self {
            horizon: 70,
            rise: 0.10,
            max_drop: 0.05,
        }
    }
}

impl Labeler for FixedBand {
    fn horizon(&self) -> usize {
        self.horizon
    }

    /// Positive when the path reaches `+rise` and stays above `-max_drop`.
    fn label(&self, series: &PriceSeries) -> Vec<Option<Label>> {
        let closes = series.closes();
        let n = closes.len();
        let mut labels = vec![None; n];
        if self.horizon == 0 {
            return labels;
        }

        for t in 0..n.saturating_sub(self.horizon) {
            let p0 = closes[t];
            let (mut max_up, mut min_down) = (f64::NEG_INFINITY, f64::INFINITY);
            for &p in &closes[t + 1..=t + self.horizon] {
                let rel = (p - p0) / p0;
                max_up = max_up.max(rel);
                min_down = min_down.min(rel);
            }
            labels[t] = Some(Label::from_bool(
                max_up >= self.rise && min_down > -self.max_drop,
            ));
        }
        labels
    }
}

/// Configuration for the volatility scaled rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityScaled {
    /// Trading days to look ahead (default: 70).
    pub horizon: usize,
    /// Window of the daily log-return standard deviation (default: 252).
    pub vol_window: usize,
    /// Multiple of the horizon-scaled volatility to beat (default: 1.0).
    pub up_mult: f64,
}

impl Default for VolatilityScaled {
    fn default() -> Self {
        Self {
            horizon: 70,
            vol_window: 252,
            up_mult: 1.0,
        }
    }
}

impl Labeler for VolatilityScaled {
    fn horizon(&self) -> usize {
        self.horizon
    }

    /// Positive when `C_{t+H} / C_t - 1 > up_mult * sigma_t * sqrt(H)`.
    fn label(&self, series: &PriceSeries) -> Vec<Option<Label>> {
        let closes = series.closes();
        let n = closes.len();
        let mut labels = vec![None; n];
        if self.horizon == 0 {
            return labels;
        }

        let vol = stats::rolling_std(&stats::log_returns(&closes), self.vol_window);
        let scale = (self.horizon as f64).sqrt();
        for t in 0..n.saturating_sub(self.horizon) {
            if !vol[t].is_finite() {
                continue;
            }
            let fwd = closes[t + self.horizon] / closes[t] - 1.0;
            labels[t] = Some(Label::from_bool(fwd > self.up_mult * vol[t] * scale));
        }
        labels
    }
}

/// Label rule selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LabelRule {
    /// Reach a fixed rise without a fixed drawdown.
    FixedBand(FixedBand),
    /// Beat a multiple of trailing volatility at the horizon.
    VolatilityScaled(VolatilityScaled),
}

impl Default for LabelRule {
    fn default() -> Self {
        Self::FixedBand(FixedBand::default())
    }
}

impl Labeler for LabelRule {
    fn horizon(&self) -> usize {
        match self {
            Self::FixedBand(rule) => rule.horizon(),
            Self::VolatilityScaled(rule) => rule.horizon(),
        }
    }

    fn label(&self, series: &PriceSeries) -> Vec<Option<Label>> {
        match self {
            Self::FixedBand(rule) => rule.label(series),
            Self::VolatilityScaled(rule) => rule.label(series),
        }
    }
}
