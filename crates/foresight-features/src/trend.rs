//! The "trend" feature set.
//!
//! Thirteen causal features per date: forward SMA metrics on an exponential
//! smoothing forecast, EMA/TEMA momentum ratios, close-to-TEMA ratios and a
//! 30-day log return.

use foresight_traits::{FeatureBuilder, FeatureRow, FeatureSchema, PriceSeries, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{
    ema_warmup, log_return, mom_ema, mom_tema, rc_tema, ses_forward_sma, tema_warmup,
};

/// Name of the feature set.
pub const TREND_SCHEMA_NAME: &str = "trend";

/// Version of the feature list. Bump when columns change.
pub const TREND_SCHEMA_VERSION: u32 = 1;

/// SMA lengths used for the forward SMA metrics.
const SMA_WINDOWS: [usize; 3] = [30, 100, 150];

/// `(n, ofs)` pairs for `MomEma`.
const MOM_EMA: [(usize, usize); 3] = [(150, 15), (70, 15), (100, 15)];

/// `(n, ofs)` for `MomTema`.
const MOM_TEMA: (usize, usize) = (300, 15);

/// Lengths for `RCTema`.
const RC_TEMA: [usize; 2] = [200, 100];

/// Lag for `LogReturn`.
const LOG_RETURN: usize = 30;

/// Configuration for the trend feature set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Smoothing factor of the exponential smoothing level (default: 0.5).
    pub ses_alpha: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self { ses_alpha: 0.5 }
    }
}

/// Column names in schema order.
#[must_use]
pub fn trend_feature_names() -> Vec<String> {
    let mut names = Vec::with_capacity(13);
    for n in SMA_WINDOWS {
        names.push(format!("SMA_{n}_avg"));
        names.push(format!("SMA_{n}_min"));
    }
    for (n, ofs) in MOM_EMA {
        names.push(format!("MomEma_{n}_{ofs}"));
    }
    names.push(format!("MomTema_{}_{}", MOM_TEMA.0, MOM_TEMA.1));
    for n in RC_TEMA {
        names.push(format!("RCTema_{n}"));
    }
    names.push(format!("LogReturn_{LOG_RETURN}"));
    names
}

/// Builder for the trend feature set.
///
/// # Example
///
/// ```ignore
/// use foresight_features::TrendFeatures;
/// use foresight_traits::FeatureBuilder;
///
/// let builder = TrendFeatures::default();
/// let rows = builder.build(&series)?;
/// assert_eq!(rows[0].values.len(), builder.schema().len());
/// ```
#[derive(Debug, Clone)]
pub struct TrendFeatures {
    config: TrendConfig,
    schema: FeatureSchema,
}

impl TrendFeatures {
    /// Create a new trend feature builder with the given configuration.
    #[must_use]
    pub fn new(config: TrendConfig) -> Self {
        Self {
            config,
            schema: FeatureSchema::new(
                TREND_SCHEMA_NAME,
                TREND_SCHEMA_VERSION,
                trend_feature_names(),
            ),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Computes every feature column over `closes`.
    fn columns(&self, closes: &[f64]) -> Vec<Vec<f64>> {
        let mut columns = Vec::with_capacity(self.schema.len());
        for n in SMA_WINDOWS {
            let fwd = ses_forward_sma(closes, self.config.ses_alpha, n);
            columns.push(fwd.avg);
            columns.push(fwd.min);
        }
        for (n, ofs) in MOM_EMA {
            columns.push(mom_ema(closes, n, ofs));
        }
        columns.push(mom_tema(closes, MOM_TEMA.0, MOM_TEMA.1));
        for n in RC_TEMA {
            columns.push(rc_tema(closes, n));
        }
        columns.push(log_return(closes, LOG_RETURN));
        columns
    }
}

impl Default for TrendFeatures {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

impl FeatureBuilder for TrendFeatures {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn warmup(&self) -> usize {
        let mom_ema = MOM_EMA
            .iter()
            .map(|&(n, ofs)| ema_warmup(n) + ofs)
            .max()
            .unwrap_or(0);
        let mom_tema = tema_warmup(MOM_TEMA.0) + MOM_TEMA.1;
        let rc_tema = RC_TEMA.iter().map(|&n| tema_warmup(n)).max().unwrap_or(0);
        mom_ema.max(mom_tema).max(rc_tema).max(LOG_RETURN)
    }

    fn build(&self, series: &PriceSeries) -> Result<Vec<FeatureRow>> {
        let closes = series.closes();
        let columns = self.columns(&closes);

        let rows: Vec<FeatureRow> = series
            .points()
            .iter()
            .enumerate()
            .map(|(t, point)| FeatureRow {
                date: point.date,
                values: columns.iter().map(|col| col[t]).collect(),
            })
            .collect();

        debug!(
            rows = rows.len(),
            complete = rows.iter().filter(|r| r.is_complete()).count(),
            "built trend features"
        );
        Ok(rows)
    }
}
