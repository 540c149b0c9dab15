//! Capability traits for the pipeline's external collaborators.
//!
//! The walk-forward engine never depends on a concrete classifier, feature set
//! or label rule. It only sees these traits:
//!
//! - [`Scorer`]: a trainable binary classifier returning the probability of class 1
//! - [`ScorerFactory`]: builds fresh, untrained scorers for each training event
//! - [`FeatureBuilder`]: maps a price series to causal feature rows
//! - [`Labeler`]: maps a price series to forward-looking labels

use std::fmt;

use ndarray::{Array1, Array2};

use crate::{FeatureRow, FeatureSchema, Label, PriceSeries, Result};

/// A trainable binary classifier.
///
/// Implementations must be deterministic for identical inputs and must be
/// `Send + Sync` so that ensembles can fit members in parallel.
///
/// # Example
///
/// ```
/// use foresight_traits::{Result, Scorer};
/// use ndarray::{Array1, Array2};
///
/// #[derive(Debug, Default)]
/// struct Constant(f64);
///
/// impl Scorer for Constant {
///     fn name(&self) -> &str {
///         "constant"
///     }
///
///     fn fit(&mut self, _features: &Array2<f64>, labels: &Array1<u8>) -> Result<()> {
///         self.0 = labels.iter().map(|&y| f64::from(y)).sum::<f64>() / labels.len() as f64;
///         Ok(())
///     }
///
///     fn score(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
///         Ok(Array1::from_elem(features.nrows(), self.0))
///     }
/// }
/// ```
pub trait Scorer: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Trains the scorer on a feature matrix and 0/1 labels.
    ///
    /// # Errors
    ///
    /// Implementations return an error for empty or single-class training
    /// sets, for mismatched row counts, and for feature widths that differ
    /// from a previous fit.
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<u8>) -> Result<()>;

    /// Returns the probability of class 1 for every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the scorer has not been fitted or the feature width
    /// differs from the training data.
    fn score(&self, features: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Builds untrained scorers.
///
/// Every training event starts from a fresh scorer, so a failed fit never
/// disturbs the model that is currently deployed.
pub trait ScorerFactory: Send + Sync {
    /// Creates a new untrained scorer.
    fn build(&self) -> Box<dyn Scorer>;
}

impl<F> ScorerFactory for F
where
    F: Fn() -> Box<dyn Scorer> + Send + Sync,
{
    fn build(&self) -> Box<dyn Scorer> {
        self()
    }
}

/// Maps a price series to one feature row per date.
///
/// The value in row `t` may only depend on closes at or before `t`. Rows
/// during indicator warm-up carry NaN values.
pub trait FeatureBuilder: Send + Sync {
    /// The schema every produced row follows.
    fn schema(&self) -> &FeatureSchema;

    /// Number of leading rows that cannot be complete.
    fn warmup(&self) -> usize;

    /// Computes feature rows aligned with `series`.
    ///
    /// # Errors
    ///
    /// Returns an error if the computation fails.
    fn build(&self, series: &PriceSeries) -> Result<Vec<FeatureRow>>;
}

/// Maps a price series to forward-looking labels.
pub trait Labeler: Send + Sync {
    /// Number of future trading days each label looks at.
    fn horizon(&self) -> usize;

    /// Computes one label per date; the last `horizon` entries are `None`.
    fn label(&self, series: &PriceSeries) -> Vec<Option<Label>>;
}
