//! Class-prior baseline scorer.

use foresight_traits::{Result, Scorer};
use ndarray::{Array1, Array2};

use crate::training::{check_training_set, check_width, not_fitted};

/// Scores every row with the training frequency of class 1.
///
/// Useful as a floor for the learned scorers: any threshold either buys on
/// every date or never.
#[derive(Debug, Clone, Default)]
pub struct PriorScorer {
    fitted: Option<(usize, f64)>,
}

impl PriorScorer {
    /// Create an unfitted prior scorer.
    #[must_use]
    pub const fn new() -> Self {
        Self { fitted: None }
    }
}

impl Scorer for PriorScorer {
    fn name(&self) -> &str {
        "baseline"
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<u8>) -> Result<()> {
        let counts = check_training_set(features, labels)?;
        self.fitted = Some((features.ncols(), counts.prior()));
        Ok(())
    }

    fn score(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let (width, prior) = self.fitted.ok_or_else(|| not_fitted(self.name()))?;
        check_width(width, features)?;
        Ok(Array1::from_elem(features.nrows(), prior))
    }
}
