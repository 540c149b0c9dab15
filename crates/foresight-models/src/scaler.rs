//! Min-max feature scaling.

use foresight_traits::Result;
use ndarray::{Array1, Array2, Axis};

use crate::training::check_width;

/// Scales each column to `[0, 1]` using the training minimum and range.
///
/// Constant columns map to 0. Values outside the training range are not
/// clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    range: Array1<f64>,
}

impl MinMaxScaler {
    /// Fits the scaler on a training matrix.
    #[must_use]
    pub fn fit(features: &Array2<f64>) -> Self {
        let ncols = features.ncols();
        let mut min = Array1::from_elem(ncols, f64::INFINITY);
        let mut max = Array1::from_elem(ncols, f64::NEG_INFINITY);
        for row in features.axis_iter(Axis(0)) {
            for (j, &v) in row.iter().enumerate() {
                min[j] = min[j].min(v);
                max[j] = max[j].max(v);
            }
        }
        if features.nrows() == 0 {
            min.fill(0.0);
            max.fill(0.0);
        }
        let range = &max - &min;
        Self { min, range }
    }

    /// Number of columns the scaler was fitted on.
    #[must_use]
    pub fn width(&self) -> usize {
        self.min.len()
    }

    /// Scales a matrix with the fitted statistics.
    ///
    /// # Errors
    ///
    /// Returns a schema mismatch if the width differs from the fitted data.
    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        check_width(self.width(), features)?;
        let mut out = features.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            for (j, v) in row.iter_mut().enumerate() {
                *v = if self.range[j] > 0.0 {
                    (*v - self.min[j]) / self.range[j]
                } else {
                    0.0
                };
            }
        }
        Ok(out)
    }
}
