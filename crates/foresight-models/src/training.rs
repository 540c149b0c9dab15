//! Input checks shared by every scorer.

use foresight_traits::{ForesightError, Result};
use ndarray::{Array1, Array2};

/// Number of samples in each class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassCounts {
    /// Class 0 samples.
    pub negative: usize,
    /// Class 1 samples.
    pub positive: usize,
}

impl ClassCounts {
    /// Counts the classes in a label vector.
    #[must_use]
    pub fn of(labels: &Array1<u8>) -> Self {
        let positive = labels.iter().filter(|&&y| y == 1).count();
        Self {
            negative: labels.len() - positive,
            positive,
        }
    }

    /// Size of the smaller class.
    #[must_use]
    pub fn minority(&self) -> usize {
        self.negative.min(self.positive)
    }

    /// Fraction of class 1.
    #[must_use]
    pub fn prior(&self) -> f64 {
        let total = self.negative + self.positive;
        if total == 0 {
            0.0
        } else {
            self.positive as f64 / total as f64
        }
    }
}

/// Validates a training set and returns its class counts.
///
/// # Errors
///
/// - [`ForesightError::InvalidData`] if row counts differ, a label is not 0/1
///   or a feature is not finite
/// - [`ForesightError::DegenerateTrainingSet`] if the set is empty or holds a
///   single class
pub fn check_training_set(features: &Array2<f64>, labels: &Array1<u8>) -> Result<ClassCounts> {
    if features.nrows() != labels.len() {
        return Err(ForesightError::InvalidData(format!(
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        )));
    }
    if labels.iter().any(|&y| y > 1) {
        return Err(ForesightError::InvalidData(
            "labels must be 0 or 1".to_string(),
        ));
    }
    if features.iter().any(|v| !v.is_finite()) {
        return Err(ForesightError::InvalidData(
            "training features contain non-finite values".to_string(),
        ));
    }

    let counts = ClassCounts::of(labels);
    if counts.minority() == 0 {
        return Err(ForesightError::DegenerateTrainingSet(format!(
            "{} samples with {} positive",
            labels.len(),
            counts.positive
        )));
    }
    Ok(counts)
}

/// Checks that a feature matrix has the width seen during training.
///
/// # Errors
///
/// Returns [`ForesightError::SchemaMismatch`] on a width mismatch.
pub fn check_width(expected: usize, features: &Array2<f64>) -> Result<()> {
    if features.ncols() == expected {
        Ok(())
    } else {
        Err(ForesightError::SchemaMismatch {
            expected,
            found: features.ncols(),
        })
    }
}

/// Error for scoring with an unfitted model.
pub(crate) fn not_fitted(name: &str) -> ForesightError {
    ForesightError::Model(format!("{name} scorer has not been fitted"))
}

/// Logistic function, clamped to avoid overflow.
pub(crate) fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-500.0, 500.0);
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_class_counts() {
        let counts = ClassCounts::of(&array![1, 0, 0, 1, 0]);
        assert_eq!(counts.positive, 2);
        assert_eq!(counts.negative, 3);
        assert_eq!(counts.minority(), 2);
        assert!((counts.prior() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_is_degenerate() {
        let x = Array2::zeros((3, 2));
        let err = check_training_set(&x, &array![1, 1, 1]).unwrap_err();
        assert!(matches!(err, ForesightError::DegenerateTrainingSet(_)));

        let err = check_training_set(&Array2::zeros((0, 2)), &Array1::zeros(0)).unwrap_err();
        assert!(matches!(err, ForesightError::DegenerateTrainingSet(_)));
    }

    #[test]
    fn test_row_mismatch_and_bad_values() {
        let x = Array2::zeros((3, 2));
        assert!(matches!(
            check_training_set(&x, &array![1, 0]),
            Err(ForesightError::InvalidData(_))
        ));
        assert!(check_training_set(&x, &array![1, 0, 2]).is_err());

        let mut x = Array2::zeros((2, 1));
        x[[1, 0]] = f64::NAN;
        assert!(check_training_set(&x, &array![1, 0]).is_err());
    }

    #[test]
    fn test_check_width() {
        let x = Array2::zeros((1, 3));
        assert!(check_width(3, &x).is_ok());
        assert!(matches!(
            check_width(13, &x),
            Err(ForesightError::SchemaMismatch {
                expected: 13,
                found: 3
            })
        ));
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
    }
}
