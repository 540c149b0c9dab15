//! L2-regularised logistic regression.

use foresight_traits::{Result, Scorer};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::{
    scaler::MinMaxScaler,
    training::{check_training_set, not_fitted, sigmoid},
};

/// Configuration for the logistic scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    /// Gradient descent step size (default: 0.5)
    pub learning_rate: f64,
    /// L2 penalty on the weights (default: 0.001)
    pub l2: f64,
    /// Full-batch iterations (default: 500)
    pub max_iter: usize,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            l2: 0.001,
            max_iter: 500,
        }
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    scaler: MinMaxScaler,
    weights: Array1<f64>,
    bias: f64,
}

/// Logistic regression on min-max scaled features, fitted by full-batch
/// gradient descent.
#[derive(Debug, Clone, Default)]
pub struct LogisticScorer {
    config: LogisticConfig,
    fitted: Option<Fitted>,
}

impl LogisticScorer {
    /// Create a new logistic scorer with the given configuration.
    #[must_use]
    pub const fn new(config: LogisticConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Learned weights, if fitted.
    #[must_use]
    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|f| &f.weights)
    }
}

impl Scorer for LogisticScorer {
    fn name(&self) -> &str {
        "logistic"
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<u8>) -> Result<()> {
        check_training_set(features, labels)?;
        let scaler = MinMaxScaler::fit(features);
        let x = scaler.transform(features)?;
        let y = labels.mapv(f64::from);
        let n = x.nrows() as f64;

        let mut weights = Array1::zeros(x.ncols());
        let mut bias = 0.0;
        for _ in 0..self.config.max_iter {
            let p = (x.dot(&weights) + bias).mapv(sigmoid);
            let err = &p - &y;
            let grad_w = x.t().dot(&err) / n + &weights * self.config.l2;
            let grad_b = err.sum() / n;
            weights = weights - grad_w * self.config.learning_rate;
            bias -= grad_b * self.config.learning_rate;
        }

        self.fitted = Some(Fitted {
            scaler,
            weights,
            bias,
        });
        Ok(())
    }

    fn score(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let x = fitted.scaler.transform(features)?;
        Ok((x.dot(&fitted.weights) + fitted.bias).mapv(sigmoid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_data() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [7.0], [8.0], [9.0], [10.0]];
        let y = array![0, 0, 0, 0, 1, 1, 1, 1];
        let mut scorer = LogisticScorer::default();
        scorer.fit(&x, &y).unwrap();

        let scores = scorer.score(&array![[0.5], [9.5]]).unwrap();
        assert!(scores[0] < 0.5);
        assert!(scores[1] > 0.5);
        assert!(scorer.weights().unwrap()[0] > 0.0);
    }

    #[test]
    fn test_single_class_rejected() {
        let mut scorer = LogisticScorer::default();
        assert!(scorer.fit(&array![[0.0], [1.0]], &array![1, 1]).is_err());
        assert!(scorer.score(&array![[0.0]]).is_err());
    }
}
