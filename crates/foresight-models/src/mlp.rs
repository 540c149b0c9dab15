//! Single-hidden-layer perceptron classifier.
//!
//! The network is `input -> ReLU(hidden) -> sigmoid(1)`, trained on min-max
//! scaled features with binary cross-entropy, an L2 penalty and Adam on
//! shuffled mini-batches. Hidden width is `max(4, 4 * n_features)`.

use foresight_traits::{Result, Scorer};
use ndarray::{Array, Array1, Array2, Axis, Dimension, Zip};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
    scaler::MinMaxScaler,
    training::{check_training_set, not_fitted, sigmoid},
};

const BETA_1: f64 = 0.9;
const BETA_2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// Configuration for the MLP scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    /// Hidden units per input feature (default: 4)
    pub hidden_per_feature: usize,
    /// Smallest hidden layer (default: 4)
    pub min_hidden: usize,
    /// L2 penalty (default: 0.001)
    pub alpha: f64,
    /// Adam step size (default: 0.001)
    pub learning_rate: f64,
    /// Maximum number of epochs (default: 200)
    pub max_iter: usize,
    /// Mini-batch size, capped by the sample count (default: 200)
    pub batch_size: usize,
    /// Minimum loss improvement that resets the patience counter (default: 1e-4)
    pub tol: f64,
    /// Epochs without improvement before stopping (default: 10)
    pub n_iter_no_change: usize,
    /// Seed for weight initialisation and shuffling (default: 0)
    pub seed: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_per_feature: 4,
            min_hidden: 4,
            alpha: 0.001,
            learning_rate: 0.001,
            max_iter: 200,
            batch_size: 200,
            tol: 1e-4,
            n_iter_no_change: 10,
            seed: 0,
        }
    }
}

impl MlpConfig {
    /// Hidden layer width for a given input width.
    #[must_use]
    pub fn hidden_units(&self, n_features: usize) -> usize {
        (self.hidden_per_feature * n_features).max(self.min_hidden)
    }
}

#[derive(Debug, Clone)]
struct Params {
    w1: Array2<f64>,
    b1: Array1<f64>,
    w2: Array1<f64>,
    b2: Array1<f64>,
}

impl Params {
    /// Glorot-uniform initialisation.
    fn init(n_in: usize, n_hidden: usize, rng: &mut StdRng) -> Self {
        let bound1 = (6.0 / (n_in + n_hidden) as f64).sqrt();
        let bound2 = (6.0 / (n_hidden + 1) as f64).sqrt();
        Self {
            w1: Array2::from_shape_simple_fn((n_in, n_hidden), || {
                rng.random_range(-bound1..bound1)
            }),
            b1: Array1::from_shape_simple_fn(n_hidden, || rng.random_range(-bound1..bound1)),
            w2: Array1::from_shape_simple_fn(n_hidden, || rng.random_range(-bound2..bound2)),
            b2: Array1::from_shape_simple_fn(1, || rng.random_range(-bound2..bound2)),
        }
    }

    fn zeros_like(&self) -> Self {
        Self {
            w1: Array2::zeros(self.w1.raw_dim()),
            b1: Array1::zeros(self.b1.len()),
            w2: Array1::zeros(self.w2.len()),
            b2: Array1::zeros(1),
        }
    }

    /// Hidden pre-activations and output probabilities.
    fn forward(&self, x: &Array2<f64>) -> (Array2<f64>, Array1<f64>) {
        let z1 = x.dot(&self.w1) + &self.b1;
        let a1 = z1.mapv(|z| z.max(0.0));
        let p = (a1.dot(&self.w2) + self.b2[0]).mapv(sigmoid);
        (z1, p)
    }
}

/// Adam moment estimates, shaped like the parameters.
#[derive(Debug, Clone)]
struct Adam {
    m: Params,
    v: Params,
    t: i32,
}

fn adam_update<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    step: f64,
) {
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = BETA_1 * *m + (1.0 - BETA_1) * g;
            *v = BETA_2 * *v + (1.0 - BETA_2) * g * g;
            *p -= step * *m / (v.sqrt() + EPSILON);
        });
}

impl Adam {
    fn new(params: &Params) -> Self {
        Self {
            m: params.zeros_like(),
            v: params.zeros_like(),
            t: 0,
        }
    }

    fn step(&mut self, params: &mut Params, grads: &Params, learning_rate: f64) {
        self.t += 1;
        let step = learning_rate * (1.0 - BETA_2.powi(self.t)).sqrt() / (1.0 - BETA_1.powi(self.t));
        adam_update(&mut params.w1, &grads.w1, &mut self.m.w1, &mut self.v.w1, step);
        adam_update(&mut params.b1, &grads.b1, &mut self.m.b1, &mut self.v.b1, step);
        adam_update(&mut params.w2, &grads.w2, &mut self.m.w2, &mut self.v.w2, step);
        adam_update(&mut params.b2, &grads.b2, &mut self.m.b2, &mut self.v.b2, step);
    }
}

/// Gradients and penalised loss for one mini-batch.
fn backward(params: &Params, x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> (Params, f64) {
    let m = x.nrows() as f64;
    let (z1, p) = params.forward(x);
    let a1 = z1.mapv(|z| z.max(0.0));

    let log_loss = p
        .iter()
        .zip(y)
        .map(|(&p, &y)| {
            let p = p.clamp(1e-12, 1.0 - 1e-12);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum::<f64>()
        / m;
    let penalty = 0.5 * alpha * (params.w1.mapv(|w| w * w).sum() + params.w2.dot(&params.w2)) / m;

    let dz2 = (&p - y) / m;
    let w2 = a1.t().dot(&dz2) + &params.w2 * (alpha / m);
    let b2 = Array1::from_elem(1, dz2.sum());

    let mut dz1 = dz2
        .view()
        .insert_axis(Axis(1))
        .dot(&params.w2.view().insert_axis(Axis(0)));
    Zip::from(&mut dz1).and(&z1).for_each(|d, &z| {
        if z <= 0.0 {
            *d = 0.0;
        }
    });
    let w1 = x.t().dot(&dz1) + &params.w1 * (alpha / m);
    let b1 = dz1.sum_axis(Axis(0));

    (Params { w1, b1, w2, b2 }, log_loss + penalty)
}

#[derive(Debug, Clone)]
struct Fitted {
    scaler: MinMaxScaler,
    params: Params,
    epochs: usize,
}

/// Multi-layer perceptron scorer with one hidden ReLU layer.
#[derive(Debug, Clone, Default)]
pub struct MlpScorer {
    config: MlpConfig,
    fitted: Option<Fitted>,
}

impl MlpScorer {
    /// Create a new MLP scorer with the given configuration.
    #[must_use]
    pub const fn new(config: MlpConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &MlpConfig {
        &self.config
    }

    /// Epochs run by the last fit.
    #[must_use]
    pub fn epochs(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.epochs)
    }
}

impl Scorer for MlpScorer {
    fn name(&self) -> &str {
        "mlp"
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<u8>) -> Result<()> {
        check_training_set(features, labels)?;
        let scaler = MinMaxScaler::fit(features);
        let x = scaler.transform(features)?;
        let y = labels.mapv(f64::from);
        let n = x.nrows();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut params = Params::init(x.ncols(), self.config.hidden_units(x.ncols()), &mut rng);
        let mut adam = Adam::new(&params);
        let batch_size = self.config.batch_size.clamp(1, n);
        let mut order: Vec<usize> = (0..n).collect();

        let mut best_loss = f64::INFINITY;
        let mut stale = 0;
        let mut epochs = 0;
        for _ in 0..self.config.max_iter {
            epochs += 1;
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;
            for batch in order.chunks(batch_size) {
                let xb = x.select(Axis(0), batch);
                let yb = y.select(Axis(0), batch);
                let (grads, loss) = backward(&params, &xb, &yb, self.config.alpha);
                adam.step(&mut params, &grads, self.config.learning_rate);
                epoch_loss += loss * batch.len() as f64;
            }
            epoch_loss /= n as f64;

            if epoch_loss > best_loss - self.config.tol {
                stale += 1;
            } else {
                stale = 0;
            }
            best_loss = best_loss.min(epoch_loss);
            if stale > self.config.n_iter_no_change {
                break;
            }
        }

        self.fitted = Some(Fitted {
            scaler,
            params,
            epochs,
        });
        Ok(())
    }

    fn score(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let x = fitted.scaler.transform(features)?;
        Ok(fitted.params.forward(&x).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Class 1 when the first coordinate exceeds the second.
    fn two_blobs(n: usize) -> (Array2<f64>, Array1<u8>) {
        let mut x = Array2::zeros((n, 2));
        let mut y = Array1::zeros(n);
        let mut state: u64 = 11;
        for i in 0..n {
            for j in 0..2 {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                x[[i, j]] = (state >> 11) as f64 / (1_u64 << 53) as f64;
            }
            y[i] = u8::from(x[[i, 0]] > x[[i, 1]]);
        }
        (x, y)
    }

    #[test]
    fn test_hidden_units() {
        let config = MlpConfig::default();
        assert_eq!(config.hidden_units(13), 52);
        assert_eq!(config.hidden_units(0), 4);
    }

    #[test]
    fn test_learns_linear_boundary() {
        let (x, y) = two_blobs(400);
        let mut scorer = MlpScorer::new(MlpConfig {
            learning_rate: 0.02,
            batch_size: 32,
            ..MlpConfig::default()
        });
        scorer.fit(&x, &y).unwrap();

        let scores = scorer.score(&x).unwrap();
        let correct = scores
            .iter()
            .zip(&y)
            .filter(|&(&p, &t)| u8::from(p >= 0.5) == t)
            .count();
        assert!(correct as f64 / 400.0 > 0.85, "accuracy {correct}/400");
        assert!(scores.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let (x, y) = two_blobs(120);
        let config = MlpConfig {
            max_iter: 20,
            seed: 3,
            ..MlpConfig::default()
        };
        let mut a = MlpScorer::new(config);
        let mut b = MlpScorer::new(config);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let (sa, sb) = (a.score(&x).unwrap(), b.score(&x).unwrap());
        for (p, q) in sa.iter().zip(&sb) {
            assert_relative_eq!(*p, *q);
        }
        assert_eq!(a.epochs(), b.epochs());
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let (x, y) = two_blobs(16);
        let y = y.mapv(f64::from);
        let mut rng = StdRng::seed_from_u64(5);
        let params = Params::init(2, 8, &mut rng);
        let (grads, _) = backward(&params, &x, &y, 0.01);

        let h = 1e-6;
        let mut plus = params.clone();
        plus.w1[[1, 3]] += h;
        let mut minus = params.clone();
        minus.w1[[1, 3]] -= h;
        let numeric =
            (backward(&plus, &x, &y, 0.01).1 - backward(&minus, &x, &y, 0.01).1) / (2.0 * h);
        assert_relative_eq!(grads.w1[[1, 3]], numeric, epsilon = 1e-5);
    }

    #[test]
    fn test_rejects_degenerate_and_unfitted() {
        let mut scorer = MlpScorer::default();
        assert!(scorer.score(&Array2::zeros((1, 2))).is_err());
        assert!(
            scorer
                .fit(&Array2::zeros((5, 2)), &Array1::zeros(5))
                .is_err()
        );
    }
}
