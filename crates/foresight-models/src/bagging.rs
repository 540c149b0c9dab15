//! Balanced bagging ensemble of MLP scorers.
//!
//! Each member sees a bootstrap sample that draws, with replacement, as many
//! rows from every class as the minority class has. Members are fitted in
//! parallel; their probabilities are averaged in member order, so the result
//! does not depend on thread scheduling.

use foresight_traits::{ForesightError, Result, Scorer};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    mlp::{MlpConfig, MlpScorer},
    training::{check_training_set, not_fitted},
};

/// Configuration for the bagged MLP scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaggingConfig {
    /// Number of ensemble members (default: 9)
    pub n_estimators: usize,
    /// Base seed; member `i` uses `seed + i` (default: 0)
    pub seed: u64,
    /// Configuration shared by the members
    pub member: MlpConfig,
}

impl Default for BaggingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 9,
            seed: 0,
            member: MlpConfig::default(),
        }
    }
}

/// Draws a class-balanced bootstrap sample of row indices.
fn balanced_bootstrap(negatives: &[usize], positives: &[usize], rng: &mut StdRng) -> Vec<usize> {
    let per_class = negatives.len().min(positives.len());
    let mut rows = Vec::with_capacity(2 * per_class);
    for class in [negatives, positives] {
        for _ in 0..per_class {
            rows.push(class[rng.random_range(0..class.len())]);
        }
    }
    rows
}

/// Balanced bagging over [`MlpScorer`] members.
#[derive(Debug, Clone, Default)]
pub struct BaggedScorer {
    config: BaggingConfig,
    members: Vec<MlpScorer>,
}

impl BaggedScorer {
    /// Create a new bagged scorer with the given configuration.
    #[must_use]
    pub const fn new(config: BaggingConfig) -> Self {
        Self {
            config,
            members: Vec::new(),
        }
    }

    /// Number of fitted members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no member has been fitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Scorer for BaggedScorer {
    fn name(&self) -> &str {
        "bagged_mlp"
    }

    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<u8>) -> Result<()> {
        let counts = check_training_set(features, labels)?;
        if self.config.n_estimators == 0 {
            return Err(ForesightError::Configuration(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let (positives, negatives): (Vec<usize>, Vec<usize>) =
            (0..labels.len()).partition(|&i| labels[i] == 1);

        let members = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|i| -> Result<MlpScorer> {
                let seed = self.config.seed.wrapping_add(i as u64);
                let mut rng = StdRng::seed_from_u64(seed);
                let rows = balanced_bootstrap(&negatives, &positives, &mut rng);
                let mut member = MlpScorer::new(MlpConfig {
                    seed,
                    ..self.config.member
                });
                member.fit(
                    &features.select(Axis(0), &rows),
                    &labels.select(Axis(0), &rows),
                )?;
                Ok(member)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            members = members.len(),
            per_class = counts.minority(),
            "fitted balanced bagging ensemble"
        );
        self.members = members;
        Ok(())
    }

    fn score(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        if self.members.is_empty() {
            return Err(not_fitted(self.name()));
        }
        let scores = self
            .members
            .par_iter()
            .map(|m| m.score(features))
            .collect::<Result<Vec<_>>>()?;

        let mut mean = Array1::zeros(features.nrows());
        for s in &scores {
            mean += s;
        }
        Ok(mean / scores.len() as f64)
    }
}
