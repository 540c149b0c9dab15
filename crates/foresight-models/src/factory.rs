//! Scorer selection by configuration.

use foresight_traits::{Scorer, ScorerFactory};
use serde::{Deserialize, Serialize};

use crate::{
    BaggedScorer, BaggingConfig, LogisticConfig, LogisticScorer, MlpConfig, MlpScorer,
    PriorScorer,
};

/// Which scorer the engine trains at every training event.
///
/// Serialized with a `kind` tag, e.g. `{"kind": "mlp", "max_iter": 400}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorerKind {
    /// Class-prior baseline.
    Baseline,
    /// Logistic regression.
    Logistic(LogisticConfig),
    /// Single MLP.
    Mlp(MlpConfig),
    /// Balanced bagging of MLPs.
    BaggedMlp(BaggingConfig),
}

impl Default for ScorerKind {
    fn default() -> Self {
        Self::BaggedMlp(BaggingConfig::default())
    }
}

impl ScorerKind {
    /// Short identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Logistic(_) => "logistic",
            Self::Mlp(_) => "mlp",
            Self::BaggedMlp(_) => "bagged_mlp",
        }
    }
}

impl ScorerFactory for ScorerKind {
    fn build(&self) -> Box<dyn Scorer> {
        match *self {
            Self::Baseline => Box::new(PriorScorer::new()),
            Self::Logistic(config) => Box::new(LogisticScorer::new(config)),
            Self::Mlp(config) => Box::new(MlpScorer::new(config)),
            Self::BaggedMlp(config) => Box::new(BaggedScorer::new(config)),
        }
    }
}
