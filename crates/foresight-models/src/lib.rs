//! Trainable binary scorers for the Foresight walk-forward engine.
//!
//! Every scorer implements [`foresight_traits::Scorer`]: `fit` on a feature
//! matrix with 0/1 labels, `score` returning the probability of class 1.
//! [`ScorerKind`] picks one from configuration and acts as the engine's
//! [`foresight_traits::ScorerFactory`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use foresight_models::{LogisticConfig, ScorerKind};
//! use foresight_traits::ScorerFactory;
//! use ndarray::{Array1, array};
//!
//! let factory = ScorerKind::Logistic(LogisticConfig::default());
//! let mut scorer = factory.build();
//! scorer
//!     .fit(&array![[0.0], [1.0], [9.0], [10.0]], &Array1::from(vec![0, 0, 1, 1]))
//!     .unwrap();
//! let probabilities = scorer.score(&array![[9.5]]).unwrap();
//! ```

mod bagging;
mod baseline;
mod factory;
mod logistic;
mod mlp;
mod scaler;
mod training;

// Re-export main types
pub use bagging::{BaggedScorer, BaggingConfig};
pub use baseline::PriorScorer;
pub use factory::ScorerKind;
pub use logistic::{LogisticConfig, LogisticScorer};
pub use mlp::{MlpConfig, MlpScorer};
pub use scaler::MinMaxScaler;
pub use training::{ClassCounts, check_training_set, check_width};
