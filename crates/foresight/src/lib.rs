#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/foresight-research/foresight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # foresight
//!
//! Walk-forward research pipeline for daily equity index signals.
//!
//! foresight is an umbrella crate: it owns the walk-forward engine, its retrain
//! schedule, the run configuration and the end-to-end research pipeline, and
//! re-exports the sub-crates for convenience.
//!
//! ## Quick Start
//!
//! ```ignore
//! use foresight::{Research, ResearchConfig, RunStatus};
//! use foresight::fred::FredClient;
//!
//! # async fn example() -> foresight::Result<()> {
//! let client = FredClient::from_env()?;
//! let series = client.price_series("SP500", start, None).await?;
//!
//! let output = Research::new(ResearchConfig::default())?.run(&series)?;
//! if output.run.status != RunStatus::NeverWarmedUp {
//!     println!("precision {:.3}", output.counts.precision());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Data model, capability traits and errors
//! - [`features`] - Indicators, the trend feature set and label rules
//! - [`models`] - Trainable scorers
//! - [`eval`] - Threshold selection, backtest and equity simulation
//! - [`fred`] - Price data client
//!
//! ## Architecture
//!
//! 1. **Features and labels** are computed once over the whole series; every
//!    feature at a date depends only on closes up to that date.
//! 2. The **walk-forward engine** steps through dates in order, scoring each
//!    date with the model deployed before it and retraining on schedule.
//! 3. The **threshold selector** tunes the decision cutoff on the freshest
//!    training rows at every training event.
//! 4. The **backtester** and **equity simulator** evaluate the results.

/// Version information for the foresight crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod dataset;
pub mod engine;
pub mod export;
pub mod pipeline;
pub mod schedule;

pub use config::{EngineConfig, PolicyKind, ResearchConfig, ThresholdSettings};
pub use dataset::prepare_history;
pub use engine::{Retrain, RunReport, RunStatus, StepOutcome, WalkForwardEngine};
pub use export::{equity_frame, read_prices_csv, signals_frame, write_csv};
pub use pipeline::{Research, ResearchOutput};
pub use schedule::should_retrain;

// Re-export error types
pub use foresight_traits::{ForesightError, Result};

// Re-export common types
pub use foresight_traits::{
    Action, Date, LabeledHistory, LabeledRow, OutcomeTag, PriceSeries, Signal, SignalLog,
};

/// Core data model and traits.
pub mod traits {
    pub use foresight_traits::*;
}

/// Indicators, feature sets and label rules.
pub mod features {
    pub use foresight_features::*;
}

/// Trainable scorers.
pub mod models {
    pub use foresight_models::*;
}

/// Evaluation tools.
pub mod eval {
    pub use foresight_eval::*;
}

/// FRED price data client.
///
/// Requires `FRED_API_KEY` in the environment or a `.env` file.
pub mod fred {
    pub use foresight_fred::*;
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use foresight::prelude::*;
/// ```
pub mod prelude {
    pub use crate::traits::{FeatureBuilder, Labeler, Scorer, ScorerFactory};
    pub use crate::{
        EngineConfig, ForesightError, PriceSeries, Research, ResearchConfig, Result, RunStatus,
        SignalLog, WalkForwardEngine,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_re_exports() {
        fn _accept_scorer(_scorer: &dyn prelude::Scorer) {}
        fn _accept_factory(_factory: &dyn prelude::ScorerFactory) {}

        let _kind: &dyn prelude::ScorerFactory = &models::ScorerKind::Baseline;
        let _result: Result<()> = Ok(());
        let _error = ForesightError::InvalidData("test".to_string());
    }
}
