#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/foresight-research/foresight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core data model and capability traits for the Foresight research pipeline.
//!
//! This crate provides the foundational abstractions shared by the feature,
//! model, evaluation and engine crates: the price and feature containers, the
//! signal log, and the traits at which concrete implementations plug in.

/// The version of the foresight-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod matrix;
pub mod scorer;
pub mod signal;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{ForesightError, Result};
pub use matrix::{feature_matrix, training_set};
pub use scorer::{FeatureBuilder, Labeler, Scorer, ScorerFactory};
pub use signal::{Action, OutcomeTag, Signal, SignalLog};
pub use types::{
    Date, FeatureRow, FeatureSchema, Label, LabeledHistory, LabeledRow, PricePoint, PriceSeries,
};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch, for polars date columns.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_epoch_offset() {
        let epoch = chrono::NaiveDate::from_num_days_from_ce_opt(CE_TO_UNIX_EPOCH_DAYS).unwrap();
        assert_eq!(epoch, chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    }
}
