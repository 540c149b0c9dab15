//! Evaluation tools for Foresight signals.
//!
//! This crate provides:
//! - [`threshold`]: decision threshold selection under class imbalance
//! - [`metrics`]: confusion counts with precision, recall and F1 of class 1
//! - [`backtest`]: a windowed batch backtest with one model per window
//! - [`equity`]: signal-gated dollar-cost averaging against an always-buy baseline
//!
//! # Example
//!
//! ```rust,ignore
//! use foresight_eval::{Backtester, BacktestConfig, ConfusionCounts, EquityConfig};
//!
//! let counts = ConfusionCounts::from_signals(&log);
//! println!("precision {:.3} recall {:.3}", counts.precision(), counts.recall());
//!
//! let (_, report) = Backtester::new(BacktestConfig::default(), &factory).run_windows(&history)?;
//! let equity = foresight_eval::simulate(&log, &EquityConfig::default())?;
//! ```

pub mod backtest;
pub mod equity;
pub mod metrics;
pub mod threshold;

// Re-export main types
pub use backtest::{
    BacktestConfig, BacktestReport, Backtester, SkipReason, SkippedWindow, Window, WindowReport,
    WindowResult, evaluation_windows,
};
pub use equity::{
    EquityComparison, EquityConfig, EquityPoint, EquityReport, simulate, simulate_baseline,
    simulate_strategy,
};
pub use metrics::ConfusionCounts;
pub use threshold::{
    DEFAULT_THRESHOLD, SelectionBasis, ThresholdChoice, ThresholdPolicy, choose_threshold,
    select_threshold, threshold_grid,
};
