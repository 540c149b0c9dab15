//! Windowed batch backtest.
//!
//! A cheaper sanity check than the walk-forward engine: the trailing lookback
//! period is cut into consecutive windows, and for each window a fresh scorer
//! is trained once on every labeled row dated before the window and then
//! scores every row inside it.

use chrono::Months;
use foresight_traits::{
    Date, ForesightError, LabeledHistory, LabeledRow, Result, ScorerFactory, Signal,
    feature_matrix, training_set,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ConfusionCounts;

/// Backtesting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Months covered by all windows together, ending at the latest date
    pub lookback_months: u32,
    /// Number of equal windows the lookback is split into
    pub windows: u32,
    /// Windows with fewer training rows are skipped
    pub min_train_rows: usize,
    /// Probability cutoff for a positive prediction
    pub decision_threshold: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            lookback_months: 12,
            windows: 6,
            min_train_rows: 500,
            decision_threshold: 0.5,
        }
    }
}

impl BacktestConfig {
    /// Checks the window layout and threshold.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the lookback cannot be split into
    /// whole-month windows or the threshold is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.windows == 0 || self.lookback_months == 0 {
            return Err(ForesightError::Configuration(
                "backtest needs at least one window and one month".to_string(),
            ));
        }
        if self.lookback_months % self.windows != 0 {
            return Err(ForesightError::Configuration(format!(
                "{} months cannot be split into {} equal windows",
                self.lookback_months, self.windows
            )));
        }
        if !(0.0..=1.0).contains(&self.decision_threshold) {
            return Err(ForesightError::Configuration(format!(
                "decision_threshold must be in [0, 1], got {}",
                self.decision_threshold
            )));
        }
        Ok(())
    }
}

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// First date inside the window.
    pub start: Date,
    /// First date after the window.
    pub end: Date,
}

impl Window {
    /// Whether `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }
}

/// Consecutive windows covering `lookback_months` up to `latest`.
///
/// # Errors
///
/// Returns a configuration error for an invalid layout.
pub fn evaluation_windows(latest: Date, config: &BacktestConfig) -> Result<Vec<Window>> {
    config.validate()?;
    let step = Months::new(config.lookback_months / config.windows);
    let out_of_range =
        || ForesightError::InvalidData(format!("date arithmetic overflow near {latest}"));

    let mut start = latest
        .checked_sub_months(Months::new(config.lookback_months))
        .ok_or_else(out_of_range)?;
    let mut windows = Vec::with_capacity(config.windows as usize);
    for _ in 0..config.windows {
        let end = start.checked_add_months(step).ok_or_else(out_of_range)?;
        windows.push(Window { start, end });
        start = end;
    }
    Ok(windows)
}

/// Why a window produced no predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer labeled rows before the window than required.
    TooFewTrainingRows {
        /// Rows available.
        found: usize,
    },
    /// No row with features inside the window.
    EmptyWindow,
    /// The training rows hold a single class.
    DegenerateTrainingSet,
}

/// Raw predictions for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    /// The evaluated window.
    pub window: Window,
    /// Date of the last training row.
    pub trained_through: Date,
    /// Number of training rows.
    pub train_rows: usize,
    /// One signal per row inside the window.
    pub signals: Vec<Signal>,
}

impl WindowResult {
    /// Confusion counts over the signals with a known label.
    #[must_use]
    pub fn counts(&self) -> ConfusionCounts {
        let mut counts = ConfusionCounts::default();
        for signal in &self.signals {
            counts.record(signal.outcome);
        }
        counts
    }
}

/// Summary row for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    /// Window start.
    pub window_start: Date,
    /// Window end (exclusive).
    pub window_end: Date,
    /// Confusion counts over evaluated rows.
    #[serde(flatten)]
    pub counts: ConfusionCounts,
    /// Precision of class 1.
    pub precision: f64,
    /// Recall of class 1.
    pub recall: f64,
    /// F1 of class 1.
    pub f1: f64,
    /// Rows scored.
    pub n: usize,
    /// Rows with a known label.
    pub evaluated: usize,
}

impl WindowReport {
    fn from_result(result: &WindowResult) -> Self {
        let counts = result.counts();
        Self {
            window_start: result.window.start,
            window_end: result.window.end,
            counts,
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            n: result.signals.len(),
            evaluated: counts.total(),
        }
    }
}

/// A window that was not evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedWindow {
    /// The window.
    pub window: Window,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Aggregated backtest report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// One entry per evaluated window, in date order.
    pub windows: Vec<WindowReport>,
    /// Windows that were skipped.
    pub skipped: Vec<SkippedWindow>,
    /// Counts pooled over all evaluated windows.
    pub pooled: ConfusionCounts,
}

impl BacktestReport {
    /// Precision of class 1 over all windows.
    #[must_use]
    pub fn precision(&self) -> f64 {
        self.pooled.precision()
    }

    /// Recall of class 1 over all windows.
    #[must_use]
    pub fn recall(&self) -> f64 {
        self.pooled.recall()
    }

    /// F1 of class 1 over all windows.
    #[must_use]
    pub fn f1(&self) -> f64 {
        self.pooled.f1()
    }
}

enum WindowOutcome {
    Evaluated(WindowResult),
    Skipped(SkippedWindow),
}

/// Runs the windowed backtest with scorers from a factory.
pub struct Backtester<'a> {
    config: BacktestConfig,
    factory: &'a dyn ScorerFactory,
}

impl std::fmt::Debug for Backtester<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtester")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> Backtester<'a> {
    /// Create a backtester.
    #[must_use]
    pub const fn new(config: BacktestConfig, factory: &'a dyn ScorerFactory) -> Self {
        Self { config, factory }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Evaluates every window and aggregates the results.
    ///
    /// Windows are independent and run in parallel; each one builds its own
    /// scorer. Results are returned in window order.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration, an empty history, or a
    /// scorer failure other than a single-class training set.
    pub fn run_windows(
        &self,
        history: &LabeledHistory,
    ) -> Result<(Vec<WindowResult>, BacktestReport)> {
        let latest = history
            .rows()
            .last()
            .map(|r| r.date)
            .ok_or_else(|| ForesightError::InsufficientData("empty history".to_string()))?;
        let windows = evaluation_windows(latest, &self.config)?;

        let outcomes = windows
            .par_iter()
            .map(|window| self.run_window(history, *window))
            .collect::<Result<Vec<_>>>()?;

        let mut results = Vec::new();
        let mut report = BacktestReport {
            windows: Vec::new(),
            skipped: Vec::new(),
            pooled: ConfusionCounts::default(),
        };
        for outcome in outcomes {
            match outcome {
                WindowOutcome::Evaluated(result) => {
                    let row = WindowReport::from_result(&result);
                    report.pooled += row.counts;
                    report.windows.push(row);
                    results.push(result);
                }
                WindowOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }

        info!(
            evaluated = report.windows.len(),
            skipped = report.skipped.len(),
            precision = report.precision(),
            recall = report.recall(),
            "backtest finished"
        );
        Ok((results, report))
    }

    fn run_window(&self, history: &LabeledHistory, window: Window) -> Result<WindowOutcome> {
        let rows = history.rows();
        let before = rows.partition_point(|r| r.date < window.start);
        let after = rows.partition_point(|r| r.date < window.end);

        let train_rows: Vec<&LabeledRow> = rows[..before]
            .iter()
            .filter(|r| r.is_trainable())
            .collect();
        let test_rows: Vec<&LabeledRow> = rows[before..after]
            .iter()
            .filter(|r| r.has_features())
            .collect();

        let skip = |reason: SkipReason| -> Result<WindowOutcome> {
            warn!(start = %window.start, end = %window.end, ?reason, "skipping backtest window");
            Ok(WindowOutcome::Skipped(SkippedWindow { window, reason }))
        };
        if train_rows.len() < self.config.min_train_rows {
            return skip(SkipReason::TooFewTrainingRows {
                found: train_rows.len(),
            });
        }
        let Some(trained_through) = train_rows.last().map(|r| r.date) else {
            return skip(SkipReason::TooFewTrainingRows { found: 0 });
        };
        if test_rows.is_empty() {
            return skip(SkipReason::EmptyWindow);
        }

        let width = history.schema().len();
        let (x_train, y_train) = training_set(train_rows.iter().copied(), width)?;
        let mut scorer = self.factory.build();
        match scorer.fit(&x_train, &y_train) {
            Ok(()) => {}
            Err(ForesightError::DegenerateTrainingSet(_)) => {
                return skip(SkipReason::DegenerateTrainingSet);
            }
            Err(e) => return Err(e),
        }

        let x_test = feature_matrix(test_rows.iter().copied(), width)?;
        let probabilities = scorer.score(&x_test)?;
        let signals = test_rows
            .iter()
            .zip(probabilities.iter())
            .map(|(row, &p)| {
                Signal::from_score(
                    row.date,
                    row.close,
                    p,
                    self.config.decision_threshold,
                    row.label,
                    trained_through,
                )
            })
            .collect();

        Ok(WindowOutcome::Evaluated(WindowResult {
            window,
            trained_through,
            train_rows: train_rows.len(),
            signals,
        }))
    }
}
