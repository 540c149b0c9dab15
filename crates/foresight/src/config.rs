//! Run configuration.
//!
//! Every section has defaults, so an empty JSON object is a complete
//! configuration.

use std::path::Path;

use foresight_eval::{BacktestConfig, EquityConfig, ThresholdPolicy};
use foresight_features::{LabelRule, TrendConfig};
use foresight_models::ScorerKind;
use foresight_traits::{ForesightError, Labeler, Result};
use serde::{Deserialize, Serialize};

/// Objective used when tuning the decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Maximize precision subject to minimum recall and precision.
    #[default]
    PrecisionAtRecall,
    /// Maximize recall subject to minimum precision.
    RecallAtPrecision,
}

/// Threshold tuning settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    /// Which objective to optimize
    pub policy: PolicyKind,
    /// Minimum recall for `precision_at_recall`
    pub target_recall: f64,
    /// Minimum precision for `recall_at_precision`
    pub target_precision: f64,
    /// Minimum precision for `precision_at_recall`
    pub min_precision: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            policy: PolicyKind::PrecisionAtRecall,
            target_recall: 0.5,
            target_precision: 0.6,
            min_precision: 0.5,
        }
    }
}

impl ThresholdSettings {
    /// The selector policy described by these settings.
    #[must_use]
    pub const fn policy(&self) -> ThresholdPolicy {
        match self.policy {
            PolicyKind::PrecisionAtRecall => ThresholdPolicy::PrecisionAtRecall {
                target_recall: self.target_recall,
                min_precision: self.min_precision,
            },
            PolicyKind::RecallAtPrecision => ThresholdPolicy::RecallAtPrecision {
                target_precision: self.target_precision,
            },
        }
    }
}

/// Walk-forward engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trading days between retrains
    pub retrain_interval_days: usize,
    /// Most recent usable rows kept for training
    pub rolling_train_window_size: usize,
    /// Trading days until a label is resolved; rows are trainable only this
    /// many days after their date. Zero disables the delay.
    pub label_horizon_days: usize,
    /// Resolved training rows needed before the first fit
    pub min_history_rows: usize,
    /// Most recent training rows used to tune the threshold
    pub validation_tail: usize,
    /// Fixed threshold; bypasses tuning when set
    pub decision_threshold_override: Option<f64>,
    /// Threshold tuning settings
    pub threshold: ThresholdSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retrain_interval_days: 30,
            rolling_train_window_size: 3000,
            label_horizon_days: 70,
            min_history_rows: 50,
            validation_tail: 300,
            decision_threshold_override: None,
            threshold: ThresholdSettings::default(),
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ForesightError::Configuration(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

impl EngineConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ForesightError::Configuration`] for a zero interval, window
    /// or minimum history, and for probabilities outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.retrain_interval_days == 0 {
            return Err(ForesightError::Configuration(
                "retrain_interval_days must be at least 1".to_string(),
            ));
        }
        if self.rolling_train_window_size == 0 {
            return Err(ForesightError::Configuration(
                "rolling_train_window_size must be at least 1".to_string(),
            ));
        }
        if self.min_history_rows == 0 {
            return Err(ForesightError::Configuration(
                "min_history_rows must be at least 1".to_string(),
            ));
        }
        if let Some(threshold) = self.decision_threshold_override {
            check_unit("decision_threshold_override", threshold)?;
        }
        check_unit("target_recall", self.threshold.target_recall)?;
        check_unit("target_precision", self.threshold.target_precision)?;
        check_unit("min_precision", self.threshold.min_precision)?;
        Ok(())
    }
}

/// Full configuration of a research run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Walk-forward engine
    pub engine: EngineConfig,
    /// Label rule
    pub labels: LabelRule,
    /// Trend feature parameters
    pub features: TrendConfig,
    /// Scorer used by the engine and the backtester
    pub scorer: ScorerKind,
    /// Windowed backtest
    pub backtest: BacktestConfig,
    /// Equity simulation
    pub equity: EquityConfig,
}

impl ResearchConfig {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ForesightError::Configuration(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read and a configuration
    /// error if it does not parse or validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks every section.
    ///
    /// The engine must not treat a label as known before the label rule can
    /// resolve it, so `label_horizon_days` may not be shorter than the rule's
    /// horizon.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.backtest.validate()?;
        self.equity.validate()?;
        if self.engine.label_horizon_days < self.labels.horizon() {
            return Err(ForesightError::Configuration(format!(
                "label_horizon_days ({}) is shorter than the label horizon ({})",
                self.engine.label_horizon_days,
                self.labels.horizon()
            )));
        }
        Ok(())
    }
}
