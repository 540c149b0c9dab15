//! End-to-end research run over one price series.

use foresight_eval::{
    BacktestReport, Backtester, ConfusionCounts, EquityReport, WindowResult, simulate,
};
use foresight_features::TrendFeatures;
use foresight_traits::{ForesightError, LabeledHistory, PriceSeries, Result};
use tracing::info;

use crate::config::ResearchConfig;
use crate::dataset::prepare_history;
use crate::engine::{RunReport, WalkForwardEngine};

/// Everything a research run produces.
#[derive(Debug, Clone)]
pub struct ResearchOutput {
    /// Labeled history the run was computed on.
    pub history: LabeledHistory,
    /// Walk-forward signals and status.
    pub run: RunReport,
    /// Confusion counts over the evaluated walk-forward signals.
    pub counts: ConfusionCounts,
    /// Raw predictions of the evaluated backtest windows.
    pub windows: Vec<WindowResult>,
    /// Windowed backtest summary.
    pub backtest: BacktestReport,
    /// Gated and baseline equity curves.
    pub equity: EquityReport,
}

/// Research pipeline: features, labels, walk-forward run, backtest and equity.
#[derive(Debug, Clone, Default)]
pub struct Research {
    config: ResearchConfig,
}

impl Research {
    /// Creates a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(config: ResearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Builds the labeled history for `series`.
    ///
    /// # Errors
    ///
    /// Returns [`ForesightError::InsufficientData`] for an empty series and
    /// propagates feature builder failures.
    pub fn history(&self, series: &PriceSeries) -> Result<LabeledHistory> {
        if series.is_empty() {
            return Err(ForesightError::InsufficientData(
                "empty price series".to_string(),
            ));
        }
        let builder = TrendFeatures::new(self.config.features);
        prepare_history(series, &builder, &self.config.labels)
    }

    /// Runs the windowed backtest only.
    ///
    /// # Errors
    ///
    /// Propagates history and backtest failures.
    pub fn backtest(&self, series: &PriceSeries) -> Result<(Vec<WindowResult>, BacktestReport)> {
        let history = self.history(series)?;
        Backtester::new(self.config.backtest.clone(), &self.config.scorer).run_windows(&history)
    }

    /// Runs the whole pipeline.
    ///
    /// A run that never warms up is not an error; check
    /// [`RunReport::status`] or call [`RunReport::ensure_warm`].
    ///
    /// # Errors
    ///
    /// Returns an error for an empty series, a scorer failure or an invalid
    /// configuration.
    pub fn run(&self, series: &PriceSeries) -> Result<ResearchOutput> {
        let history = self.history(series)?;
        info!(
            rows = history.len(),
            scorer = self.config.scorer.as_str(),
            "starting research run"
        );

        let engine = WalkForwardEngine::new(self.config.engine.clone(), &self.config.scorer)?;
        let run = engine.run(&history)?;
        let counts = ConfusionCounts::from_signals(&run.log);

        let (windows, backtest) =
            Backtester::new(self.config.backtest.clone(), &self.config.scorer)
                .run_windows(&history)?;
        let equity = simulate(&run.log, &self.config.equity)?;

        info!(
            status = ?run.status,
            signals = run.log.len(),
            precision = counts.precision(),
            recall = counts.recall(),
            equity_difference = equity.comparison.difference,
            "research run finished"
        );
        Ok(ResearchOutput {
            history,
            run,
            counts,
            windows,
            backtest,
            equity,
        })
    }
}
