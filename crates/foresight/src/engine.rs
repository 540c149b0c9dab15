//! Walk-forward engine.
//!
//! The engine walks the history one date at a time. Before the first
//! successful fit it is cold and emits nothing. Once warm, every date with
//! features is scored by the model that was already deployed before that
//! date; when a retrain is due the date is scored first and the new model only
//! takes effect from the next date.
//!
//! A row's label becomes trainable `label_horizon_days` trading days after its
//! date, which is when the label rule can first resolve it. Training never
//! sees a row dated after the current date.

use foresight_eval::{ThresholdPolicy, choose_threshold};
use foresight_traits::{
    Date, ForesightError, LabeledHistory, LabeledRow, Result, Scorer, ScorerFactory, Signal,
    SignalLog, feature_matrix, training_set,
};
use ndarray::{Axis, Slice};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::schedule::should_retrain;

/// A trained scorer together with the threshold tuned for it.
struct WarmModel {
    scorer: Box<dyn Scorer>,
    trained_on: Date,
    trained_at: usize,
    threshold: f64,
}

impl std::fmt::Debug for WarmModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarmModel")
            .field("scorer", &self.scorer.name())
            .field("trained_on", &self.trained_on)
            .field("threshold", &self.threshold)
            .finish()
    }
}

#[derive(Debug)]
enum State {
    Cold,
    Warm(WarmModel),
}

/// What happened to the retrain that was due on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retrain {
    /// No retrain was due.
    NotDue,
    /// A new model was trained and takes effect from the next date.
    Done,
    /// The training set held a single class; the previous model stays.
    Skipped,
}

/// Result of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Still cold: too few resolved training rows so far.
    InsufficientHistory,
    /// Still cold: the training set held a single class.
    WarmUpSkipped,
    /// The first model was trained; the date itself gets no signal.
    WarmedUp,
    /// Warm step.
    Warm {
        /// Whether a signal was appended.
        emitted: bool,
        /// Retrain decision for the date.
        retrain: Retrain,
    },
}

/// How far a completed run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Warmed up and every training attempt succeeded.
    FullyWarmedUp,
    /// Warmed up, but at least one warm-up or retrain was skipped for a
    /// single-class training set.
    PartiallyWarmedUp,
    /// Never accumulated enough history to train a model.
    NeverWarmedUp,
}

/// Output of a full walk-forward run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// One signal per scored date.
    pub log: SignalLog,
    /// Run status.
    pub status: RunStatus,
    /// Dates on which a model was trained, warm-up included.
    pub retrain_dates: Vec<Date>,
    /// Dates on which a due training was skipped.
    pub skipped_retrains: Vec<Date>,
}

impl RunReport {
    /// Date of the first successful training.
    #[must_use]
    pub fn warmed_up_on(&self) -> Option<Date> {
        self.retrain_dates.first().copied()
    }

    /// Fails when the run never left the cold state.
    ///
    /// # Errors
    ///
    /// Returns [`ForesightError::InsufficientData`] for a run that never
    /// warmed up.
    pub fn ensure_warm(&self) -> Result<()> {
        match self.status {
            RunStatus::NeverWarmedUp => Err(ForesightError::InsufficientData(format!(
                "no model was trained; {} training attempts were skipped",
                self.skipped_retrains.len()
            ))),
            _ => Ok(()),
        }
    }
}

/// Walk-forward training and signal generation.
///
/// Each engine owns its model state; build a fresh one per run.
pub struct WalkForwardEngine<'a> {
    config: EngineConfig,
    factory: &'a dyn ScorerFactory,
    state: State,
    last_step: Option<usize>,
    log: SignalLog,
    retrain_dates: Vec<Date>,
    skipped_retrains: Vec<Date>,
}

impl std::fmt::Debug for WalkForwardEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkForwardEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("signals", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl<'a> WalkForwardEngine<'a> {
    /// Creates a cold engine.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(config: EngineConfig, factory: &'a dyn ScorerFactory) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            factory,
            state: State::Cold,
            last_step: None,
            log: SignalLog::new(),
            retrain_dates: Vec::new(),
            skipped_retrains: Vec::new(),
        })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a model has been trained.
    #[must_use]
    pub const fn is_warm(&self) -> bool {
        matches!(self.state, State::Warm(_))
    }

    /// Threshold currently in effect, if warm.
    #[must_use]
    pub const fn threshold(&self) -> Option<f64> {
        match &self.state {
            State::Warm(model) => Some(model.threshold),
            State::Cold => None,
        }
    }

    /// Date the deployed model was trained on, if warm.
    #[must_use]
    pub const fn last_train_date(&self) -> Option<Date> {
        match &self.state {
            State::Warm(model) => Some(model.trained_on),
            State::Cold => None,
        }
    }

    /// Signals emitted so far.
    #[must_use]
    pub const fn log(&self) -> &SignalLog {
        &self.log
    }

    /// Advances the engine to `date`.
    ///
    /// Only rows dated on or before `date` are read. Dates must be stepped in
    /// increasing order, each at most once, and always against the same
    /// history.
    ///
    /// # Errors
    ///
    /// Returns [`ForesightError::InvalidData`] if `date` is not in the history
    /// or does not follow the previous step, and propagates scorer failures
    /// other than a single-class training set.
    pub fn step(&mut self, history: &LabeledHistory, date: Date) -> Result<StepOutcome> {
        let current = history.position(date).ok_or_else(|| {
            ForesightError::InvalidData(format!("{date} is not in the history"))
        })?;
        if self.last_step.is_some_and(|last| current <= last) {
            return Err(ForesightError::InvalidData(format!(
                "{date} does not follow the previous step"
            )));
        }
        self.last_step = Some(current);

        let visible = history.visible_until(date);
        let width = history.schema().len();

        let last_train = match &self.state {
            State::Cold => None,
            State::Warm(model) => Some(model.trained_at),
        };
        if last_train.is_none() {
            return self.cold_step(visible, current, width);
        }

        let due = should_retrain(current, last_train, self.config.retrain_interval_days);
        let row = &visible[current];
        let emitted = match (&self.state, &row.features) {
            (State::Warm(model), Some(_)) => {
                let signal = predict(model, row, width)?;
                debug!(
                    date = %row.date,
                    probability = signal.probability,
                    action = %signal.action(),
                    "scored"
                );
                self.log.push(signal)?;
                true
            }
            _ => {
                debug!(date = %row.date, "no features, skipping");
                false
            }
        };

        let retrain = if due {
            match self.fit(visible, current, width)? {
                Some(model) => {
                    self.state = State::Warm(model);
                    self.retrain_dates.push(date);
                    Retrain::Done
                }
                None => {
                    self.skipped_retrains.push(date);
                    Retrain::Skipped
                }
            }
        } else {
            Retrain::NotDue
        };

        Ok(StepOutcome::Warm { emitted, retrain })
    }

    fn cold_step(
        &mut self,
        visible: &[LabeledRow],
        current: usize,
        width: usize,
    ) -> Result<StepOutcome> {
        let resolved = self.resolved_rows(visible, current).count();
        if resolved < self.config.min_history_rows {
            return Ok(StepOutcome::InsufficientHistory);
        }

        let date = visible[current].date;
        match self.fit(visible, current, width)? {
            Some(model) => {
                info!(%date, threshold = model.threshold, "warmed up");
                self.state = State::Warm(model);
                self.retrain_dates.push(date);
                Ok(StepOutcome::WarmedUp)
            }
            None => {
                self.skipped_retrains.push(date);
                Ok(StepOutcome::WarmUpSkipped)
            }
        }
    }

    /// Labeled rows with features whose label is resolved by `current`,
    /// newest first.
    fn resolved_rows<'r>(
        &self,
        visible: &'r [LabeledRow],
        current: usize,
    ) -> impl Iterator<Item = &'r LabeledRow> {
        let resolved = match current.checked_sub(self.config.label_horizon_days) {
            Some(last) => &visible[..=last],
            None => &[],
        };
        resolved.iter().rev().filter(|r| r.is_trainable())
    }

    /// Rows trainable at `current`: labeled, resolved by `current`, and
    /// within the rolling window.
    fn training_rows<'r>(
        &self,
        visible: &'r [LabeledRow],
        current: usize,
    ) -> Vec<&'r LabeledRow> {
        let mut rows: Vec<&LabeledRow> = self
            .resolved_rows(visible, current)
            .take(self.config.rolling_train_window_size)
            .collect();
        rows.reverse();
        rows
    }

    /// Trains a new model at `current`, or returns `None` for a single-class
    /// training set.
    fn fit(
        &self,
        visible: &[LabeledRow],
        current: usize,
        width: usize,
    ) -> Result<Option<WarmModel>> {
        let date = visible[current].date;
        let rows = self.training_rows(visible, current);
        let (features, labels) = training_set(rows.iter().copied(), width)?;

        let positives = labels.iter().filter(|&&y| y == 1).count();
        if positives == 0 || positives == labels.len() {
            warn!(
                %date,
                samples = labels.len(),
                positives,
                "single-class training set, keeping previous model"
            );
            return Ok(None);
        }

        let mut scorer = self.factory.build();
        match scorer.fit(&features, &labels) {
            Ok(()) => {}
            Err(ForesightError::DegenerateTrainingSet(reason)) => {
                warn!(%date, %reason, "scorer rejected training set, keeping previous model");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let threshold = match self.config.decision_threshold_override {
            Some(threshold) => threshold,
            None => {
                let tail = labels.len().min(self.config.validation_tail);
                let start = labels.len() - tail;
                let tail_features = features.slice_axis(Axis(0), Slice::from(start..));
                let scores = scorer.score(&tail_features.to_owned())?;
                let y_true: Vec<u8> = labels.iter().skip(start).copied().collect();
                let policy: ThresholdPolicy = self.config.threshold.policy();
                let choice = choose_threshold(&y_true, &scores.to_vec(), &policy);
                debug!(
                    %date,
                    threshold = choice.threshold,
                    basis = ?choice.basis,
                    "threshold selected"
                );
                choice.threshold
            }
        };

        info!(
            %date,
            scorer = scorer.name(),
            samples = labels.len(),
            positives,
            threshold,
            "model trained"
        );
        Ok(Some(WarmModel {
            scorer,
            trained_on: date,
            trained_at: current,
            threshold,
        }))
    }

    /// Steps through every date of `history` and returns the run report.
    ///
    /// # Errors
    ///
    /// Propagates the first [`WalkForwardEngine::step`] error.
    pub fn run(mut self, history: &LabeledHistory) -> Result<RunReport> {
        for row in history.rows() {
            self.step(history, row.date)?;
        }
        Ok(self.finish())
    }

    /// Consumes the engine and summarizes the run.
    #[must_use]
    pub fn finish(self) -> RunReport {
        let status = if !self.is_warm() {
            warn!(
                skipped = self.skipped_retrains.len(),
                "run finished without warming up"
            );
            RunStatus::NeverWarmedUp
        } else if self.skipped_retrains.is_empty() {
            RunStatus::FullyWarmedUp
        } else {
            RunStatus::PartiallyWarmedUp
        };
        info!(
            signals = self.log.len(),
            retrains = self.retrain_dates.len(),
            ?status,
            "walk-forward run finished"
        );
        RunReport {
            log: self.log,
            status,
            retrain_dates: self.retrain_dates,
            skipped_retrains: self.skipped_retrains,
        }
    }
}

fn predict(model: &WarmModel, row: &LabeledRow, width: usize) -> Result<Signal> {
    let features = feature_matrix(std::iter::once(row), width)?;
    let scores = model.scorer.score(&features)?;
    let probability = scores
        .first()
        .copied()
        .ok_or_else(|| ForesightError::Model("scorer returned no score".to_string()))?;
    Ok(Signal::from_score(
        row.date,
        row.close,
        probability,
        model.threshold,
        row.label,
        model.trained_on,
    ))
}
