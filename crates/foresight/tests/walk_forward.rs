//! Walk-forward engine behaviour on hand-built histories.
//!
//! Every row carries its own index as its single feature, so a scorer can
//! tell exactly which rows it was trained on.

use std::sync::Mutex;

use approx::assert_relative_eq;
use chrono::Days;
use foresight::{
    Date, EngineConfig, LabeledHistory, LabeledRow, OutcomeTag, Retrain, RunStatus, StepOutcome,
    WalkForwardEngine,
};
use foresight::features::FixedBand;
use foresight::traits::{
    FeatureSchema, Label, Labeler, PricePoint, PriceSeries, Result, Scorer, ScorerFactory,
};
use ndarray::{Array1, Array2};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn start() -> Date {
    Date::from_ymd_opt(2021, 1, 4).unwrap()
}

fn date(i: usize) -> Date {
    start() + Days::new(i as u64)
}

/// History of `n` rows whose feature is the row index.
fn history(
    n: usize,
    features: impl Fn(usize) -> bool,
    label: impl Fn(usize) -> Option<Label>,
) -> LabeledHistory {
    let rows = (0..n)
        .map(|i| {
            let has_features = features(i);
            LabeledRow {
                date: date(i),
                close: 100.0 + i as f64,
                features: has_features.then(|| vec![i as f64]),
                label: if has_features { label(i) } else { None },
            }
        })
        .collect();
    LabeledHistory::new(FeatureSchema::new("index", 1, vec!["index".into()]), rows).unwrap()
}

fn mixed(i: usize) -> Option<Label> {
    Some(Label::from_bool(i % 3 == 0))
}

/// Remembers the newest row index it was fitted on and reports it, scaled
/// into `[0, 1)`, as the score of every row.
#[derive(Debug, Default)]
struct Spy {
    trained_through: Option<f64>,
}

impl Scorer for Spy {
    fn name(&self) -> &str {
        "spy"
    }

    fn fit(&mut self, features: &Array2<f64>, _labels: &Array1<u8>) -> Result<()> {
        self.trained_through = features.column(0).iter().copied().reduce(f64::max);
        Ok(())
    }

    fn score(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let through = self.trained_through.unwrap_or(0.0);
        Ok(Array1::from_elem(features.nrows(), through / 1000.0))
    }
}

fn spy() -> Box<dyn Scorer> {
    Box::new(Spy::default())
}

/// Reports the size of its training set, divided by 10 000, as every score.
#[derive(Debug, Default)]
struct SampleCount {
    samples: usize,
}

impl Scorer for SampleCount {
    fn name(&self) -> &str {
        "sample-count"
    }

    fn fit(&mut self, features: &Array2<f64>, _labels: &Array1<u8>) -> Result<()> {
        self.samples = features.nrows();
        Ok(())
    }

    fn score(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(features.nrows(), self.samples as f64 / 10_000.0))
    }
}

fn sample_count() -> Box<dyn Scorer> {
    Box::new(SampleCount::default())
}

/// The history already masks the last ten labels, so every labeled row is
/// trainable as soon as it is visible.
fn scenario_config() -> EngineConfig {
    EngineConfig {
        retrain_interval_days: 20,
        label_horizon_days: 0,
        min_history_rows: 50,
        decision_threshold_override: Some(0.5),
        ..EngineConfig::default()
    }
}

// ──────────────────────────────────────────────
// Scenario
// ──────────────────────────────────────────────

#[test]
fn test_rising_series_leaves_last_horizon_unlabeled() {
    let points = (0..100)
        .map(|i: usize| {
            // Monday to Friday of consecutive weeks
            let weekday = start() + Days::new((i / 5 * 7 + i % 5) as u64);
            PricePoint::new(weekday, 100.0 * 1.015_f64.powi(i as i32))
        })
        .collect();
    let series = PriceSeries::new(points).unwrap();
    let labeler = FixedBand {
        horizon: 10,
        ..FixedBand::default()
    };

    let labels = labeler.label(&series);
    assert_eq!(labels.len(), 100);
    assert!(labels[90..].iter().all(Option::is_none));
    assert!(labels[..90].iter().all(|l| *l == Some(Label::Positive)));
}

#[test]
fn test_scenario_warm_up_and_retrain_cadence() {
    let history = history(100, |_| true, |i| if i < 90 { mixed(i) } else { None });
    let report = WalkForwardEngine::new(scenario_config(), &spy)
        .unwrap()
        .run(&history)
        .unwrap();

    // the 50th row warms the engine up and retrains follow on the 70th and
    // 90th; the 100th row is only 10 rows past the last one
    assert_eq!(report.retrain_dates, vec![date(49), date(69), date(89)]);
    assert_eq!(report.status, RunStatus::FullyWarmedUp);
    assert!(report.skipped_retrains.is_empty());

    let signals = report.log.signals();
    assert_eq!(signals.len(), 50);
    assert_eq!(signals[0].date, date(50));
    assert_eq!(signals.last().unwrap().date, date(99));
    assert_eq!(report.warmed_up_on(), Some(date(49)));

    // unresolved labels are not evaluated
    for signal in &signals[40..] {
        assert_eq!(signal.outcome, OutcomeTag::Unevaluated);
    }
    for signal in &signals[..40] {
        assert!(signal.outcome.is_evaluated());
    }
}

#[test]
fn test_retrain_date_is_scored_by_previous_model() {
    let history = history(100, |_| true, |i| if i < 90 { mixed(i) } else { None });
    let report = WalkForwardEngine::new(scenario_config(), &spy)
        .unwrap()
        .run(&history)
        .unwrap();

    let on = |i: usize| report.log.get(date(i)).unwrap();
    assert_eq!(on(69).model_trained_on, date(49));
    assert_eq!(on(70).model_trained_on, date(69));
    assert_eq!(on(89).model_trained_on, date(69));
    assert_eq!(on(90).model_trained_on, date(89));
}

// ──────────────────────────────────────────────
// No look-ahead
// ──────────────────────────────────────────────

#[test]
fn test_no_training_row_is_newer_than_its_resolution_date() {
    let horizon = 10;
    let history = history(160, |i| i % 7 != 3, mixed);
    let report = WalkForwardEngine::new(
        EngineConfig {
            retrain_interval_days: 15,
            label_horizon_days: horizon,
            min_history_rows: 40,
            decision_threshold_override: Some(0.99),
            ..EngineConfig::default()
        },
        &spy,
    )
    .unwrap()
    .run(&history)
    .unwrap();

    assert!(!report.log.is_empty());
    for signal in &report.log {
        let scored = history.position(signal.date).unwrap();
        let trained_at = history.position(signal.model_trained_on).unwrap();
        let trained_through = (signal.probability * 1000.0).round() as usize;

        // the deployed model predates the scored date
        assert!(
            trained_at < scored,
            "{} scored by model of {}",
            signal.date,
            signal.model_trained_on
        );
        // and only saw labels resolved by its own training date
        assert!(trained_through + horizon <= trained_at);
    }
}

#[test]
fn test_scores_do_not_depend_on_future_rows() {
    let full = history(150, |_| true, mixed);
    let truncated = history(110, |_| true, mixed);
    let config = EngineConfig {
        retrain_interval_days: 15,
        label_horizon_days: 5,
        min_history_rows: 30,
        decision_threshold_override: Some(0.5),
        ..EngineConfig::default()
    };

    let full_log = WalkForwardEngine::new(config.clone(), &spy)
        .unwrap()
        .run(&full)
        .unwrap()
        .log;
    let truncated_log = WalkForwardEngine::new(config, &spy)
        .unwrap()
        .run(&truncated)
        .unwrap()
        .log;

    assert_eq!(
        &full_log.signals()[..truncated_log.len()],
        truncated_log.signals()
    );
}

// ──────────────────────────────────────────────
// State machine
// ──────────────────────────────────────────────

#[test]
fn test_cold_start_happens_exactly_once() {
    let history = history(120, |i| i % 5 != 0, mixed);
    let mut engine = WalkForwardEngine::new(scenario_config(), &spy).unwrap();

    let outcomes: Vec<StepOutcome> = history
        .rows()
        .iter()
        .map(|row| engine.step(&history, row.date).unwrap())
        .collect();

    let warm_ups = outcomes
        .iter()
        .filter(|o| **o == StepOutcome::WarmedUp)
        .count();
    assert_eq!(warm_ups, 1);

    let first_warm = outcomes
        .iter()
        .position(|o| *o == StepOutcome::WarmedUp)
        .unwrap();
    assert!(outcomes[..first_warm]
        .iter()
        .all(|o| *o == StepOutcome::InsufficientHistory));
    assert!(outcomes[first_warm + 1..]
        .iter()
        .all(|o| matches!(o, StepOutcome::Warm { .. })));
    assert!(engine.is_warm());
}

#[test]
fn test_default_config_waits_for_resolved_labels() {
    let config = EngineConfig::default();
    let horizon = config.label_horizon_days;
    let min_rows = config.min_history_rows;
    // features on every row, labels unresolved on the final horizon
    let history = history(400, |_| true, |i| if i < 400 - horizon { mixed(i) } else { None });

    let report = WalkForwardEngine::new(config, &sample_count)
        .unwrap()
        .run(&history)
        .unwrap();

    assert_eq!(report.status, RunStatus::FullyWarmedUp);
    assert!(report.skipped_retrains.is_empty());
    // the first fit sees exactly the labels resolved by then
    assert_eq!(report.warmed_up_on(), Some(date(horizon + min_rows - 1)));

    let first = report.log.signals().first().unwrap();
    assert_eq!(first.date, date(horizon + min_rows));
    assert_relative_eq!(first.probability, min_rows as f64 / 10_000.0);
}

#[test]
fn test_no_signal_without_features() {
    let history = history(150, |i| i % 4 != 1, mixed);
    let report = WalkForwardEngine::new(scenario_config(), &spy)
        .unwrap()
        .run(&history)
        .unwrap();

    let with_features = history.rows().iter().filter(|r| r.has_features()).count();
    assert!(report.log.len() <= with_features);
    for signal in &report.log {
        let row = &history.rows()[history.position(signal.date).unwrap()];
        assert!(row.has_features());
    }
}

#[test]
fn test_retrain_due_on_featureless_date_still_retrains() {
    // row 69 is due for a retrain but has no features
    let history = history(100, |i| i != 69, |i| if i < 90 { mixed(i) } else { None });
    let mut engine = WalkForwardEngine::new(scenario_config(), &spy).unwrap();
    for row in &history.rows()[..69] {
        engine.step(&history, row.date).unwrap();
    }
    assert_eq!(
        engine.step(&history, date(69)).unwrap(),
        StepOutcome::Warm {
            emitted: false,
            retrain: Retrain::Done
        }
    );
    assert_eq!(engine.last_train_date(), Some(date(69)));
}

#[test]
fn test_single_class_retrain_keeps_previous_model() {
    let history = history(
        60,
        |_| true,
        |i| Some(Label::from_bool(i < 25 && i % 2 == 0)),
    );
    let report = WalkForwardEngine::new(
        EngineConfig {
            retrain_interval_days: 10,
            rolling_train_window_size: 10,
            label_horizon_days: 0,
            min_history_rows: 20,
            decision_threshold_override: Some(0.5),
            ..EngineConfig::default()
        },
        &spy,
    )
    .unwrap()
    .run(&history)
    .unwrap();

    // rows 30..=39 hold negatives only, and so does every later window
    assert_eq!(report.retrain_dates, vec![date(19), date(29)]);
    assert_eq!(report.skipped_retrains.first(), Some(&date(39)));
    assert_eq!(report.status, RunStatus::PartiallyWarmedUp);
    assert!(report.ensure_warm().is_ok());

    let last = report.log.last().unwrap();
    assert_eq!(last.date, date(59));
    assert_eq!(last.model_trained_on, date(29));
}

#[test]
fn test_never_warms_up_on_a_single_class() {
    let history = history(80, |_| true, |_| Some(Label::Positive));
    let report = WalkForwardEngine::new(scenario_config(), &spy)
        .unwrap()
        .run(&history)
        .unwrap();

    assert_eq!(report.status, RunStatus::NeverWarmedUp);
    assert!(report.log.is_empty());
    assert!(report.retrain_dates.is_empty());
    assert!(report.ensure_warm().is_err());
}

#[test]
fn test_engines_do_not_share_state() {
    let history = history(100, |_| true, mixed);
    let fits = Mutex::new(0_usize);
    let counting = || {
        *fits.lock().unwrap() += 1;
        spy()
    };
    let factory: &dyn ScorerFactory = &counting;

    let first = WalkForwardEngine::new(scenario_config(), factory)
        .unwrap()
        .run(&history)
        .unwrap();
    let second = WalkForwardEngine::new(scenario_config(), factory)
        .unwrap()
        .run(&history)
        .unwrap();

    assert_eq!(first, second);
    // one fresh scorer per training event
    assert_eq!(*fits.lock().unwrap(), 2 * first.retrain_dates.len());
}
