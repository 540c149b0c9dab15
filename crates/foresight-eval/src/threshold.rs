//! Decision threshold selection under class imbalance.
//!
//! Candidate thresholds form a fixed grid from 0.05 to 0.95 in steps of
//! 0.005. A sample is predicted positive when its score is `>=` the
//! threshold. The scan runs from the lowest threshold upwards and only a
//! strictly better value replaces the current best, so ties resolve to the
//! lowest threshold.

use serde::{Deserialize, Serialize};

use crate::ConfusionCounts;

/// Threshold returned for degenerate validation sets.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Validation sets smaller than this are degenerate.
pub const MIN_VALIDATION_SAMPLES: usize = 6;

/// Grid steps: thresholds are `(50 + 5 * i) / 1000` for `i` in `0..=GRID_STEPS`.
const GRID_STEPS: u32 = 180;

/// Objective for threshold selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Maximize precision subject to minimum recall and precision.
    PrecisionAtRecall {
        /// Required recall of class 1.
        target_recall: f64,
        /// Required precision of class 1.
        min_precision: f64,
    },
    /// Maximize recall subject to minimum precision.
    RecallAtPrecision {
        /// Required precision of class 1.
        target_precision: f64,
    },
}

/// How a threshold was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionBasis {
    /// A grid point met the policy constraints.
    Constrained,
    /// No grid point met the constraints; best F1 was used.
    F1Fallback,
    /// Too few samples or a single class; the default was used.
    Degenerate,
}

/// A selected threshold and the way it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdChoice {
    /// The selected threshold.
    pub threshold: f64,
    /// How it was chosen.
    pub basis: SelectionBasis,
}

/// The candidate thresholds in scan order.
pub fn threshold_grid() -> impl Iterator<Item = f64> {
    (0..=GRID_STEPS).map(|i| f64::from(50 + 5 * i) / 1000.0)
}

fn counts_at(y_true: &[u8], y_score: &[f64], threshold: f64) -> ConfusionCounts {
    let mut counts = ConfusionCounts::default();
    for (&y, &s) in y_true.iter().zip(y_score) {
        let predicted = s >= threshold;
        match (y == 1, predicted) {
            (true, true) => counts.tp += 1,
            (false, false) => counts.tn += 1,
            (false, true) => counts.fp += 1,
            (true, false) => counts.fn_ += 1,
        }
    }
    counts
}

/// Returns the first grid threshold with the strictly largest objective among
/// those passing `admissible`.
fn scan<A, O>(y_true: &[u8], y_score: &[f64], admissible: A, objective: O) -> Option<f64>
where
    A: Fn(&ConfusionCounts) -> bool,
    O: Fn(&ConfusionCounts) -> f64,
{
    let mut best: Option<(f64, f64)> = None;
    for threshold in threshold_grid() {
        let counts = counts_at(y_true, y_score, threshold);
        if !admissible(&counts) {
            continue;
        }
        let value = objective(&counts);
        if best.is_none_or(|(_, v)| value > v) {
            best = Some((threshold, value));
        }
    }
    best.map(|(t, _)| t)
}

/// Selects a threshold and reports how it was reached.
///
/// Scores and labels are paired up to the shorter of the two slices. NaN
/// scores never count as positive predictions.
pub fn choose_threshold(y_true: &[u8], y_score: &[f64], policy: &ThresholdPolicy) -> ThresholdChoice {
    let n = y_true.len().min(y_score.len());
    let (y_true, y_score) = (&y_true[..n], &y_score[..n]);

    let positives = y_true.iter().filter(|&&y| y == 1).count();
    if n < MIN_VALIDATION_SAMPLES || positives == 0 || positives == n {
        return ThresholdChoice {
            threshold: DEFAULT_THRESHOLD,
            basis: SelectionBasis::Degenerate,
        };
    }

    let constrained = match *policy {
        ThresholdPolicy::PrecisionAtRecall {
            target_recall,
            min_precision,
        } => scan(
            y_true,
            y_score,
            |c| c.recall() >= target_recall && c.precision() >= min_precision,
            ConfusionCounts::precision,
        ),
        ThresholdPolicy::RecallAtPrecision { target_precision } => scan(
            y_true,
            y_score,
            |c| c.precision() >= target_precision,
            ConfusionCounts::recall,
        ),
    };

    if let Some(threshold) = constrained {
        return ThresholdChoice {
            threshold,
            basis: SelectionBasis::Constrained,
        };
    }

    let threshold = scan(y_true, y_score, |_| true, ConfusionCounts::f1).unwrap_or(DEFAULT_THRESHOLD);
    ThresholdChoice {
        threshold,
        basis: SelectionBasis::F1Fallback,
    }
}

/// Selects a decision threshold from validation labels and scores.
///
/// Deterministic, and never fails: degenerate inputs yield
/// [`DEFAULT_THRESHOLD`].
///
/// # Examples
///
/// ```
/// use foresight_eval::{ThresholdPolicy, select_threshold};
///
/// let y_true = [1, 1, 1, 0, 0, 0, 0, 0];
/// let y_score = [0.9, 0.8, 0.3, 0.7, 0.2, 0.1, 0.05, 0.4];
/// let policy = ThresholdPolicy::RecallAtPrecision { target_precision: 1.0 };
///
/// let threshold = select_threshold(&y_true, &y_score, &policy);
/// assert!(threshold > 0.7 && threshold <= 0.8);
/// ```
pub fn select_threshold(y_true: &[u8], y_score: &[f64], policy: &ThresholdPolicy) -> f64 {
    choose_threshold(y_true, y_score, policy).threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const Y_TRUE: [u8; 8] = [1, 1, 1, 0, 0, 0, 0, 0];
    const Y_SCORE: [f64; 8] = [0.9, 0.8, 0.3, 0.7, 0.2, 0.1, 0.05, 0.4];

    #[test]
    fn test_grid() {
        let grid: Vec<f64> = threshold_grid().collect();
        assert_eq!(grid.len(), 181);
        assert_relative_eq!(grid[0], 0.05);
        assert_relative_eq!(grid[1], 0.055);
        assert_relative_eq!(grid[180], 0.95);
    }

    #[test]
    fn test_recall_at_full_precision_excludes_false_positive() {
        let policy = ThresholdPolicy::RecallAtPrecision {
            target_precision: 1.0,
        };
        let choice = choose_threshold(&Y_TRUE, &Y_SCORE, &policy);
        assert_eq!(choice.basis, SelectionBasis::Constrained);
        // The lowest cutoff above the 0.7 negative keeps the 0.9 and 0.8 positives
        assert_relative_eq!(choice.threshold, 0.705);

        let counts = counts_at(&Y_TRUE, &Y_SCORE, choice.threshold);
        assert_eq!(counts.fp, 0);
        assert_eq!(counts.tp, 2);
    }

    #[test]
    fn test_precision_at_recall() {
        // recall >= 1 needs t <= 0.3: precision 3/5 at (0.2, 0.3]
        let policy = ThresholdPolicy::PrecisionAtRecall {
            target_recall: 1.0,
            min_precision: 0.5,
        };
        let choice = choose_threshold(&Y_TRUE, &Y_SCORE, &policy);
        assert_eq!(choice.basis, SelectionBasis::Constrained);
        assert_relative_eq!(choice.threshold, 0.205);
    }

    #[test]
    fn test_f1_fallback() {
        // precision 1.0 with recall 1.0 is impossible here
        let policy = ThresholdPolicy::PrecisionAtRecall {
            target_recall: 1.0,
            min_precision: 1.0,
        };
        let choice = choose_threshold(&Y_TRUE, &Y_SCORE, &policy);
        assert_eq!(choice.basis, SelectionBasis::F1Fallback);
        // F1 peaks at 0.8 on (0.7, 0.8]: 2 TP, 0 FP, 1 FN. The runner-up is
        // 0.75 on (0.2, 0.3] with 3 TP and 2 FP.
        assert_relative_eq!(choice.threshold, 0.705);
    }

    #[test]
    fn test_degenerate_inputs() {
        let policy = ThresholdPolicy::RecallAtPrecision {
            target_precision: 0.5,
        };
        assert_relative_eq!(
            select_threshold(&[1, 0, 1, 0, 1], &[0.9, 0.1, 0.8, 0.2, 0.7], &policy),
            DEFAULT_THRESHOLD
        );
        assert_relative_eq!(
            select_threshold(&[1; 10], &[0.9; 10], &policy),
            DEFAULT_THRESHOLD
        );
        assert_relative_eq!(select_threshold(&[], &[], &policy), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_deterministic() {
        let policy = ThresholdPolicy::PrecisionAtRecall {
            target_recall: 0.5,
            min_precision: 0.5,
        };
        let first = select_threshold(&Y_TRUE, &Y_SCORE, &policy);
        for _ in 0..10 {
            assert_eq!(select_threshold(&Y_TRUE, &Y_SCORE, &policy), first);
        }
    }

    #[test]
    fn test_policy_serde() {
        let policy: ThresholdPolicy = serde_json::from_str(
            r#"{"policy": "recall_at_precision", "target_precision": 0.6}"#,
        )
        .unwrap();
        assert_eq!(
            policy,
            ThresholdPolicy::RecallAtPrecision {
                target_precision: 0.6
            }
        );
    }
}
