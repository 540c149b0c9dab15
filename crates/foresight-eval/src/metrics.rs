//! Confusion-matrix metrics for class 1.
//!
//! Precision, recall and F1 are reported for the positive (Buy) class and are
//! zero whenever their denominator is zero.

use std::ops::{Add, AddAssign};

use foresight_traits::{Label, OutcomeTag, SignalLog};
use serde::{Deserialize, Serialize};

/// Counts of true/false positives and negatives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Predicted 1, true 1.
    pub tp: usize,
    /// Predicted 0, true 0.
    pub tn: usize,
    /// Predicted 1, true 0.
    pub fp: usize,
    /// Predicted 0, true 1.
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl ConfusionCounts {
    /// Counts `(actual, predicted)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Label, Label)>,
    {
        let mut counts = Self::default();
        for (actual, predicted) in pairs {
            counts.record(OutcomeTag::evaluate(Some(actual), predicted));
        }
        counts
    }

    /// Counts the evaluated signals of a log; unevaluated ones are ignored.
    pub fn from_signals(log: &SignalLog) -> Self {
        let mut counts = Self::default();
        for signal in log {
            counts.record(signal.outcome);
        }
        counts
    }

    /// Adds one outcome.
    pub const fn record(&mut self, outcome: OutcomeTag) {
        match outcome {
            OutcomeTag::TruePositive => self.tp += 1,
            OutcomeTag::TrueNegative => self.tn += 1,
            OutcomeTag::FalsePositive => self.fp += 1,
            OutcomeTag::FalseNegative => self.fn_ += 1,
            OutcomeTag::Unevaluated => {}
        }
    }

    /// Number of counted samples.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// `tp / (tp + fp)`.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// `tp / (tp + fn)`.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 }
    }

    /// Share of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl Add for ConfusionCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            tp: self.tp + rhs.tp,
            tn: self.tn + rhs.tn,
            fp: self.fp + rhs.fp,
            fn_: self.fn_ + rhs.fn_,
        }
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
