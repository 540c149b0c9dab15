//! Trading signals and the append-only signal log.
//!
//! A [`Signal`] is the prediction made for one date by the model that was
//! deployed before that date. The [`SignalLog`] keeps them in strictly
//! increasing date order, one entry per predicted date.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Date, ForesightError, Label, Result};

/// Trading action derived from a predicted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Predicted class 1: deploy pending cash.
    Buy,
    /// Predicted class 0: keep cash.
    Hold,
}

impl Action {
    /// Action for a predicted label.
    #[must_use]
    pub const fn from_label(label: Label) -> Self {
        match label {
            Label::Positive => Self::Buy,
            Label::Negative => Self::Hold,
        }
    }

    /// Display name as written to the signal log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Hold => "Hold",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison of a prediction with the true label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeTag {
    /// Predicted 1, true 1.
    TruePositive,
    /// Predicted 0, true 0.
    TrueNegative,
    /// Predicted 1, true 0.
    FalsePositive,
    /// Predicted 0, true 1.
    FalseNegative,
    /// The true label is not knowable yet.
    Unevaluated,
}

impl OutcomeTag {
    /// Tags a prediction against the true label, if known.
    #[must_use]
    pub const fn evaluate(actual: Option<Label>, predicted: Label) -> Self {
        match (actual, predicted) {
            (None, _) => Self::Unevaluated,
            (Some(Label::Positive), Label::Positive) => Self::TruePositive,
            (Some(Label::Negative), Label::Negative) => Self::TrueNegative,
            (Some(Label::Negative), Label::Positive) => Self::FalsePositive,
            (Some(Label::Positive), Label::Negative) => Self::FalseNegative,
        }
    }

    /// Short form used in exported files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TruePositive => "TP",
            Self::TrueNegative => "TN",
            Self::FalsePositive => "FP",
            Self::FalseNegative => "FN",
            Self::Unevaluated => "unevaluated",
        }
    }

    /// Whether the true label was known.
    #[must_use]
    pub const fn is_evaluated(&self) -> bool {
        !matches!(self, Self::Unevaluated)
    }
}

impl fmt::Display for OutcomeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prediction for a single date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Date the prediction is for.
    pub date: Date,
    /// Close on that date.
    pub close: f64,
    /// Predicted label: positive when `probability >= threshold`.
    pub predicted: Label,
    /// Scorer probability of class 1.
    pub probability: f64,
    /// Decision threshold in effect on that date.
    pub threshold: f64,
    /// Outcome against the true label.
    pub outcome: OutcomeTag,
    /// Date of the training event that produced the scoring model.
    pub model_trained_on: Date,
}

impl Signal {
    /// Builds a signal by applying `threshold` to `probability`.
    #[must_use]
    pub fn from_score(
        date: Date,
        close: f64,
        probability: f64,
        threshold: f64,
        actual: Option<Label>,
        model_trained_on: Date,
    ) -> Self {
        let predicted = Label::from_bool(probability >= threshold);
        Self {
            date,
            close,
            predicted,
            probability,
            threshold,
            outcome: OutcomeTag::evaluate(actual, predicted),
            model_trained_on,
        }
    }

    /// Buy or Hold.
    #[must_use]
    pub const fn action(&self) -> Action {
        Action::from_label(self.predicted)
    }
}

/// Append-only, date-ordered sequence of signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalLog {
    signals: Vec<Signal>,
}

impl SignalLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            signals: Vec::new(),
        }
    }

    /// Appends a signal.
    ///
    /// # Errors
    ///
    /// Returns [`ForesightError::InvalidData`] if the signal is not dated
    /// strictly after the last one.
    pub fn push(&mut self, signal: Signal) -> Result<()> {
        if let Some(last) = self.signals.last() {
            if signal.date <= last.date {
                return Err(ForesightError::InvalidData(format!(
                    "signal dated {} cannot follow {}",
                    signal.date, last.date
                )));
            }
        }
        self.signals.push(signal);
        Ok(())
    }

    /// Signals in date order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Iterates over signals in date order.
    pub fn iter(&self) -> std::slice::Iter<'_, Signal> {
        self.signals.iter()
    }

    /// Number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// The most recent signal.
    pub fn last(&self) -> Option<&Signal> {
        self.signals.last()
    }

    /// Signal for a given date.
    pub fn get(&self, date: Date) -> Option<&Signal> {
        self.signals
            .binary_search_by_key(&date, |s| s.date)
            .ok()
            .map(|i| &self.signals[i])
    }
}

impl<'a> IntoIterator for &'a SignalLog {
    type Item = &'a Signal;
    type IntoIter = std::slice::Iter<'a, Signal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}
