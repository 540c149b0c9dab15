//! Response types for the FRED `series/observations` endpoint.

use chrono::NaiveDate;
use foresight_traits::PriceSeries;
use serde::{Deserialize, Serialize};

/// FRED marks missing values (typically market holidays) with a dot.
pub const MISSING_VALUE: &str = ".";

/// A single observation as returned by FRED.
///
/// Values arrive as strings so that the missing marker survives parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date (`YYYY-MM-DD`).
    pub date: String,
    /// Observed value, or `"."` when missing.
    pub value: String,
    /// Start of the real-time period.
    #[serde(default)]
    pub realtime_start: Option<String>,
    /// End of the real-time period.
    #[serde(default)]
    pub realtime_end: Option<String>,
}

impl Observation {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// The numeric value; `None` for the missing marker or unparseable text.
    #[must_use]
    pub fn parsed_value(&self) -> Option<f64> {
        let raw = self.value.trim();
        if raw == MISSING_VALUE {
            return None;
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Wrapper for the observations response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationsResponse {
    /// Number of observations matching the query.
    #[serde(default)]
    pub count: Option<u64>,
    /// Observations in ascending date order.
    #[serde(default)]
    pub observations: Vec<Observation>,
}

/// Error body FRED returns alongside 4xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error_message: String,
}

/// Converts raw observations into a validated close series.
///
/// Missing values, unparseable dates and weekend dates are dropped. Duplicate
/// dates keep the last occurrence.
#[must_use]
pub fn to_price_series(observations: &[Observation]) -> PriceSeries {
    PriceSeries::from_observations(
        observations
            .iter()
            .filter_map(|obs| obs.parsed_date().map(|date| (date, obs.parsed_value()))),
    )
}
