//! Common types used throughout the Foresight workspace.
//!
//! This module defines the price series fed into the pipeline, the versioned
//! feature schema, and the labeled per-date history consumed by the
//! walk-forward engine.

use chrono::{Datelike, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{CE_TO_UNIX_EPOCH_DAYS, ForesightError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A single daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: Date,
    /// Closing price.
    pub close: f64,
}

impl PricePoint {
    /// Create a new price point.
    #[must_use]
    pub const fn new(date: Date, close: f64) -> Self {
        Self { date, close }
    }
}

fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Ordered sequence of daily closes.
///
/// Dates are strictly increasing and fall on weekdays; closes are finite and
/// positive. A series is immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a series from points that already satisfy the series invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ForesightError::InvalidData`] if dates are not strictly
    /// increasing, a date falls on a weekend, or a close is not a finite
    /// positive number.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(ForesightError::InvalidData(format!(
                    "close on {} is not a positive finite number: {}",
                    point.date, point.close
                )));
            }
            if is_weekend(point.date) {
                return Err(ForesightError::InvalidData(format!(
                    "{} is not a trading day",
                    point.date
                )));
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(ForesightError::InvalidData(format!(
                    "dates must be strictly increasing: {} follows {}",
                    point.date,
                    points[i - 1].date
                )));
            }
        }
        Ok(Self { points })
    }

    /// Builds a series from raw observations, dropping anything unusable.
    ///
    /// Missing values, non-finite or non-positive closes and weekend dates are
    /// treated as absent dates. Observations are sorted; when a date repeats the
    /// last observation wins.
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (Date, Option<f64>)>,
    {
        let mut points: Vec<PricePoint> = observations
            .into_iter()
            .filter_map(|(date, close)| close.map(|c| PricePoint::new(date, c)))
            .filter(|p| p.close.is_finite() && p.close > 0.0 && !is_weekend(p.date))
            .collect();

        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self { points: deduped }
    }

    /// Builds a series from a DataFrame with `date` and `close` columns.
    ///
    /// The `date` column may be a polars date column or `YYYY-MM-DD` strings.
    /// Rows with unparseable dates or missing closes are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if either column is missing or has an unsupported type.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let date_col = df
            .column("date")
            .map_err(|_| ForesightError::InvalidData("missing column: date".to_string()))?
            .as_materialized_series();
        let close_col = df
            .column("close")
            .map_err(|_| ForesightError::InvalidData("missing column: close".to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        let dates: Vec<Option<Date>> = if let Ok(days) = date_col.date() {
            days.into_iter()
                .map(|d: Option<i32>| {
                    d.and_then(|d| Date::from_num_days_from_ce_opt(d + CE_TO_UNIX_EPOCH_DAYS))
                })
                .collect()
        } else if let Ok(text) = date_col.str() {
            text.into_iter()
                .map(|s: Option<&str>| {
                    s.and_then(|s| Date::parse_from_str(s.trim(), "%Y-%m-%d").ok())
                })
                .collect()
        } else {
            return Err(ForesightError::InvalidData(format!(
                "unsupported date column type: {}",
                date_col.dtype()
            )));
        };

        let closes = close_col.f64()?;
        let observations = dates
            .into_iter()
            .zip(closes.into_iter())
            .filter_map(|(date, close)| date.map(|d| (d, close)));

        Ok(Self::from_observations(observations))
    }

    /// Converts the series into a DataFrame with `date` and `close` columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the date column cannot be cast.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let days: Vec<i32> = self
            .points
            .iter()
            .map(|p| p.date.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS)
            .collect();
        let dates = Series::new("date".into(), days).cast(&DataType::Date)?;
        let closes = Series::new("close".into(), self.closes());
        Ok(DataFrame::new(vec![
            dates.into_column(),
            closes.into_column(),
        ])?)
    }

    /// Returns the points in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Returns the number of trading days in the series.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the dates in order.
    pub fn dates(&self) -> Vec<Date> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Returns the closes in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Returns the first date, if any.
    pub fn first_date(&self) -> Option<Date> {
        self.points.first().map(|p| p.date)
    }

    /// Returns the last date, if any.
    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|p| p.date)
    }
}

/// Ordered, versioned list of feature names.
///
/// The schema is fixed when a run is configured and every feature row is
/// validated against it, so training and prediction always see the same
/// columns in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Name of the feature set.
    pub name: String,
    /// Schema version, bumped whenever the feature list changes.
    pub version: u32,
    /// Feature names in column order.
    pub features: Vec<String>,
}

impl FeatureSchema {
    /// Create a new schema.
    pub fn new(name: impl Into<String>, version: u32, features: Vec<String>) -> Self {
        Self {
            name: name.into(),
            version,
            features,
        }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the schema declares no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Position of a feature by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    /// Checks that a row has exactly as many values as the schema has features.
    ///
    /// # Errors
    ///
    /// Returns [`ForesightError::SchemaMismatch`] on a width mismatch.
    pub fn validate_width(&self, width: usize) -> Result<()> {
        if width == self.len() {
            Ok(())
        } else {
            Err(ForesightError::SchemaMismatch {
                expected: self.len(),
                found: width,
            })
        }
    }
}

/// Feature values for one date. Values may be NaN during indicator warm-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Trading date.
    pub date: Date,
    /// Values in schema order.
    pub values: Vec<f64>,
}

impl FeatureRow {
    /// Whether every value is finite.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// Binary target of the forward-looking label rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// The rule was not satisfied (class 0).
    Negative,
    /// The rule was satisfied (class 1).
    Positive,
}

impl Label {
    /// Label from a boolean outcome.
    #[must_use]
    pub const fn from_bool(positive: bool) -> Self {
        if positive { Self::Positive } else { Self::Negative }
    }

    /// Whether this is class 1.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    /// Class index, 0 or 1.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }
}

/// One date of the history handed to the walk-forward engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    /// Trading date.
    pub date: Date,
    /// Closing price.
    pub close: f64,
    /// Complete feature vector, or `None` when any feature was missing.
    pub features: Option<Vec<f64>>,
    /// Label, or `None` when it is not knowable or features are missing.
    pub label: Option<Label>,
}

impl LabeledRow {
    /// Whether the row can be scored.
    pub const fn has_features(&self) -> bool {
        self.features.is_some()
    }

    /// Whether the row can be used as a training sample.
    pub const fn is_trainable(&self) -> bool {
        self.features.is_some() && self.label.is_some()
    }
}

/// Date-ordered labeled rows sharing one feature schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledHistory {
    schema: FeatureSchema,
    rows: Vec<LabeledRow>,
}

impl LabeledHistory {
    /// Creates a history, validating date order and feature widths.
    ///
    /// # Errors
    ///
    /// Returns [`ForesightError::InvalidData`] for unordered dates or
    /// non-finite values and [`ForesightError::SchemaMismatch`] for rows whose
    /// width differs from the schema.
    pub fn new(schema: FeatureSchema, rows: Vec<LabeledRow>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 && rows[i - 1].date >= row.date {
                return Err(ForesightError::InvalidData(format!(
                    "history dates must be strictly increasing: {} follows {}",
                    row.date,
                    rows[i - 1].date
                )));
            }
            if !row.close.is_finite() || row.close <= 0.0 {
                return Err(ForesightError::InvalidData(format!(
                    "close on {} is not a positive finite number",
                    row.date
                )));
            }
            if let Some(values) = &row.features {
                schema.validate_width(values.len())?;
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(ForesightError::InvalidData(format!(
                        "non-finite feature value on {}",
                        row.date
                    )));
                }
            }
        }
        Ok(Self { schema, rows })
    }

    /// Joins a price series with its feature rows and labels.
    ///
    /// Feature rows with any non-finite value become `None`, and the label of
    /// such a row is masked as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the three inputs are not aligned date by date or a
    /// feature row does not match the schema.
    pub fn assemble(
        schema: FeatureSchema,
        series: &PriceSeries,
        features: Vec<FeatureRow>,
        labels: Vec<Option<Label>>,
    ) -> Result<Self> {
        if features.len() != series.len() || labels.len() != series.len() {
            return Err(ForesightError::InvalidData(format!(
                "misaligned inputs: {} prices, {} feature rows, {} labels",
                series.len(),
                features.len(),
                labels.len()
            )));
        }

        let mut rows = Vec::with_capacity(series.len());
        for ((point, feature_row), label) in series.points().iter().zip(features).zip(labels) {
            if feature_row.date != point.date {
                return Err(ForesightError::InvalidData(format!(
                    "feature row dated {} aligned with price dated {}",
                    feature_row.date, point.date
                )));
            }
            schema.validate_width(feature_row.values.len())?;
            let complete = feature_row.is_complete();
            rows.push(LabeledRow {
                date: point.date,
                close: point.close,
                features: complete.then_some(feature_row.values),
                label: if complete { label } else { None },
            });
        }

        Self::new(schema, rows)
    }

    /// The feature schema shared by all rows.
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// All rows in date order.
    pub fn rows(&self) -> &[LabeledRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dates in order.
    pub fn dates(&self) -> Vec<Date> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Rows dated on or before `date`.
    pub fn visible_until(&self, date: Date) -> &[LabeledRow] {
        let end = self.rows.partition_point(|r| r.date <= date);
        &self.rows[..end]
    }

    /// Index of the row dated exactly `date`.
    pub fn position(&self, date: Date) -> Option<usize> {
        self.rows.binary_search_by_key(&date, |r| r.date).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn schema(n: usize) -> FeatureSchema {
        FeatureSchema::new("test", 1, (0..n).map(|i| format!("f{i}")).collect())
    }

    #[test]
    fn test_price_series_new_validates_order() {
        let points = vec![
            PricePoint::new(d(2024, 1, 3), 100.0),
            PricePoint::new(d(2024, 1, 2), 101.0),
        ];
        assert!(matches!(
            PriceSeries::new(points),
            Err(ForesightError::InvalidData(_))
        ));
    }

    #[test]
    fn test_price_series_new_rejects_weekend_and_bad_close() {
        // 2024-01-06 is a Saturday
        let weekend = vec![PricePoint::new(d(2024, 1, 6), 100.0)];
        assert!(PriceSeries::new(weekend).is_err());

        let zero = vec![PricePoint::new(d(2024, 1, 2), 0.0)];
        assert!(PriceSeries::new(zero).is_err());

        let nan = vec![PricePoint::new(d(2024, 1, 2), f64::NAN)];
        assert!(PriceSeries::new(nan).is_err());
    }

    #[test]
    fn test_from_observations_drops_missing_and_weekends() {
        let series = PriceSeries::from_observations(vec![
            (d(2024, 1, 5), Some(102.0)),
            (d(2024, 1, 2), Some(100.0)),
            (d(2024, 1, 3), None),
            (d(2024, 1, 6), Some(99.0)),
            (d(2024, 1, 4), Some(f64::NAN)),
            (d(2024, 1, 8), Some(-1.0)),
            (d(2024, 1, 5), Some(103.0)),
        ]);

        assert_eq!(series.dates(), vec![d(2024, 1, 2), d(2024, 1, 5)]);
        assert_eq!(series.closes(), vec![100.0, 103.0]);
    }

    #[test]
    fn test_price_series_frame_conversion() {
        let series = PriceSeries::new(vec![
            PricePoint::new(d(2024, 1, 2), 100.0),
            PricePoint::new(d(2024, 1, 3), 101.5),
        ])
        .unwrap();

        let df = series.to_frame().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);

        let back = PriceSeries::from_frame(&df).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn test_price_series_from_string_dates() {
        let df = df! {
            "date" => &["2024-01-03", "2024-01-02", "not a date"],
            "close" => &[101.0, 100.0, 99.0],
        }
        .unwrap();

        let series = PriceSeries::from_frame(&df).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(d(2024, 1, 2)));
        assert_eq!(series.last_date(), Some(d(2024, 1, 3)));
    }

    #[test]
    fn test_schema_validate_width() {
        let s = schema(3);
        assert!(s.validate_width(3).is_ok());
        assert!(matches!(
            s.validate_width(2),
            Err(ForesightError::SchemaMismatch {
                expected: 3,
                found: 2
            })
        ));
        assert_eq!(s.index_of("f1"), Some(1));
        assert_eq!(s.index_of("missing"), None);
    }

    #[test]
    fn test_label_conversions() {
        assert_eq!(Label::from_bool(true), Label::Positive);
        assert_eq!(Label::Negative.as_u8(), 0);
        assert!(Label::Positive.is_positive());
    }

    #[test]
    fn test_assemble_masks_incomplete_rows() {
        let series = PriceSeries::new(vec![
            PricePoint::new(d(2024, 1, 2), 100.0),
            PricePoint::new(d(2024, 1, 3), 101.0),
        ])
        .unwrap();
        let features = vec![
            FeatureRow {
                date: d(2024, 1, 2),
                values: vec![f64::NAN, 1.0],
            },
            FeatureRow {
                date: d(2024, 1, 3),
                values: vec![0.5, 1.0],
            },
        ];
        let labels = vec![Some(Label::Positive), Some(Label::Negative)];

        let history = LabeledHistory::assemble(schema(2), &series, features, labels).unwrap();
        assert!(history.rows()[0].features.is_none());
        assert!(history.rows()[0].label.is_none());
        assert!(history.rows()[1].is_trainable());
    }

    #[test]
    fn test_assemble_rejects_misaligned_inputs() {
        let series = PriceSeries::new(vec![PricePoint::new(d(2024, 1, 2), 100.0)]).unwrap();
        let result = LabeledHistory::assemble(schema(1), &series, vec![], vec![None]);
        assert!(result.is_err());
    }

    #[test]
    fn test_history_rejects_width_mismatch() {
        let rows = vec![LabeledRow {
            date: d(2024, 1, 2),
            close: 100.0,
            features: Some(vec![1.0]),
            label: None,
        }];
        assert!(matches!(
            LabeledHistory::new(schema(2), rows),
            Err(ForesightError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_visible_until_and_position() {
        let rows = (2..=5)
            .map(|day| LabeledRow {
                date: d(2024, 1, day),
                close: 100.0,
                features: Some(vec![0.0]),
                label: None,
            })
            .collect();
        let history = LabeledHistory::new(schema(1), rows).unwrap();

        assert_eq!(history.visible_until(d(2024, 1, 3)).len(), 2);
        assert_eq!(history.visible_until(d(2024, 1, 1)).len(), 0);
        assert_eq!(history.visible_until(d(2024, 2, 1)).len(), 4);
        assert_eq!(history.position(d(2024, 1, 4)), Some(2));
        assert_eq!(history.position(d(2024, 1, 6)), None);
    }
}
