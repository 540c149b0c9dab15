//! Assembly of the labeled history from a price series.

use foresight_traits::{FeatureBuilder, LabeledHistory, Labeler, PriceSeries, Result};
use tracing::debug;

/// Builds features and labels for `series` and joins them date by date.
///
/// Rows with any missing feature value keep no features and no label, so the
/// engine never trains on or scores them.
///
/// # Errors
///
/// Returns an error if the builder fails or its rows do not match its schema.
pub fn prepare_history(
    series: &PriceSeries,
    builder: &dyn FeatureBuilder,
    labeler: &dyn Labeler,
) -> Result<LabeledHistory> {
    let features = builder.build(series)?;
    let labels = labeler.label(series);
    let history = LabeledHistory::assemble(builder.schema().clone(), series, features, labels)?;

    let with_features = history.rows().iter().filter(|r| r.has_features()).count();
    let trainable = history.rows().iter().filter(|r| r.is_trainable()).count();
    debug!(
        schema = %builder.schema().name,
        version = builder.schema().version,
        rows = history.len(),
        with_features,
        trainable,
        "history prepared"
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};
    use foresight_features::{FixedBand, TrendFeatures};
    use foresight_traits::{Date, PricePoint};

    fn rising(n: usize) -> PriceSeries {
        let mut date = Date::from_ymd_opt(2020, 1, 6).unwrap();
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            points.push(PricePoint::new(date, 100.0 * 1.002_f64.powi(i as i32)));
            date = date.succ_opt().unwrap();
            while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                date = date.succ_opt().unwrap();
            }
        }
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn test_prepare_history_masks_warmup_and_tail() {
        let series = rising(1000);
        let features = TrendFeatures::default();
        let labeler = FixedBand::default();
        let history = prepare_history(&series, &features, &labeler).unwrap();

        assert_eq!(history.len(), 1000);
        assert_eq!(history.schema().len(), 13);

        let warmup = features.warmup();
        assert!(history.rows()[..warmup].iter().all(|r| r.features.is_none()));
        assert!(history.rows()[..warmup].iter().all(|r| r.label.is_none()));
        assert!(history.rows()[warmup].has_features());

        // the label horizon runs past the end for the last 70 rows
        assert!(history.rows()[930..].iter().all(|r| r.label.is_none()));
        // +0.2% a day reaches +10% within 70 days without any drawdown
        assert!(history.rows()[warmup..930].iter().all(|r| r.is_trainable()));
    }
}
