//! Tabular import and export.
//!
//! Signal logs and equity curves become polars DataFrames and are written as
//! CSV; price series are read back from CSV files with `date` and `close`
//! columns.

use std::fs::File;
use std::path::Path;

use chrono::Datelike;
use foresight_eval::EquityPoint;
use foresight_traits::{CE_TO_UNIX_EPOCH_DAYS, Date, PriceSeries, Result, SignalLog};
use polars::prelude::*;

fn date_series(name: &str, dates: impl Iterator<Item = Date>) -> Result<Series> {
    let days: Vec<i32> = dates
        .map(|d| d.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS)
        .collect();
    Ok(Series::new(name.into(), days).cast(&DataType::Date)?)
}

/// Signal log as a DataFrame.
///
/// Columns: `date, close, signal, outcome, proba_buy, proba_hold, threshold,
/// model_trained_on`, one row per signal in date order.
///
/// # Errors
///
/// Returns an error if a column cannot be built.
pub fn signals_frame(log: &SignalLog) -> Result<DataFrame> {
    let signals = log.signals();
    let columns = vec![
        date_series("date", signals.iter().map(|s| s.date))?.into_column(),
        Series::new(
            "close".into(),
            signals.iter().map(|s| s.close).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "signal".into(),
            signals.iter().map(|s| s.action().as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "outcome".into(),
            signals.iter().map(|s| s.outcome.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "proba_buy".into(),
            signals.iter().map(|s| s.probability).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "proba_hold".into(),
            signals.iter().map(|s| 1.0 - s.probability).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "threshold".into(),
            signals.iter().map(|s| s.threshold).collect::<Vec<_>>(),
        )
        .into_column(),
        date_series("model_trained_on", signals.iter().map(|s| s.model_trained_on))?
            .into_column(),
    ];
    Ok(DataFrame::new(columns)?)
}

/// Equity curve as a DataFrame with columns `date, cash, units, equity`.
///
/// # Errors
///
/// Returns an error if a column cannot be built.
pub fn equity_frame(curve: &[EquityPoint]) -> Result<DataFrame> {
    let columns = vec![
        date_series("date", curve.iter().map(|p| p.date))?.into_column(),
        Series::new(
            "cash".into(),
            curve.iter().map(|p| p.cash).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "units".into(),
            curve.iter().map(|p| p.units).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            "equity".into(),
            curve.iter().map(|p| p.equity).collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    Ok(DataFrame::new(columns)?)
}

/// Writes a DataFrame as CSV with a header row.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Reads a price series from a CSV file with `date` and `close` columns.
///
/// Dates are `YYYY-MM-DD`. Unparseable or missing rows, weekends and
/// non-positive closes are dropped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks either column.
pub fn read_prices_csv(path: impl AsRef<Path>) -> Result<PriceSeries> {
    let df = LazyCsvReader::new(path.as_ref())
        .with_has_header(true)
        .finish()?
        .collect()?;
    PriceSeries::from_frame(&df)
}
