//! Data loading utilities for the Foresight CLI.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use foresight::fred::FredClient;
use foresight::{PriceSeries, ResearchConfig, read_prices_csv};
use tracing::info;

use crate::SourceArgs;

/// Default first observation date for FRED downloads.
pub(crate) const DEFAULT_START: &str = "2000-01-01";

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("invalid date {date_str:?}, expected YYYY-MM-DD"))
}

/// Load the configuration file, or defaults when none is given.
pub(crate) fn load_config(source: &SourceArgs) -> Result<ResearchConfig> {
    match &source.config {
        Some(path) => ResearchConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(ResearchConfig::default()),
    }
}

/// Load the price series from CSV or FRED.
pub(crate) async fn load_prices(source: &SourceArgs) -> Result<PriceSeries> {
    let series = if let Some(path) = &source.prices {
        read_prices_csv(path).with_context(|| format!("failed to read {}", path.display()))?
    } else {
        let start = parse_date(&source.start)?;
        let end = source.end.as_deref().map(parse_date).transpose()?;
        if end.is_some_and(|end| end < start) {
            bail!("end date precedes start date");
        }
        let client = FredClient::from_env()?;
        client.price_series(&source.series, start, end).await?
    };

    if series.is_empty() {
        bail!("no usable prices");
    }
    info!(
        rows = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "prices loaded"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::io::Write;

    fn source() -> SourceArgs {
        SourceArgs {
            series: "SP500".to_string(),
            start: DEFAULT_START.to_string(),
            end: None,
            prices: None,
            config: None,
        }
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("invalid").is_err());
        assert!(parse_date(DEFAULT_START).is_ok());
    }

    #[test]
    fn test_default_config_without_file() {
        let config = load_config(&source()).unwrap();
        assert_eq!(config.engine.retrain_interval_days, 30);
    }

    #[test]
    fn test_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"engine": {{"retrain_interval_days": 5}}}}"#).unwrap();
        let args = SourceArgs {
            config: Some(file.path().to_path_buf()),
            ..source()
        };
        assert_eq!(load_config(&args).unwrap().engine.retrain_interval_days, 5);
    }

    #[tokio::test]
    async fn test_load_prices_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,close\n2024-01-02,100.0\n2024-01-03,.\n2024-01-04,101.0").unwrap();
        let args = SourceArgs {
            prices: Some(file.path().to_path_buf()),
            ..source()
        };
        let series = load_prices(&args).await.unwrap();
        assert_eq!(series.len(), 2);
    }
}
