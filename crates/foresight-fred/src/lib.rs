//! FRED (Federal Reserve Economic Data) client for Foresight.
//!
//! This crate fetches daily index closes from the
//! [FRED](https://fred.stlouisfed.org/) `series/observations` endpoint and turns
//! them into a validated [`foresight_traits::PriceSeries`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use chrono::NaiveDate;
//! use foresight_fred::{DEFAULT_SERIES_ID, FredClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FredClient::from_env()?;
//!     let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
//!     let series = client.price_series(DEFAULT_SERIES_ID, start, None).await?;
//!     println!("{} closes", series.len());
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FRED_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FRED_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod types;

pub use client::{DEFAULT_SERIES_ID, FredClient, RetryPolicy};
pub use error::FredError;
pub use types::{MISSING_VALUE, Observation, ObservationsResponse, to_price_series};

/// Result type for FRED operations.
pub type Result<T> = std::result::Result<T, FredError>;
