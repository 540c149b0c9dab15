//! FRED API client implementation.

use std::{env, time::Duration};

use chrono::NaiveDate;
use foresight_traits::PriceSeries;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{
    Result,
    error::FredError,
    types::{ErrorResponse, Observation, ObservationsResponse, to_price_series},
};

/// Endpoint for series observations.
const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Series fetched when none is configured.
pub const DEFAULT_SERIES_ID: &str = "SP500";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after every failure.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt number `attempt` (1-based, so attempt 2 waits
    /// `initial_backoff`).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(2).min(16);
        self.initial_backoff * 2_u32.pow(exponent)
    }
}

/// Client for the Federal Reserve Economic Data observations API.
#[derive(Debug, Clone)]
pub struct FredClient {
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl FredClient {
    /// Create a new FRED client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a new FRED client from the `FRED_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns [`FredError::MissingApiKey`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("FRED_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(FredError::MissingApiKey)?;

        Self::new(api_key)
    }

    /// Replace the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the observations URL for a series and date range.
    fn url(&self, series_id: &str, start: NaiveDate, end: Option<NaiveDate>) -> String {
        let end_param = end
            .map(|e| format!("&observation_end={}", e.format("%Y-%m-%d")))
            .unwrap_or_default();
        format!(
            "{FRED_BASE_URL}?series_id={}&api_key={}&file_type=json&observation_start={}{}",
            series_id.to_uppercase(),
            self.api_key,
            start.format("%Y-%m-%d"),
            end_param
        )
    }

    /// Make a single GET request and return the body.
    async fn get_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error_message)
                .unwrap_or(text);
            return Err(FredError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }

    /// GET with retries on transient failures.
    async fn get(&self, series_id: &str, url: &str) -> Result<String> {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < attempts => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        series_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "FRED request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Get raw observations for a series.
    ///
    /// # Arguments
    ///
    /// * `series_id` - FRED series identifier (e.g., "SP500")
    /// * `start` - First observation date
    /// * `end` - Last observation date; latest available when `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries or the body is not
    /// a valid observations response.
    pub async fn observations(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let url = self.url(series_id, start, end);
        debug!(series_id, %start, ?end, "fetching FRED observations");
        let body = self.get(series_id, &url).await?;
        let response: ObservationsResponse = serde_json::from_str(&body)?;
        Ok(response.observations)
    }

    /// Get a validated daily close series.
    ///
    /// # Errors
    ///
    /// Returns [`FredError::EmptyResult`] when no usable observation remains
    /// after dropping missing values and weekends.
    pub async fn price_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries> {
        let observations = self.observations(series_id, start, end).await?;
        let series = to_price_series(&observations);
        if series.is_empty() {
            return Err(FredError::EmptyResult(series_id.to_uppercase()));
        }
        info!(
            series_id,
            raw = observations.len(),
            kept = series.len(),
            first = ?series.first_date(),
            last = ?series.last_date(),
            "loaded FRED series"
        );
        Ok(series)
    }
}
