//! Client for the EIA Annual Energy Outlook API (v2).

use super::{FetchError, RetryPolicy, SeriesSource};
use crate::config::Settings;
use crate::error::BlResult;
use crate::series::YearSeries;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.eia.gov/v2/aeo";
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("scout-baseline/", env!("CARGO_PKG_VERSION"));

pub struct EiaClient {
    http: Client,
    api_key: String,
    base_url: String,
    request_delay: Duration,
    retry: RetryPolicy,
}

impl EiaClient {
    pub fn new(api_key: impl Into<String>) -> BlResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> BlResult<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_settings(settings: &Settings) -> BlResult<Self> {
        Ok(Self::with_base_url(&settings.api_key, &settings.api_base)?
            .with_request_delay(settings.request_delay))
    }

    /// Pause before every request, including retries.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn series_url(&self, series_id: &str, year: &str) -> String {
        format!(
            "{base}/{year}/data/\
             ?frequency=annual\
             &data[0]=value\
             &facets[scenario][]=ref{year}\
             &facets[seriesId][]={series_id}\
             &sort[0][column]=period&sort[0][direction]=desc\
             &offset=0&length=5000\
             &api_key={key}",
            base = self.base_url,
            year = year,
            series_id = series_id,
            key = self.api_key,
        )
    }

    fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            url.to_string()
        } else {
            url.replace(&self.api_key, "<API_KEY>")
        }
    }

    /// One request, no retry.
    pub fn fetch_once(&self, series_id: &str, year: &str) -> Result<YearSeries, FetchError> {
        let url = self.series_url(series_id, year);
        debug!("[API] GET {}", self.redact(&url));

        if !self.request_delay.is_zero() {
            thread::sleep(self.request_delay);
        }

        let resp = self.http.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text()?;
        parse_series_response(&body)
    }
}

impl SeriesSource for EiaClient {
    fn fetch_series(&self, series_id: &str, year: &str) -> YearSeries {
        match self.retry.run(series_id, || self.fetch_once(series_id, year)) {
            Ok(series) => series,
            Err(e) => {
                warn!("[API] No usable data for {}: {}", series_id, e);
                YearSeries::new()
            }
        }
    }
}

// --- Response Shape ---

#[derive(Deserialize)]
struct Envelope {
    response: ResponseBody,
}

#[derive(Deserialize)]
struct ResponseBody {
    data: Vec<DataPoint>,
}

#[derive(Deserialize)]
struct DataPoint {
    period: Scalar,
    value: Option<Scalar>,
}

/// EIA sends numbers as JSON strings ("0.123") but not consistently.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Extracts `{period: value}` from an AEO data response, in the API's units.
/// A period listed more than once keeps its last value.
pub fn parse_series_response(body: &str) -> Result<YearSeries, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("missing response.data ({})", e)))?;

    let mut series = YearSeries::new();
    for point in envelope.response.data {
        let period = point.period.as_text();
        let value = point
            .value
            .as_ref()
            .and_then(Scalar::as_f64)
            .ok_or_else(|| FetchError::Malformed(format!("no numeric value for {}", period)))?;
        if let Some(previous) = series.insert(period.clone(), value) {
            debug!(
                "[API] Period {} listed twice ({} then {}); keeping the last.",
                period, previous, value
            );
        }
    }
    Ok(series)
}
