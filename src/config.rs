use crate::error::{BaselineError, BlResult};
use crate::fetch::eia::{DEFAULT_BASE_URL, DEFAULT_REQUEST_DELAY};
use chrono::Datelike;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

pub const ENV_API_KEY: &str = "EIA_API_KEY";
pub const ENV_MAX_ERR: &str = "AEO_MAX_ERR";
pub const ENV_MSEG_PATH: &str = "SCOUT_MSEG_PATH";
pub const ENV_API_URL: &str = "EIA_API_URL";
pub const ENV_REQUEST_DELAY_MS: &str = "EIA_REQUEST_DELAY_MS";

pub const DEFAULT_MSEG_PATH: &str = "scout/supporting_data/stock_energy_tech_data/mseg_res_com_cz.json";

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// AEO reference year (YYYY) to query, for example 2025.
    #[arg(long, default_value_t = current_year(), value_parser = parse_year)]
    pub year: String,

    /// Print extra diagnostic information while running.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

pub fn current_year() -> String {
    chrono::Local::now().year().to_string()
}

pub fn parse_year(raw: &str) -> Result<String, String> {
    let year = raw.trim();
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        Ok(year.to_string())
    } else {
        Err(format!("'{}' is not a four-digit year", raw))
    }
}

/// Settings taken from the environment rather than the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    /// Largest acceptable average error (fraction) before the run fails.
    pub max_allowed_err: f64,
    pub mseg_path: PathBuf,
    pub api_base: String,
    pub request_delay: Duration,
}

impl Settings {
    /// Reads the process environment after loading a `.env` file from the
    /// working directory or one of its parents. Variables already set in the
    /// environment win over the file.
    pub fn from_env() -> BlResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded settings from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any name-to-value lookup. The API key is checked
    /// first so a missing credential is reported before anything else.
    pub fn from_lookup<F>(lookup: F) -> BlResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(BaselineError::MissingCredential)?;

        let max_allowed_err = parse_tolerance(lookup(ENV_MAX_ERR).as_deref())?;

        let mseg_path = lookup(ENV_MSEG_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MSEG_PATH));

        let api_base = lookup(ENV_API_URL)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_delay = match lookup(ENV_REQUEST_DELAY_MS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| {
                    BaselineError::Config(format!(
                        "{} must be a whole number of milliseconds, got '{}'",
                        ENV_REQUEST_DELAY_MS, raw
                    ))
                })?,
            None => DEFAULT_REQUEST_DELAY,
        };

        Ok(Self {
            api_key,
            max_allowed_err,
            mseg_path,
            api_base,
            request_delay,
        })
    }
}

pub fn parse_tolerance(raw: Option<&str>) -> BlResult<f64> {
    let invalid = || {
        BaselineError::Config(format!(
            "{} is not set or invalid. Provide a numeric fraction, e.g. 0.0674.",
            ENV_MAX_ERR
        ))
    };

    let value: f64 = raw
        .map(str::trim)
        .ok_or_else(invalid)?
        .parse()
        .map_err(|_| invalid())?;

    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid())
    }
}
