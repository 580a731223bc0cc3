pub mod eia;

pub use self::eia::EiaClient;

use crate::series::YearSeries;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Anything that can produce the external series for a series id.
///
/// An empty series means "no external data"; implementations never fail
/// the run.
pub trait SeriesSource {
    fn fetch_series(&self, series_id: &str, year: &str) -> YearSeries;
}

impl<T: SeriesSource + ?Sized> SeriesSource for &T {
    fn fetch_series(&self, series_id: &str, year: &str) -> YearSeries {
        (**self).fetch_series(series_id, year)
    }
}

/// Fixed series keyed by id, independent of the reference year.
///
/// Lets a run be replayed against previously fetched data.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    series: HashMap<String, YearSeries>,
}

impl SnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series_id: impl Into<String>, series: YearSeries) -> Self {
        self.series.insert(series_id.into(), series);
        self
    }

    pub fn insert(&mut self, series_id: impl Into<String>, series: YearSeries) {
        self.series.insert(series_id.into(), series);
    }
}

impl SeriesSource for SnapshotSource {
    fn fetch_series(&self, series_id: &str, _year: &str) -> YearSeries {
        self.series.get(series_id).cloned().unwrap_or_default()
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Rate limiting, server errors, network trouble and garbled bodies are
    /// worth another attempt; other client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Malformed(_) => true,
            FetchError::Status(code) => *code == 429 || *code >= 500,
        }
    }
}

/// Exponential backoff with optional full jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
    pub max_backoff: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
            max_backoff: Duration::from_secs(60),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Upper bound of the wait before retry number `retry` (0-based).
    pub fn backoff_ceiling(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(self.multiplier.saturating_pow(retry))
            .min(self.max_backoff)
    }

    pub fn backoff(&self, retry: u32) -> Duration {
        let ceiling = self.backoff_ceiling(retry);
        if self.jitter {
            ceiling.mul_f64(fastrand::f64())
        } else {
            ceiling
        }
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. Returns the last error in the latter cases.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let wait = self.backoff(attempt - 1);
                    warn!(
                        "retry {}/{} for {} in {:.1}s ({})",
                        attempt,
                        self.max_attempts - 1,
                        label,
                        wait.as_secs_f64(),
                        e
                    );
                    thread::sleep(wait);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::ZERO,
            jitter: false,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            jitter: false,
            max_backoff: Duration::from_secs(5),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(5));
    }

    #[test]
    fn jitter_stays_under_ceiling() {
        let policy = RetryPolicy::default();
        for retry in 0..4 {
            assert!(policy.backoff(retry) <= policy.backoff_ceiling(retry));
        }
    }

    #[test]
    fn retries_until_success() {
        let calls = Cell::new(0);
        let result = instant_policy(5).run("test", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(FetchError::Status(503))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn gives_up_after_budget() {
        let calls = Cell::new(0);
        let result: Result<(), _> = instant_policy(4).run("test", || {
            calls.set(calls.get() + 1);
            Err(FetchError::Malformed("no data".into()))
        });
        assert!(matches!(result, Err(FetchError::Malformed(_))));
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = instant_policy(5).run("test", || {
            calls.set(calls.get() + 1);
            Err(FetchError::Status(403))
        });
        assert!(matches!(result, Err(FetchError::Status(403))));
        assert_eq!(calls.get(), 1);
    }
}
