pub mod rollup;

pub use self::rollup::{ErrorRecord, RollupCell, RollupState, Verdict, ZeroDivisionGroup};

use crate::error::{BaselineError, BlResult};
use crate::series::YearSeries;
use crate::taxonomy::FilterKey;
use strum_macros::Display;

/// AEO consumption series are published in quadrillion Btu.
pub const EIA_UNIT_MULTIPLIER: f64 = 1e9;

/// Average error above which a combination is listed in the error log.
pub const ERROR_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct YearComparison {
    pub year: String,
    pub internal: f64,
    pub external: f64,
    /// `None` when the external value is zero.
    pub pct_error: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRecord {
    pub key: FilterKey,
    pub series_id: String,
    pub rows: Vec<YearComparison>,
    pub avg_pct_error: f64,
}

impl ComparisonRecord {
    pub fn exceeds_threshold(&self) -> bool {
        self.avg_pct_error > ERROR_THRESHOLD
    }

    /// Joined years whose external value was zero.
    pub fn zero_years(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter(|row| row.pct_error.is_none())
            .map(|row| row.year.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[strum(serialize = "no internal data")]
    NoInternalData,
    #[strum(serialize = "no external data")]
    NoExternalData,
    #[strum(serialize = "no overlapping years")]
    NoOverlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum DivisionContext {
    #[strum(serialize = "per-year")]
    PerYear,
    #[strum(serialize = "avg_pct_err")]
    Average,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZeroDivisionIncident {
    pub key: FilterKey,
    pub series_id: String,
    pub context: DivisionContext,
    pub years: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Compared(ComparisonRecord),
    Skipped(SkipReason),
    /// Every joined year had a zero external value, so no average exists.
    Undefined(ZeroDivisionIncident),
}

/// Percent error of `internal` against `external`, `None` when `external` is 0.
pub fn pct_error(internal: f64, external: f64) -> Option<f64> {
    if external == 0.0 {
        None
    } else {
        Some((internal - external).abs() / external)
    }
}

/// Compares one combination's aggregated series with the external series
/// (still in API units).
///
/// Pure: the caller folds the returned outcome into a [`RollupState`].
/// External data without any internal counterpart means the decision table
/// misses something the API covers and is returned as an error.
pub fn reconcile(
    key: FilterKey,
    series_id: &str,
    internal: &YearSeries,
    external: &YearSeries,
) -> BlResult<Outcome> {
    if internal.is_empty() {
        if !external.is_empty() {
            return Err(BaselineError::TaxonomyGap {
                key,
                series_id: series_id.to_string(),
            });
        }
        return Ok(Outcome::Skipped(SkipReason::NoInternalData));
    }
    if external.is_empty() {
        return Ok(Outcome::Skipped(SkipReason::NoExternalData));
    }

    let external = external.scaled(EIA_UNIT_MULTIPLIER);
    let rows: Vec<YearComparison> = internal
        .join(&external)
        .map(|(year, i, e)| YearComparison {
            year: year.to_string(),
            internal: i,
            external: e,
            pct_error: pct_error(i, e),
        })
        .collect();

    if rows.is_empty() {
        return Ok(Outcome::Skipped(SkipReason::NoOverlap));
    }

    let defined: Vec<f64> = rows.iter().filter_map(|r| r.pct_error).collect();
    if defined.is_empty() {
        return Ok(Outcome::Undefined(ZeroDivisionIncident {
            key,
            series_id: series_id.to_string(),
            context: DivisionContext::Average,
            years: rows.into_iter().map(|r| r.year).collect(),
        }));
    }

    let avg_pct_error = defined.iter().sum::<f64>() / defined.len() as f64;

    Ok(Outcome::Compared(ComparisonRecord {
        key,
        series_id: series_id.to_string(),
        rows,
        avg_pct_error,
    }))
}
