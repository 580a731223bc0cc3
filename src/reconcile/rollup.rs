use super::{ComparisonRecord, DivisionContext, Outcome, ZeroDivisionIncident};
use crate::taxonomy::{BuildingClass, FilterKey, Fuel};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollupCell {
    pub internal: f64,
    pub external: f64,
}

impl RollupCell {
    /// Relative difference; 0 when the external total is 0.
    pub fn pct_delta(&self) -> f64 {
        if self.external == 0.0 {
            0.0
        } else {
            (self.internal - self.external).abs() / self.external
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub key: FilterKey,
    pub series_id: String,
    pub avg_pct_error: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZeroDivisionGroup {
    pub key: FilterKey,
    pub series_id: String,
    pub context: DivisionContext,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Pass { worst: f64 },
    Fail { worst: f64, tolerance: f64 },
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }

    pub fn worst(&self) -> f64 {
        match self {
            Verdict::Pass { worst } | Verdict::Fail { worst, .. } => *worst,
        }
    }
}

/// Everything the final report needs, accumulated one outcome at a time.
#[derive(Debug, Clone, Default)]
pub struct RollupState {
    totals: BTreeMap<(BuildingClass, Fuel), BTreeMap<String, RollupCell>>,
    error_log: Vec<ErrorRecord>,
    zero_divisions: Vec<ZeroDivisionIncident>,
    compared: usize,
    worst: Option<f64>,
}

impl RollupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Compared(record) => self.absorb_record(record),
            Outcome::Undefined(incident) => self.zero_divisions.push(incident.clone()),
            Outcome::Skipped(_) => {}
        }
    }

    fn absorb_record(&mut self, record: &ComparisonRecord) {
        let years = self
            .totals
            .entry((record.key.class, record.key.fuel))
            .or_default();
        for row in &record.rows {
            let cell = years.entry(row.year.clone()).or_default();
            cell.internal += row.internal;
            cell.external += row.external;
        }

        for year in record.zero_years() {
            self.zero_divisions.push(ZeroDivisionIncident {
                key: record.key,
                series_id: record.series_id.clone(),
                context: DivisionContext::PerYear,
                years: vec![year.to_string()],
            });
        }

        if record.exceeds_threshold() {
            self.error_log.push(ErrorRecord {
                key: record.key,
                series_id: record.series_id.clone(),
                avg_pct_error: record.avg_pct_error,
            });
        }

        self.compared += 1;
        self.worst = Some(
            self.worst
                .map_or(record.avg_pct_error, |w| w.max(record.avg_pct_error)),
        );
    }

    /// Folds another state into this one, as if its outcomes had been
    /// absorbed here after ours.
    pub fn merge(&mut self, other: RollupState) {
        for (slice, years) in other.totals {
            let mine = self.totals.entry(slice).or_default();
            for (year, cell) in years {
                let target = mine.entry(year).or_default();
                target.internal += cell.internal;
                target.external += cell.external;
            }
        }
        self.error_log.extend(other.error_log);
        self.zero_divisions.extend(other.zero_divisions);
        self.compared += other.compared;
        self.worst = match (self.worst, other.worst) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    /// Year-sorted totals for one slice, if anything was compared in it.
    pub fn totals(&self, class: BuildingClass, fuel: Fuel) -> Option<&BTreeMap<String, RollupCell>> {
        self.totals.get(&(class, fuel))
    }

    pub fn error_log(&self) -> &[ErrorRecord] {
        &self.error_log
    }

    pub fn zero_divisions(&self) -> &[ZeroDivisionIncident] {
        &self.zero_divisions
    }

    pub fn comparisons(&self) -> usize {
        self.compared
    }

    pub fn worst_average_error(&self) -> Option<f64> {
        self.worst
    }

    /// Incidents grouped by combination, series and context, with the
    /// affected years merged.
    pub fn zero_division_summary(&self) -> BTreeMap<ZeroDivisionGroup, BTreeSet<String>> {
        let mut merged: BTreeMap<ZeroDivisionGroup, BTreeSet<String>> = BTreeMap::new();
        for incident in &self.zero_divisions {
            let group = ZeroDivisionGroup {
                key: incident.key,
                series_id: incident.series_id.clone(),
                context: incident.context,
            };
            merged
                .entry(group)
                .or_default()
                .extend(incident.years.iter().cloned());
        }
        merged
    }

    /// Fails when the worst average error of any comparison is above `tolerance`.
    pub fn verdict(&self, tolerance: f64) -> Verdict {
        let worst = self.worst.unwrap_or(0.0);
        if worst > tolerance {
            Verdict::Fail { worst, tolerance }
        } else {
            Verdict::Pass { worst }
        }
    }
}
