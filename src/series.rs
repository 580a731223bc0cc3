use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Year ("2025") to value, ordered by year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearSeries(BTreeMap<String, f64>);

impl YearSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, year: &str) -> Option<f64> {
        self.0.get(year).copied()
    }

    /// Adds `value` onto whatever is already recorded for `year`.
    /// Sets the value for `year`, replacing any previous one.
    pub fn insert(&mut self, year: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(year.into(), value)
    }

    pub fn accumulate(&mut self, year: &str, value: f64) {
        match self.0.get_mut(year) {
            Some(total) => *total += value,
            None => {
                self.0.insert(year.to_string(), value);
            }
        }
    }

    pub fn merge(&mut self, other: &YearSeries) {
        for (year, value) in other.iter() {
            self.accumulate(year, value);
        }
    }

    pub fn scaled(&self, factor: f64) -> YearSeries {
        self.0
            .iter()
            .map(|(year, value)| (year.clone(), value * factor))
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(year, value)| (year.as_str(), *value))
    }

    /// Inner join on year: only years present in both series, in year order.
    pub fn join<'a>(&'a self, other: &'a YearSeries) -> impl Iterator<Item = (&'a str, f64, f64)> {
        self.0.iter().filter_map(move |(year, left)| {
            other.0.get(year).map(|right| (year.as_str(), *left, *right))
        })
    }
}

impl FromIterator<(String, f64)> for YearSeries {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut series = YearSeries::new();
        for (year, value) in iter {
            series.accumulate(&year, value);
        }
        series
    }
}

impl<'a> FromIterator<(&'a str, f64)> for YearSeries {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut series = YearSeries::new();
        for (year, value) in iter {
            series.accumulate(year, value);
        }
        series
    }
}

impl IntoIterator for YearSeries {
    type Item = (String, f64);
    type IntoIter = btree_map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
