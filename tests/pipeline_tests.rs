mod common;

use common::{series, TreeBuilder};
use scout_baseline::error::BaselineError;
use scout_baseline::fetch::{SeriesSource, SnapshotSource};
use scout_baseline::pipeline::{self, ComparisonObserver};
use scout_baseline::reconcile::Outcome;
use scout_baseline::series::YearSeries;
use scout_baseline::taxonomy::{BuildingClass, EndUse, FilterKey, Fuel};
use std::cell::RefCell;

#[derive(Default)]
struct Recorder {
    seen: Vec<(FilterKey, String, &'static str)>,
}

impl ComparisonObserver for Recorder {
    fn on_outcome(&mut self, key: &FilterKey, series_id: &str, outcome: &Outcome) {
        let kind = match outcome {
            Outcome::Compared(_) => "compared",
            Outcome::Skipped(_) => "skipped",
            Outcome::Undefined(_) => "undefined",
        };
        self.seen.push((*key, series_id.to_string(), kind));
    }
}

/// Records which series were requested and for which year.
struct CountingSource {
    inner: SnapshotSource,
    requests: RefCell<Vec<(String, String)>>,
}

impl SeriesSource for CountingSource {
    fn fetch_series(&self, series_id: &str, year: &str) -> YearSeries {
        self.requests
            .borrow_mut()
            .push((series_id.to_string(), year.to_string()));
        self.inner.fetch_series(series_id, year)
    }
}

#[test]
fn test_end_to_end_against_snapshot() {
    let tree = common::lighting_tree();
    let key = FilterKey::new(BuildingClass::Residential, Fuel::Electricity, EndUse::Lighting);
    let source = SnapshotSource::new().with_series(key.series_id(), common::lighting_external());

    let mut recorder = Recorder::default();
    let state = pipeline::run(&tree, &source, "2025", &mut recorder).unwrap();

    assert_eq!(state.comparisons(), 1);
    assert_eq!(state.error_log().len(), 1);
    assert_eq!(state.error_log()[0].key, key);
    assert!(state.verdict(0.10).is_pass());
    assert!(!state.verdict(0.01).is_pass());

    let compared: Vec<_> = recorder
        .seen
        .iter()
        .filter(|(_, _, kind)| *kind == "compared")
        .collect();
    assert_eq!(compared.len(), 1);
    assert_eq!(compared[0].1, "cnsm_NA_resd_lghtng_elc_NA_usa_qbtu");
}

#[test]
fn test_every_combination_is_visited_in_order() {
    let tree = common::lighting_tree();
    let source = CountingSource {
        inner: SnapshotSource::new(),
        requests: RefCell::new(Vec::new()),
    };

    let mut recorder = Recorder::default();
    let state = pipeline::run(&tree, &source, "2024", &mut recorder).unwrap();

    let expected: Vec<FilterKey> = FilterKey::all().collect();
    let visited: Vec<FilterKey> = recorder.seen.iter().map(|(k, _, _)| *k).collect();
    assert_eq!(visited.len(), 144);
    assert_eq!(visited, expected);

    let requests = source.requests.borrow();
    assert_eq!(requests.len(), 144);
    assert!(requests.iter().all(|(_, year)| year == "2024"));
    assert_eq!(requests[0].0, expected[0].series_id());

    // No external data anywhere: nothing compared, verdict passes.
    assert_eq!(state.comparisons(), 0);
    assert!(state.verdict(0.0).is_pass());
}

#[test]
fn test_taxonomy_gap_aborts_run() {
    let tree = TreeBuilder::new()
        .leaf(
            &["AIA_CZ1", "single family home", "electricity", "lighting"],
            &[("2020", 1.0)],
        )
        .build();

    let gap = FilterKey::new(BuildingClass::Residential, Fuel::NaturalGas, EndUse::Cooking);
    let source = SnapshotSource::new().with_series(gap.series_id(), series(&[("2020", 0.5)]));

    let mut recorder = Recorder::default();
    let err = pipeline::run(&tree, &source, "2025", &mut recorder).unwrap_err();

    match err {
        BaselineError::TaxonomyGap { key, series_id } => {
            assert_eq!(key, gap);
            assert_eq!(series_id, gap.series_id());
        }
        other => panic!("expected TaxonomyGap, got {:?}", other),
    }

    // Combinations after the gap are never reached.
    let last = recorder.seen.last().map(|(k, _, _)| *k);
    let position = FilterKey::all().position(|k| k == gap).unwrap();
    assert_eq!(recorder.seen.len(), position);
    assert_ne!(last, Some(gap));
}

#[test]
fn test_rollup_and_zero_division_through_pipeline() {
    let tree = TreeBuilder::new()
        .leaf(
            &["AIA_CZ1", "large office", "natural gas", "heating", "supply", "boiler"],
            &[("2020", 4.0e9), ("2021", 2.0e9)],
        )
        .leaf(
            &["AIA_CZ1", "large office", "natural gas", "water heating"],
            &[("2020", 1.0e9)],
        )
        .build();

    let heating = FilterKey::new(BuildingClass::Commercial, Fuel::NaturalGas, EndUse::Heating);
    let water = FilterKey::new(BuildingClass::Commercial, Fuel::NaturalGas, EndUse::WaterHeating);
    let source = SnapshotSource::new()
        .with_series(heating.series_id(), series(&[("2020", 4.0), ("2021", 0.0)]))
        .with_series(water.series_id(), series(&[("2020", 0.0)]));

    let state = pipeline::run(&tree, &source, "2025", &mut ()).unwrap();

    assert_eq!(state.comparisons(), 1);
    assert_eq!(state.worst_average_error(), Some(0.0));

    let totals = state
        .totals(BuildingClass::Commercial, Fuel::NaturalGas)
        .unwrap();
    assert_eq!(totals["2020"].internal, 4.0e9);
    assert_eq!(totals["2021"].external, 0.0);

    let summary = state.zero_division_summary();
    assert_eq!(summary.len(), 2);
    let contexts: Vec<String> = summary.keys().map(|g| g.context.to_string()).collect();
    assert!(contexts.contains(&"per-year".to_string()));
    assert!(contexts.contains(&"avg_pct_err".to_string()));
}
