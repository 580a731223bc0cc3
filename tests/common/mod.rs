#![allow(dead_code)] // Each test binary uses a different subset of these helpers.

use scout_baseline::segment::SegmentNode;
use scout_baseline::series::YearSeries;
use serde_json::{json, Map, Value};

/// Builds microsegment documents leaf by leaf.
///
/// `path` is climate zone / building type / fuel / end use [/ sub keys...];
/// the `energy` table is added below it.
#[derive(Default)]
pub struct TreeBuilder {
    root: Map<String, Value>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(mut self, path: &[&str], years: &[(&str, f64)]) -> Self {
        self.add_leaf(path, years);
        self
    }

    pub fn add_leaf(&mut self, path: &[&str], years: &[(&str, f64)]) {
        let mut node = &mut self.root;
        for segment in path {
            node = node
                .entry(segment.to_string())
                .or_insert_with(|| json!({}))
                .as_object_mut()
                .expect("path segment is not a branch");
        }

        // Sibling metrics the aggregation has to step over.
        node.entry("stock".to_string())
            .or_insert_with(|| json!({"2020": 1.0}));

        let energy = node
            .entry("energy".to_string())
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .expect("energy is not a branch");
        for (year, value) in years {
            let current = energy.get(*year).and_then(Value::as_f64).unwrap_or(0.0);
            energy.insert(year.to_string(), json!(current + value));
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.root).unwrap()
    }

    pub fn build(self) -> SegmentNode {
        SegmentNode::from(Value::Object(self.root))
    }
}

pub fn series(pairs: &[(&str, f64)]) -> YearSeries {
    pairs.iter().copied().collect()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// The single-leaf tree used by the end-to-end scenario.
pub fn lighting_tree() -> SegmentNode {
    TreeBuilder::new()
        .leaf(
            &["AIA_CZ1", "single family home", "electricity", "lighting"],
            &[("2020", 100.0), ("2025", 120.0)],
        )
        .build()
}

/// External lighting series as the API reports it (quads).
pub fn lighting_external() -> YearSeries {
    series(&[("2020", 0.00000009), ("2025", 0.00000012)])
}
