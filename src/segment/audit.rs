//! Checks the end-use decision table against a concrete microsegments tree.
//!
//! For every (building class, fuel) slice, each `energy` leaf should be
//! claimed by exactly one end use. Leaves claimed by none are dropped from
//! every comparison (gaps); leaves claimed by several are counted more than
//! once across the end-use partition (overlaps).

use super::{accepting_rule, energy_values, for_each_energy_leaf, SegmentNode};
use crate::taxonomy::{BuildingClass, EndUse, Fuel};
use rayon::prelude::*;
use strum::IntoEnumIterator;

#[derive(Debug, Clone, PartialEq)]
pub struct LeafFinding {
    pub path: String,
    pub energy: f64,
    pub end_uses: Vec<EndUse>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceAudit {
    pub class: BuildingClass,
    pub fuel: Fuel,
    /// Energy of every leaf in the slice, all years.
    pub unfiltered: f64,
    /// Energy summed over all end uses, counting each claim.
    pub partitioned: f64,
    pub gaps: Vec<LeafFinding>,
    pub overlaps: Vec<LeafFinding>,
}

impl SliceAudit {
    pub fn gap_total(&self) -> f64 {
        self.gaps.iter().map(|f| f.energy).sum()
    }

    /// Energy counted beyond the first claim of each overlapping leaf.
    pub fn overlap_excess(&self) -> f64 {
        self.overlaps
            .iter()
            .map(|f| f.energy * (f.end_uses.len() as f64 - 1.0))
            .sum()
    }

    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty() && self.overlaps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaxonomyAudit {
    pub slices: Vec<SliceAudit>,
}

impl TaxonomyAudit {
    pub fn slice(&self, class: BuildingClass, fuel: Fuel) -> Option<&SliceAudit> {
        self.slices
            .iter()
            .find(|s| s.class == class && s.fuel == fuel)
    }

    pub fn gap_count(&self) -> usize {
        self.slices.iter().map(|s| s.gaps.len()).sum()
    }

    pub fn overlap_count(&self) -> usize {
        self.slices.iter().map(|s| s.overlaps.len()).sum()
    }
}

/// Audits every (class, fuel) slice. Slices are independent read-only walks
/// and run in parallel.
pub fn audit(tree: &SegmentNode) -> TaxonomyAudit {
    let pairs: Vec<(BuildingClass, Fuel)> = BuildingClass::iter()
        .flat_map(|class| Fuel::iter().map(move |fuel| (class, fuel)))
        .collect();

    let slices = pairs
        .par_iter()
        .map(|&(class, fuel)| audit_slice(tree, class, fuel))
        .collect();

    TaxonomyAudit { slices }
}

pub fn audit_slice(tree: &SegmentNode, class: BuildingClass, fuel: Fuel) -> SliceAudit {
    let mut report = SliceAudit {
        class,
        fuel,
        unfiltered: 0.0,
        partitioned: 0.0,
        gaps: Vec::new(),
        overlaps: Vec::new(),
    };

    for_each_energy_leaf(tree, &mut |leaf, years| {
        if !class.owns_subtype(leaf.building_type) || leaf.fuel != fuel.as_ref() {
            return;
        }

        let energy: f64 = energy_values(years).map(|(_, v)| v).sum();
        let end_uses: Vec<EndUse> = EndUse::iter()
            .filter(|&eu| accepting_rule(leaf, fuel, eu).is_some())
            .collect();

        report.unfiltered += energy;
        report.partitioned += energy * end_uses.len() as f64;

        match end_uses.len() {
            1 => {}
            0 => report.gaps.push(LeafFinding {
                path: leaf.to_string(),
                energy,
                end_uses,
            }),
            _ => report.overlaps.push(LeafFinding {
                path: leaf.to_string(),
                energy,
                end_uses,
            }),
        }
    });

    report
}
