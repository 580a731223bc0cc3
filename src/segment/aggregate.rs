use super::{energy_values, for_each_energy_leaf, LeafPath, SegmentNode};
use crate::series::YearSeries;
use crate::taxonomy::{
    BuildingClass, EndUse, FilterKey, Fuel, HEATING_END_USES, OTHER_END_USES, REMAINING_END_USES,
    SEPARATE_OTHER_END_USES,
};
use strum_macros::Display;

/// Why an `energy` leaf was counted toward an end use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Rule {
    OtherBucket,
    CeilingFan,
    SeparatedOther,
    HeatingSupply,
    CoolingSupply,
    DirectEndUse,
    NonElectricOther,
    ElectricMiscellaneous,
    BareLeaf,
}

fn listed(list: &[&str], key: Option<&str>) -> bool {
    key.is_some_and(|k| list.contains(&k))
}

/// First rule that counts `leaf` toward `end_use`, or `None`.
///
/// The building type and fuel of `leaf` are not checked here; callers
/// filter on those before asking about the end use. `fuel` is the fuel of
/// the leaf, needed for the two fuel-dependent "other" rules.
pub fn accepting_rule(leaf: &LeafPath<'_>, fuel: Fuel, end_use: EndUse) -> Option<Rule> {
    let eu = leaf.end_use;
    let sub = leaf.sub_key;
    let wanted = end_use.as_ref();
    let electric = fuel == Fuel::Electricity;

    if eu == "other" && listed(OTHER_END_USES, sub) && end_use == EndUse::Other {
        Some(Rule::OtherBucket)
    } else if eu == "ceiling fan" && end_use == EndUse::Other {
        Some(Rule::CeilingFan)
    } else if eu == "other" && listed(SEPARATE_OTHER_END_USES, sub) && sub == Some(wanted) {
        Some(Rule::SeparatedOther)
    } else if HEATING_END_USES.contains(&eu) && end_use == EndUse::Heating && sub == Some("supply")
    {
        Some(Rule::HeatingSupply)
    } else if eu == "cooling" && end_use == EndUse::Cooling && sub == Some("supply") {
        Some(Rule::CoolingSupply)
    } else if REMAINING_END_USES.contains(&eu) && eu == wanted {
        Some(Rule::DirectEndUse)
    } else if matches!(eu, "other" | "unspecified") && !electric && end_use == EndUse::Other {
        Some(Rule::NonElectricOther)
    } else if matches!(eu, "MELs" | "unspecified") && electric && end_use == EndUse::Other {
        Some(Rule::ElectricMiscellaneous)
    } else if eu == wanted && sub.is_none() {
        Some(Rule::BareLeaf)
    } else {
        None
    }
}

fn in_slice(leaf: &LeafPath<'_>, class: BuildingClass, fuel: Fuel) -> bool {
    class.owns_subtype(leaf.building_type) && leaf.fuel == fuel.as_ref()
}

/// Sums every `energy` leaf that the decision table assigns to `key`.
pub fn aggregate(tree: &SegmentNode, key: &FilterKey) -> YearSeries {
    let mut total = YearSeries::new();

    for_each_energy_leaf(tree, &mut |leaf, years| {
        if !in_slice(leaf, key.class, key.fuel) {
            return;
        }
        if accepting_rule(leaf, key.fuel, key.end_use).is_none() {
            return;
        }
        for (year, value) in energy_values(years) {
            total.accumulate(year, value);
        }
    });

    total
}

/// Sums every `energy` leaf of a building class and fuel, whatever its end use.
pub fn aggregate_unfiltered(tree: &SegmentNode, class: BuildingClass, fuel: Fuel) -> YearSeries {
    let mut total = YearSeries::new();

    for_each_energy_leaf(tree, &mut |leaf, years| {
        if in_slice(leaf, class, fuel) {
            for (year, value) in energy_values(years) {
                total.accumulate(year, value);
            }
        }
    });

    total
}
