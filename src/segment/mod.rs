pub mod aggregate;
pub mod audit;

pub use self::aggregate::{aggregate, aggregate_unfiltered, accepting_rule, Rule};
pub use self::audit::{audit, SliceAudit, TaxonomyAudit};

use crate::error::{BaselineError, BlResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// Key that marks a year-to-energy table inside the microsegments.
pub const ENERGY_KEY: &str = "energy";

/// One node of the microsegments document.
///
/// Only branches and numbers carry meaning for the comparison; strings,
/// arrays, booleans and nulls are kept as `Opaque` so that a walk can step
/// over them without guessing at their shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentNode {
    Branch(BTreeMap<String, SegmentNode>),
    Value(f64),
    Opaque,
}

impl From<Value> for SegmentNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => SegmentNode::Branch(
                map.into_iter()
                    .map(|(key, child)| (key, SegmentNode::from(child)))
                    .collect(),
            ),
            Value::Number(n) => n.as_f64().map_or(SegmentNode::Opaque, SegmentNode::Value),
            _ => SegmentNode::Opaque,
        }
    }
}

impl SegmentNode {
    /// Reads the microsegments JSON. A missing file is reported as
    /// [`BaselineError::MissingInput`] rather than a bare IO error.
    pub fn load<P: AsRef<Path>>(path: P) -> BlResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BaselineError::MissingInput {
                path: path.display().to_string(),
            },
            _ => BaselineError::Io(e),
        })?;

        let value: Value = serde_json::from_reader(BufReader::new(file))?;
        Ok(value.into())
    }

    pub fn from_json_str(content: &str) -> BlResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Ok(value.into())
    }

    pub fn children(&self) -> Option<&BTreeMap<String, SegmentNode>> {
        match self {
            SegmentNode::Branch(children) => Some(children),
            _ => None,
        }
    }
}

/// Location of an `energy` table: climate zone / building type / fuel /
/// end use, plus the first key below the end use when there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafPath<'a> {
    pub climate_zone: &'a str,
    pub building_type: &'a str,
    pub fuel: &'a str,
    pub end_use: &'a str,
    pub sub_key: Option<&'a str>,
}

impl<'a> LeafPath<'a> {
    /// `segments` excludes the trailing `energy` key. Paths shallower than
    /// climate zone / building / fuel / end use are not leaves.
    pub fn from_segments(segments: &[&'a str]) -> Option<Self> {
        match segments {
            [climate_zone, building_type, fuel, end_use, rest @ ..] => Some(Self {
                climate_zone: *climate_zone,
                building_type: *building_type,
                fuel: *fuel,
                end_use: *end_use,
                sub_key: rest.first().copied(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for LeafPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.climate_zone, self.building_type, self.fuel, self.end_use
        )?;
        if let Some(sub) = self.sub_key {
            write!(f, " / {}", sub)?;
        }
        Ok(())
    }
}

/// Numeric (year, value) pairs of an `energy` table; anything else is skipped.
pub fn energy_values<'a>(
    years: &'a BTreeMap<String, SegmentNode>,
) -> impl Iterator<Item = (&'a str, f64)> + 'a {
    years.iter().filter_map(|(year, node)| match node {
        SegmentNode::Value(v) => Some((year.as_str(), *v)),
        _ => None,
    })
}

/// Depth-first walk calling `visit` for every `energy` table in the tree.
pub fn for_each_energy_leaf<'a, F>(root: &'a SegmentNode, visit: &mut F)
where
    F: FnMut(&LeafPath<'a>, &'a BTreeMap<String, SegmentNode>),
{
    let mut path: Vec<&'a str> = Vec::new();
    walk(root, &mut path, visit);
}

fn walk<'a, F>(node: &'a SegmentNode, path: &mut Vec<&'a str>, visit: &mut F)
where
    F: FnMut(&LeafPath<'a>, &'a BTreeMap<String, SegmentNode>),
{
    let Some(children) = node.children() else {
        return;
    };

    for (key, child) in children {
        match child {
            SegmentNode::Branch(years) if key == ENERGY_KEY => {
                if let Some(leaf) = LeafPath::from_segments(path) {
                    visit(&leaf, years);
                }
            }
            SegmentNode::Branch(_) => {
                path.push(key);
                walk(child, path, visit);
                path.pop();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_scalars_become_opaque() {
        let node = SegmentNode::from_json_str(r#"{"a": "NA", "b": [1, 2], "c": 3}"#).unwrap();
        let children = node.children().unwrap();
        assert_eq!(children["a"], SegmentNode::Opaque);
        assert_eq!(children["b"], SegmentNode::Opaque);
        assert_eq!(children["c"], SegmentNode::Value(3.0));
    }

    #[test]
    fn leaf_path_requires_four_segments() {
        assert!(LeafPath::from_segments(&["AIA_CZ1", "mobile home", "electricity"]).is_none());

        let leaf =
            LeafPath::from_segments(&["AIA_CZ1", "mobile home", "electricity", "heating", "supply", "ASHP"])
                .unwrap();
        assert_eq!(leaf.sub_key, Some("supply"));
        assert_eq!(
            leaf.to_string(),
            "AIA_CZ1 / mobile home / electricity / heating / supply"
        );
    }

    #[test]
    fn walk_skips_shallow_and_scalar_energy_keys() {
        let json = r#"{
            "energy": {"2020": 1},
            "AIA_CZ1": {
                "mobile home": {
                    "energy": {"2020": 2},
                    "electricity": {
                        "lighting": {"energy": 5},
                        "cooking": {"energy": {"2020": 7, "note": "x"}}
                    }
                }
            }
        }"#;
        let tree = SegmentNode::from_json_str(json).unwrap();

        let mut seen = Vec::new();
        for_each_energy_leaf(&tree, &mut |leaf, years| {
            seen.push((leaf.end_use.to_string(), energy_values(years).count()));
        });
        assert_eq!(seen, vec![("cooking".to_string(), 1)]);
    }
}
