//! Option schema inference: decides a family's axes and gives every member
//! its option values.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use woomig_core::{AxisName, OptionSchema, RecordId};

use crate::extract::ExtractedName;

/// Option value carried by the only variant of a product without variation.
pub const DEFAULT_TITLE: &str = "Default Title";
/// Size value for a member whose title has no size.
pub const DEFAULT_VALUE: &str = "Default";
/// Replacement for [`DEFAULT_VALUE`] when it sits beside real sizes.
pub const STANDARD_VALUE: &str = "Standard";

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OptionValues {
    pub axis1: String,
    pub axis2: Option<String>,
}

impl OptionValues {
    #[must_use]
    pub fn one(axis1: impl Into<String>) -> Self {
        Self {
            axis1: axis1.into(),
            axis2: None,
        }
    }

    #[must_use]
    pub fn two(axis1: impl Into<String>, axis2: impl Into<String>) -> Self {
        Self {
            axis1: axis1.into(),
            axis2: Some(axis2.into()),
        }
    }
}

impl std::fmt::Display for OptionValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.axis2 {
            Some(axis2) => write!(f, "{} / {axis2}", self.axis1),
            None => f.write_str(&self.axis1),
        }
    }
}

/// A family's schema plus one option-value pair per member, in member order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub schema: OptionSchema,
    pub values: Vec<(RecordId, OptionValues)>,
}

/// Chooses the option schema for `members` and assigns their values.
///
/// - one member: `Title` / `Default Title`
/// - one shared base name: a single `Size` axis when any member carries a
///   volume or weight unit, otherwise `Variant`
/// - several base names: `Product` × `Size`
///
/// Values longer than `max_len` characters are truncated with `...`. Distinct
/// products whose labels only collide once truncated are numbered apart.
#[must_use]
pub fn assign_options(
    members: &[RecordId],
    extracted: &[ExtractedName],
    max_len: usize,
) -> Assignment {
    let name_of = |id: RecordId| &extracted[id.index()];

    if members.len() <= 1 {
        return Assignment {
            schema: OptionSchema::SINGLE,
            values: members
                .iter()
                .map(|&id| (id, OptionValues::one(DEFAULT_TITLE)))
                .collect(),
        };
    }

    let size_value = |id: RecordId| {
        name_of(id)
            .size
            .as_ref()
            .map_or_else(|| DEFAULT_VALUE.to_string(), ToString::to_string)
    };

    let first_base = &name_of(members[0]).base_name;
    let single_base = members
        .iter()
        .all(|&id| &name_of(id).base_name == first_base);

    if single_base {
        let measured = members.iter().any(|&id| {
            name_of(id)
                .size
                .as_ref()
                .is_some_and(|size| size.unit.is_measure())
        });
        let axis = if measured {
            AxisName::Size
        } else {
            AxisName::Variant
        };
        return Assignment {
            schema: OptionSchema::one(axis),
            values: members
                .iter()
                .map(|&id| (id, OptionValues::one(truncate_value(&size_value(id), max_len))))
                .collect(),
        };
    }

    // Members spelling the same product differently share the first spelling.
    let mut product_labels: HashMap<&str, String> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    for &id in members {
        let name = name_of(id);
        if product_labels.contains_key(name.base_name.as_str()) {
            continue;
        }
        let label = distinct_label(&name.display_base, max_len, &used);
        used.insert(label.clone());
        product_labels.insert(name.base_name.as_str(), label);
    }

    Assignment {
        schema: OptionSchema::two(AxisName::Product, AxisName::Size),
        values: members
            .iter()
            .map(|&id| {
                let base = name_of(id).base_name.as_str();
                let product = product_labels
                    .get(base)
                    .cloned()
                    .unwrap_or_else(|| truncate_value(base, max_len));
                (
                    id,
                    OptionValues::two(product, truncate_value(&size_value(id), max_len)),
                )
            })
            .collect(),
    }
}

/// Replaces `Default` size values with `Standard` when the same family also
/// has real sizes. Returns how many values changed.
pub fn relabel_defaults(schema: &OptionSchema, values: &mut [(RecordId, OptionValues)]) -> usize {
    let mut has_default = false;
    let mut has_real = false;
    for (_, v) in values.iter_mut() {
        if let Some(size) = size_axis_mut(schema, v) {
            if size == DEFAULT_VALUE {
                has_default = true;
            } else {
                has_real = true;
            }
        }
    }
    if !(has_default && has_real) {
        return 0;
    }

    let mut changed = 0;
    for (_, v) in values.iter_mut() {
        if let Some(size) = size_axis_mut(schema, v) {
            if size == DEFAULT_VALUE {
                STANDARD_VALUE.clone_into(size);
                changed += 1;
            }
        }
    }
    changed
}

fn size_axis_mut<'a>(schema: &OptionSchema, values: &'a mut OptionValues) -> Option<&'a mut String> {
    match (schema.axis1, schema.axis2) {
        (_, Some(_)) => values.axis2.as_mut(),
        (AxisName::Size | AxisName::Variant, None) => Some(&mut values.axis1),
        (AxisName::Title | AxisName::Product, None) => None,
    }
}

/// Truncated label not yet in `used`; a clash gets ` (2)`, ` (3)`, ...
fn distinct_label(value: &str, max_len: usize, used: &HashSet<String>) -> String {
    let label = truncate_value(value, max_len);
    if !used.contains(&label) {
        return label;
    }
    let mut n = 2usize;
    loop {
        let suffix = format!(" ({n})");
        let stem = truncate_value(value, max_len.saturating_sub(suffix.chars().count()));
        let candidate = format!("{stem}{suffix}");
        if !used.contains(&candidate) {
            tracing::debug!(label = %candidate, "product label collided after truncation; numbered");
            return candidate;
        }
        n += 1;
    }
}

/// Cuts `value` to at most `max_len` characters, ending in `...` when cut.
#[must_use]
pub fn truncate_value(value: &str, max_len: usize) -> String {
    if value.chars().count() <= max_len {
        return value.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut cut: String = value.chars().take(keep).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str(ELLIPSIS);
    cut
}
