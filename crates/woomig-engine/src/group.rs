//! Groups flat records into product families.
//!
//! Explicit parent→child links from the source are honored first; every
//! record left unclaimed is then grouped by its `(vendor, base name)` key.
//! Every record ends up in exactly one family, either as a member or as a
//! container.

use std::collections::HashMap;

use serde::Serialize;
use woomig_core::{FamilyKey, RawRecord, RecordId};

use crate::extract::ExtractedName;
use crate::normalize::normalize_text;

/// How a child reference was matched to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChildMatch {
    ExactName,
    NormalizedName,
    Sku,
}

/// Read-only lookups over the source table, built once per run.
#[derive(Debug, Default)]
pub struct RecordIndex {
    by_exact_name: HashMap<String, RecordId>,
    by_normalized_name: HashMap<String, RecordId>,
    by_sku: HashMap<String, RecordId>,
}

impl RecordIndex {
    /// Indexes every record; when names collide the first record wins.
    #[must_use]
    pub fn build(records: &[RawRecord]) -> Self {
        let mut index = Self::default();
        for (i, record) in records.iter().enumerate() {
            let id = RecordId(i);
            index
                .by_exact_name
                .entry(exact_key(&record.name))
                .or_insert(id);
            index
                .by_normalized_name
                .entry(normalize_text(&record.name))
                .or_insert(id);
            if let Some(sku) = record.sku() {
                index.by_sku.entry(sku.to_string()).or_insert(id);
            }
        }
        index
    }

    /// Resolves a child reference: exact case-insensitive name first, then
    /// normalized name, then SKU.
    #[must_use]
    pub fn resolve(&self, child: &str) -> Option<(RecordId, ChildMatch)> {
        if let Some(id) = self.by_exact_name.get(&exact_key(child)) {
            return Some((*id, ChildMatch::ExactName));
        }
        if let Some(id) = self.by_normalized_name.get(&normalize_text(child)) {
            return Some((*id, ChildMatch::NormalizedName));
        }
        self.by_sku
            .get(child.trim())
            .map(|id| (*id, ChildMatch::Sku))
    }
}

fn exact_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FamilyOrigin {
    /// Built from a grouped container's child list.
    Explicit { parent: RecordId },
    /// Built from matching `(vendor, base name)` keys.
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub key: FamilyKey,
    pub origin: FamilyOrigin,
    /// Variant candidates in input order.
    pub members: Vec<RecordId>,
    /// Grouped records that anchor the family without being variants. A
    /// container whose family gained no other member is a member instead.
    pub containers: Vec<RecordId>,
}

impl Family {
    #[must_use]
    pub fn explicit_parent(&self) -> Option<RecordId> {
        match self.origin {
            FamilyOrigin::Explicit { parent } => Some(parent),
            FamilyOrigin::Inferred => None,
        }
    }
}

/// A child reference that matched no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedChild {
    pub parent: RecordId,
    pub child: String,
}

/// A record listed by a family after an earlier family already claimed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateClaim {
    pub record: RecordId,
    pub claimed_by: RecordId,
    pub rejected_parent: RecordId,
}

#[derive(Debug, Default)]
pub struct Grouping {
    /// Families in first-seen order.
    pub families: Vec<Family>,
    pub unresolved: Vec<UnresolvedChild>,
    pub duplicate_claims: Vec<DuplicateClaim>,
}

struct Builder {
    anchor: RecordId,
    family: Family,
}

/// Partitions `records` into families.
///
/// `extracted[i]` must be the extraction of `records[i]`.
#[must_use]
pub fn group(records: &[RawRecord], extracted: &[ExtractedName], index: &RecordIndex) -> Grouping {
    debug_assert_eq!(records.len(), extracted.len());

    let key_of = |id: RecordId| {
        let vendor = records[id.index()].vendor().map(normalize_text).unwrap_or_default();
        FamilyKey::new(vendor, extracted[id.index()].base_name.clone())
    };

    let mut builders: Vec<Builder> = Vec::new();
    let mut by_key: HashMap<FamilyKey, usize> = HashMap::new();
    // Owning explicit parent of each claimed record.
    let mut claims: Vec<Option<RecordId>> = vec![None; records.len()];
    let mut grouping = Grouping::default();

    for (i, record) in records.iter().enumerate() {
        if !record.is_grouped() {
            continue;
        }
        let parent = RecordId(i);
        if let Some(owner) = claims[i] {
            tracing::warn!(
                record = %parent,
                claimed_by = %owner,
                "grouped record already claimed by another family; its child list is ignored"
            );
            grouping.duplicate_claims.push(DuplicateClaim {
                record: parent,
                claimed_by: owner,
                rejected_parent: parent,
            });
            continue;
        }

        let key = key_of(parent);
        let slot = *by_key.entry(key.clone()).or_insert_with(|| {
            builders.push(Builder {
                anchor: parent,
                family: Family {
                    key,
                    origin: FamilyOrigin::Explicit { parent },
                    members: Vec::new(),
                    containers: Vec::new(),
                },
            });
            builders.len() - 1
        });
        claims[i] = Some(parent);
        builders[slot].family.containers.push(parent);

        for child in &record.explicit_children {
            let Some((child_id, how)) = index.resolve(child) else {
                tracing::warn!(parent = %parent, child = %child, "unresolved child reference dropped");
                grouping.unresolved.push(UnresolvedChild {
                    parent,
                    child: child.clone(),
                });
                continue;
            };
            if child_id == parent {
                tracing::debug!(parent = %parent, "grouped record lists itself; ignored");
                continue;
            }
            if let Some(owner) = claims[child_id.index()] {
                if owner == parent {
                    tracing::debug!(parent = %parent, record = %child_id, "child listed twice");
                } else {
                    tracing::warn!(
                        parent = %parent,
                        record = %child_id,
                        claimed_by = %owner,
                        "child already claimed; first claim wins"
                    );
                    grouping.duplicate_claims.push(DuplicateClaim {
                        record: child_id,
                        claimed_by: owner,
                        rejected_parent: parent,
                    });
                }
                continue;
            }
            tracing::debug!(parent = %parent, record = %child_id, matched_by = ?how, "child resolved");
            claims[child_id.index()] = Some(parent);
            builders[slot].family.members.push(child_id);
        }
    }

    for (i, claim) in claims.iter().enumerate() {
        if claim.is_some() {
            continue;
        }
        let id = RecordId(i);
        let key = key_of(id);
        match by_key.get(&key) {
            Some(&slot) => builders[slot].family.members.push(id),
            None => {
                by_key.insert(key.clone(), builders.len());
                builders.push(Builder {
                    anchor: id,
                    family: Family {
                        key,
                        origin: FamilyOrigin::Inferred,
                        members: vec![id],
                        containers: Vec::new(),
                    },
                });
            }
        }
    }

    builders.sort_by_key(|b| b.anchor);
    grouping.families = builders
        .into_iter()
        .map(|mut b| {
            if b.family.members.is_empty() {
                tracing::debug!(family = %b.family.key, "no child resolved; container kept as the only variant");
                b.family.members = std::mem::take(&mut b.family.containers);
            }
            b.family.members.sort_unstable();
            b.family
        })
        .collect();

    tracing::debug!(
        families = grouping.families.len(),
        unresolved = grouping.unresolved.len(),
        duplicate_claims = grouping.duplicate_claims.len(),
        "grouping complete"
    );
    grouping
}

#[cfg(test)]
#[path = "group_test.rs"]
mod tests;
