//! Per-family conflict resolution: one member per option slot, noise
//! members dropped, schema recomputed over whatever survives.

use std::collections::HashMap;

use serde::Serialize;
use woomig_core::{FamilyKey, OptionSchema, RawRecord, RecordId};

use crate::enrich::PlaceholderMatcher;
use crate::extract::ExtractedName;
use crate::group::{Family, FamilyOrigin};
use crate::options::{assign_options, relabel_defaults, OptionValues};

const DESCRIPTION_LONG: usize = 100;
const DESCRIPTION_SHORT: usize = 20;
const BARCODE_MIN: usize = 5;

/// How much usable data a record carries; higher wins a slot conflict.
#[must_use]
pub fn completeness_score(record: &RawRecord, placeholders: &PlaceholderMatcher) -> u32 {
    let mut score = 0;
    if record.real_price().is_some() {
        score += 100;
    }
    if record
        .sku()
        .is_some_and(|sku| !placeholders.is_placeholder_sku(sku))
    {
        score += 50;
    }
    if record.stock_qty.is_some_and(|qty| qty > 0) {
        score += 30;
    }
    let description_len = record.description().map_or(0, |d| d.chars().count());
    if description_len > DESCRIPTION_LONG {
        score += 40;
    } else if description_len > DESCRIPTION_SHORT {
        score += 10;
    }
    if record
        .image_url()
        .is_some_and(|url| !placeholders.is_placeholder_image(url))
    {
        score += 25;
    }
    if record.barcode().is_some_and(|b| b.chars().count() > BARCODE_MIN) {
        score += 15;
    }
    score
}

/// A record without price, SKU or size is an artifact of a bad merge.
#[must_use]
pub fn is_noise(record: &RawRecord, extracted: &ExtractedName) -> bool {
    record.real_price().is_none() && record.sku().is_none() && extracted.size.is_none()
}

/// A member that lost its slot to a more complete record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotDiscard {
    pub slot: OptionValues,
    pub kept: RecordId,
    pub kept_score: u32,
    pub discarded: RecordId,
    pub discarded_score: u32,
}

/// A family after conflict resolution, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFamily {
    pub key: FamilyKey,
    pub origin: FamilyOrigin,
    pub schema: OptionSchema,
    /// Surviving members with their final option values, in input order.
    pub slots: Vec<(RecordId, OptionValues)>,
    pub discards: Vec<SlotDiscard>,
    pub noise: Vec<RecordId>,
    pub relabeled: usize,
}

impl ResolvedFamily {
    #[must_use]
    pub fn explicit_parent(&self) -> Option<RecordId> {
        match self.origin {
            FamilyOrigin::Explicit { parent } => Some(parent),
            FamilyOrigin::Inferred => None,
        }
    }

    /// `true` when the family had no members to resolve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Resolves slot conflicts and noise inside one family.
///
/// Options are assigned, each slot keeps its highest-scoring member (first
/// in input order on ties), and noise members are dropped when more than one
/// member remains; a family made only of noise keeps its first member.
/// Whenever members were removed the options are assigned
/// again over the survivors, so a family reduced to one member falls back to
/// the `Default Title` schema. Finally `Default` sizes that sit beside real
/// sizes are relabeled `Standard`.
#[must_use]
pub fn resolve_family(
    family: &Family,
    records: &[RawRecord],
    extracted: &[ExtractedName],
    placeholders: &PlaceholderMatcher,
    option_max_len: usize,
) -> ResolvedFamily {
    let mut members = family.members.clone();
    let mut discards = Vec::new();
    let mut noise = Vec::new();

    let mut assignment = assign_options(&members, extracted, option_max_len);
    loop {
        let (kept, mut round_discards) =
            dedupe_slots(assignment.values, records, placeholders);
        discards.append(&mut round_discards);

        let survivors: Vec<(RecordId, OptionValues)> = if kept.len() > 1 {
            let (mut dropped, mut survivors): (Vec<_>, Vec<_>) = kept
                .into_iter()
                .partition(|(id, _)| is_noise(&records[id.index()], &extracted[id.index()]));
            if survivors.is_empty() {
                // Nothing better to keep: the first member stands in for the product.
                survivors.push(dropped.remove(0));
            }
            for (id, _) in dropped {
                tracing::info!(family = %family.key, record = %id, "dropping member with no price, SKU or size");
                noise.push(id);
            }
            survivors
        } else {
            kept
        };

        if survivors.len() == members.len() {
            assignment.values = survivors;
            break;
        }
        members = survivors.iter().map(|(id, _)| *id).collect();
        assignment = assign_options(&members, extracted, option_max_len);
    }

    if members.is_empty() {
        tracing::warn!(family = %family.key, "family has no members; not emitted");
    }

    let relabeled = relabel_defaults(&assignment.schema, &mut assignment.values);

    ResolvedFamily {
        key: family.key.clone(),
        origin: family.origin,
        schema: assignment.schema,
        slots: assignment.values,
        discards,
        noise,
        relabeled,
    }
}

/// Keeps one member per distinct option-value pair.
fn dedupe_slots(
    values: Vec<(RecordId, OptionValues)>,
    records: &[RawRecord],
    placeholders: &PlaceholderMatcher,
) -> (Vec<(RecordId, OptionValues)>, Vec<SlotDiscard>) {
    let mut kept: Vec<(RecordId, OptionValues, u32)> = Vec::with_capacity(values.len());
    let mut by_slot: HashMap<OptionValues, usize> = HashMap::new();
    let mut discards = Vec::new();

    for (id, slot) in values {
        let score = completeness_score(&records[id.index()], placeholders);
        let Some(&pos) = by_slot.get(&slot) else {
            by_slot.insert(slot.clone(), kept.len());
            kept.push((id, slot, score));
            continue;
        };

        let (incumbent, incumbent_score) = (kept[pos].0, kept[pos].2);
        let (winner, winner_score, loser, loser_score) = if score > incumbent_score {
            kept[pos].0 = id;
            kept[pos].2 = score;
            (id, score, incumbent, incumbent_score)
        } else {
            (incumbent, incumbent_score, id, score)
        };
        tracing::info!(
            slot = %slot,
            kept = %winner,
            discarded = %loser,
            score = loser_score,
            kept_score = winner_score,
            "slot conflict resolved"
        );
        discards.push(SlotDiscard {
            slot,
            kept: winner,
            kept_score: winner_score,
            discarded: loser,
            discarded_score: loser_score,
        });
    }

    // A winner replacing an earlier incumbent keeps the incumbent's position;
    // restore input order.
    kept.sort_by_key(|(id, _, _)| *id);
    (
        kept.into_iter().map(|(id, slot, _)| (id, slot)).collect(),
        discards,
    )
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
