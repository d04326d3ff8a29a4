//! Whole-run orchestration: extract → group → resolve → emit → validate.

use serde::Serialize;
use woomig_core::{AppConfig, CatalogRow, RawRecord, RecordId};

use crate::emit::{EmittedFamily, Emitter, EnrichmentStats};
use crate::enrich::Enrichment;
use crate::extract::{extract, ExtractedName};
use crate::group::{group, RecordIndex};
use crate::resolve::resolve_family;
use crate::validate::{validate_rows, ValidationReport};

/// Length limits the engine applies to generated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub option_max_len: usize,
    pub handle_max_len: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            option_max_len: 40,
            handle_max_len: 100,
        }
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            option_max_len: config.option_max_len,
            handle_max_len: config.handle_max_len,
        }
    }
}

/// Counters printed in the run summary and written to the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub records_in: usize,
    /// Source rows rejected before consolidation; filled in by the reader.
    pub malformed_records: usize,
    pub families: usize,
    pub multi_variant_families: usize,
    /// Grouped records used as product anchors rather than variants.
    pub containers: usize,
    pub unresolved_children: usize,
    pub duplicate_claims: usize,
    pub conflicts_discarded: usize,
    pub noise_dropped: usize,
    pub defaults_relabeled: usize,
    pub rows_out: usize,
    pub enrichment: EnrichmentStats,
}

/// Something the run dropped or rejected, named for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropEvent {
    UnresolvedChild {
        parent: String,
        child: String,
    },
    DuplicateClaim {
        record: String,
        claimed_by: String,
        rejected_parent: String,
    },
    SlotConflict {
        family: String,
        slot: String,
        kept: String,
        kept_score: u32,
        discarded: String,
        discarded_score: u32,
    },
    Noise {
        family: String,
        record: String,
    },
}

impl std::fmt::Display for DropEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropEvent::UnresolvedChild { parent, child } => {
                write!(f, "unresolved child \"{child}\" of \"{parent}\"")
            }
            DropEvent::DuplicateClaim {
                record,
                claimed_by,
                rejected_parent,
            } => write!(
                f,
                "\"{record}\" already claimed by \"{claimed_by}\"; ignored for \"{rejected_parent}\""
            ),
            DropEvent::SlotConflict {
                family,
                slot,
                kept,
                kept_score,
                discarded,
                discarded_score,
            } => write!(
                f,
                "{family} [{slot}]: kept \"{kept}\" ({kept_score}), discarded \"{discarded}\" ({discarded_score})"
            ),
            DropEvent::Noise { family, record } => {
                write!(f, "{family}: dropped \"{record}\" (no price, SKU or size)")
            }
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub families: Vec<EmittedFamily>,
    pub stats: RunStats,
    pub events: Vec<DropEvent>,
    pub validation: ValidationReport,
}

impl Consolidation {
    /// Target rows for every family, in first-seen family order.
    pub fn rows(&self) -> impl Iterator<Item = &CatalogRow> {
        self.families.iter().flat_map(|f| f.rows.iter())
    }
}

/// Runs the full consolidation over an in-memory source table.
#[must_use]
pub fn consolidate(
    records: &[RawRecord],
    enrichment: &Enrichment,
    settings: &EngineSettings,
) -> Consolidation {
    let extracted: Vec<ExtractedName> = records.iter().map(|r| extract(&r.name)).collect();
    let label = |id: RecordId| extracted[id.index()].display_name.clone();

    let index = RecordIndex::build(records);
    let grouping = group(records, &extracted, &index);

    let mut stats = RunStats {
        records_in: records.len(),
        unresolved_children: grouping.unresolved.len(),
        duplicate_claims: grouping.duplicate_claims.len(),
        ..RunStats::default()
    };
    let mut events: Vec<DropEvent> = Vec::new();
    events.extend(grouping.unresolved.iter().map(|u| DropEvent::UnresolvedChild {
        parent: label(u.parent),
        child: u.child.clone(),
    }));
    events.extend(
        grouping
            .duplicate_claims
            .iter()
            .map(|d| DropEvent::DuplicateClaim {
                record: label(d.record),
                claimed_by: label(d.claimed_by),
                rejected_parent: label(d.rejected_parent),
            }),
    );

    let mut emitter = Emitter::new(records, &extracted, enrichment, settings.handle_max_len);
    let mut families = Vec::with_capacity(grouping.families.len());

    for family in &grouping.families {
        let resolved = resolve_family(
            family,
            records,
            &extracted,
            &enrichment.placeholders,
            settings.option_max_len,
        );
        let family_name = resolved.key.to_string();

        stats.containers += family.containers.len();
        stats.conflicts_discarded += resolved.discards.len();
        stats.noise_dropped += resolved.noise.len();
        stats.defaults_relabeled += resolved.relabeled;
        events.extend(resolved.discards.iter().map(|d| DropEvent::SlotConflict {
            family: family_name.clone(),
            slot: d.slot.to_string(),
            kept: label(d.kept),
            kept_score: d.kept_score,
            discarded: label(d.discarded),
            discarded_score: d.discarded_score,
        }));
        events.extend(resolved.noise.iter().map(|&id| DropEvent::Noise {
            family: family_name.clone(),
            record: label(id),
        }));

        // Grouping never yields a family without members.
        let Some(emitted) = emitter.emit(&resolved) else {
            continue;
        };
        if emitted.slots.len() > 1 {
            stats.multi_variant_families += 1;
        }
        stats.rows_out += emitted.rows.len();
        families.push(emitted);
    }

    stats.families = families.len();
    stats.enrichment = emitter.stats();

    let rows: Vec<CatalogRow> = families.iter().flat_map(|f| f.rows.iter().cloned()).collect();
    let validation = validate_rows(&rows);

    tracing::info!(
        records = stats.records_in,
        families = stats.families,
        multi_variant = stats.multi_variant_families,
        rows = stats.rows_out,
        discarded = stats.conflicts_discarded,
        noise = stats.noise_dropped,
        issues = validation.issues.len(),
        "consolidation complete"
    );

    Consolidation {
        families,
        stats,
        events,
        validation,
    }
}
