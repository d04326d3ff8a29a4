//! Turns resolved families into variant slots and target catalog rows.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use woomig_core::{CatalogRow, FamilyKey, OptionSchema, RawRecord, RecordId};

use crate::enrich::Enrichment;
use crate::extract::ExtractedName;
use crate::normalize::{collapse_whitespace, decode_entities, normalize_text};
use crate::resolve::ResolvedFamily;

const SEO_TITLE_MAX: usize = 70;
const SEO_DESCRIPTION_MAX: usize = 320;
const FALLBACK_HANDLE: &str = "product";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// One output variant of a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSlot {
    pub family_key: FamilyKey,
    pub axis1_value: String,
    pub axis2_value: Option<String>,
    pub source: RecordId,
    /// Only the first slot of a family is primary and carries product-level fields.
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFamily {
    pub key: FamilyKey,
    pub handle: String,
    pub title: String,
    pub schema: OptionSchema,
    pub slots: Vec<VariantSlot>,
    pub rows: Vec<CatalogRow>,
}

/// How often each enrichment collaborator filled a blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentStats {
    pub vendors_classified: usize,
    pub categories_classified: usize,
    pub weights_estimated: usize,
    pub prices_estimated: usize,
    pub images_resolved: usize,
}

/// Slots of a resolved family in final order; the first is primary.
#[must_use]
pub fn family_slots(family: &ResolvedFamily) -> Vec<VariantSlot> {
    family
        .slots
        .iter()
        .enumerate()
        .map(|(i, (id, values))| VariantSlot {
            family_key: family.key.clone(),
            axis1_value: values.axis1.clone(),
            axis2_value: values.axis2.clone(),
            source: *id,
            is_primary: i == 0,
        })
        .collect()
}

/// Product title for a family.
///
/// A grouped container's own name wins; a single-variant product keeps its
/// full name; otherwise the shared base name of the first variant is used.
/// When none of those has text the title is built from the family key.
#[must_use]
pub fn family_title(family: &ResolvedFamily, extracted: &[ExtractedName]) -> String {
    let from_members = match (family.explicit_parent(), family.slots.as_slice()) {
        (Some(parent), _) => extracted[parent.index()].display_name.clone(),
        (None, [(only, _)]) => extracted[only.index()].display_name.clone(),
        (None, [(first, _), ..]) => extracted[first.index()].display_base.clone(),
        (None, []) => String::new(),
    };
    if from_members.trim().is_empty() {
        title_case(&family.key.base_name)
    } else {
        from_members
    }
}

/// Upper-cases the first letter of every space-separated word.
#[must_use]
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// URL-safe handle: normalized text, ASCII alphanumeric runs joined by single
/// hyphens, at most `max_len` characters.
#[must_use]
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::new();
    for c in normalize_text(text).chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.truncate(max_len);
    slug.trim_end_matches('-').to_string()
}

/// Last segment of a category path (`A > B > C` gives `C`); for a
/// comma-separated list of paths only the first path counts.
#[must_use]
pub fn product_type(category_path: &str) -> Option<String> {
    let first_path = category_path.split(',').next()?;
    let leaf = first_path.rsplit('>').next()?.trim();
    (!leaf.is_empty()).then(|| decode_entities(leaf))
}

/// Removes tags and entities from an HTML fragment and collapses whitespace.
#[must_use]
pub fn strip_markup(html: &str) -> String {
    collapse_whitespace(&decode_entities(&TAG_RE.replace_all(html, " ")))
}

fn truncate_chars(text: &str, max_len: usize) -> String {
    let cut: String = text.chars().take(max_len).collect();
    cut.trim_end().to_string()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_grams(grams: f64) -> Option<u32> {
    (grams.is_finite() && grams > 0.0).then(|| grams.round().min(f64::from(u32::MAX)) as u32)
}

/// Hands out unique handles; a repeated slug gets `-2`, `-3`, ... appended.
#[derive(Debug)]
pub struct HandleRegistry {
    used: HashSet<String>,
    max_len: usize,
}

impl HandleRegistry {
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            used: HashSet::new(),
            max_len: max_len.max(1),
        }
    }

    pub fn claim(&mut self, title: &str) -> String {
        let mut base = slugify(title, self.max_len);
        if base.is_empty() {
            base = slugify(FALLBACK_HANDLE, self.max_len);
        }
        if self.used.insert(base.clone()) {
            return base;
        }

        let mut n = 2usize;
        loop {
            let suffix = format!("-{n}");
            let room = self.max_len.saturating_sub(suffix.len());
            let mut stem = base.clone();
            stem.truncate(room);
            let candidate = format!("{}{suffix}", stem.trim_end_matches('-'));
            if self.used.insert(candidate.clone()) {
                tracing::debug!(handle = %candidate, "handle already taken; suffixed");
                return candidate;
            }
            n += 1;
        }
    }
}

/// Builds catalog rows for resolved families, filling gaps from the
/// enrichment collaborators.
pub struct Emitter<'a> {
    records: &'a [RawRecord],
    extracted: &'a [ExtractedName],
    enrichment: &'a Enrichment,
    handles: HandleRegistry,
    stats: EnrichmentStats,
}

impl<'a> Emitter<'a> {
    #[must_use]
    pub fn new(
        records: &'a [RawRecord],
        extracted: &'a [ExtractedName],
        enrichment: &'a Enrichment,
        handle_max_len: usize,
    ) -> Self {
        Self {
            records,
            extracted,
            enrichment,
            handles: HandleRegistry::new(handle_max_len),
            stats: EnrichmentStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> EnrichmentStats {
        self.stats
    }

    /// Emits one family, or `None` when it has no surviving members.
    pub fn emit(&mut self, family: &ResolvedFamily) -> Option<EmittedFamily> {
        if family.is_empty() {
            return None;
        }

        let (records, enrichment) = (self.records, self.enrichment);
        let title = family_title(family, self.extracted);
        let handle = self.handles.claim(&title);
        let slots = family_slots(family);

        // Product-level fields come from the container first, then the variants.
        let mut sources: Vec<&RawRecord> = Vec::with_capacity(slots.len() + 1);
        if let Some(parent) = family.explicit_parent() {
            sources.push(&records[parent.index()]);
        }
        sources.extend(slots.iter().map(|s| &records[s.source.index()]));
        let first = |field: fn(&RawRecord) -> Option<&str>| sources.iter().find_map(|&r| field(r));

        let mut vendor = first(RawRecord::vendor).map(str::to_string);
        let mut category = first(RawRecord::category_path).map(str::to_string);
        let mut kind = category.as_deref().and_then(product_type);
        if vendor.is_none() || category.is_none() {
            let text = format!("{title} {}", category.as_deref().unwrap_or_default());
            let classification = enrichment.classifier.classify(&text);
            if vendor.is_none() && classification.brand.is_some() {
                vendor = classification.brand;
                self.stats.vendors_classified += 1;
            }
            if category.is_none() {
                if let Some(label) = classification.category {
                    kind = Some(label.clone());
                    category = Some(label);
                    self.stats.categories_classified += 1;
                }
            }
        }

        let body = first(RawRecord::description).unwrap_or_default().to_string();
        let placeholders = &enrichment.placeholders;
        let image = sources
            .iter()
            .filter_map(|r| r.image_url())
            .find(|url| !placeholders.is_placeholder_image(url))
            .map(str::to_string)
            .or_else(|| {
                let resolved = enrichment.images.resolve_image(&handle, &title)?;
                self.stats.images_resolved += 1;
                tracing::debug!(handle = %handle, "image filled from resolver");
                Some(resolved)
            });

        let mut rows = Vec::with_capacity(slots.len());
        for slot in &slots {
            let mut row = self.variant_row(&handle, slot, category.as_deref());
            if slot.is_primary {
                row.title.clone_from(&title);
                row.body_html.clone_from(&body);
                row.vendor = vendor.clone().unwrap_or_default();
                row.product_category = category.clone().unwrap_or_default();
                row.product_type = kind.clone().unwrap_or_default();
                row.tags = first(RawRecord::tags).unwrap_or_default().to_string();
                row.published = Some(true);
                row.option1_name = family.schema.axis1.to_string();
                row.option2_name = family
                    .schema
                    .axis2
                    .map(|axis| axis.to_string())
                    .unwrap_or_default();
                if let Some(src) = &image {
                    row.image_src.clone_from(src);
                    row.image_position = Some(1);
                    row.image_alt_text.clone_from(&title);
                }
                row.seo_title = truncate_chars(&title, SEO_TITLE_MAX);
                row.seo_description = truncate_chars(&strip_markup(&body), SEO_DESCRIPTION_MAX);
                row.status = "active".to_string();
            }
            rows.push(row);
        }

        tracing::debug!(
            family = %family.key,
            handle = %handle,
            variants = rows.len(),
            "family emitted"
        );

        Some(EmittedFamily {
            key: family.key.clone(),
            handle,
            title,
            schema: family.schema,
            slots,
            rows,
        })
    }

    fn variant_row(&mut self, handle: &str, slot: &VariantSlot, category: Option<&str>) -> CatalogRow {
        let (records, extracted, enrichment) = (self.records, self.extracted, self.enrichment);
        let record = &records[slot.source.index()];
        let size = extracted[slot.source.index()].size.as_ref();

        let grams = record
            .weight_grams
            .and_then(whole_grams)
            .or_else(|| {
                let estimated = whole_grams(enrichment.weights.estimate(category, size)?)?;
                self.stats.weights_estimated += 1;
                Some(estimated)
            });

        let price = record
            .real_price()
            .or_else(|| {
                let estimated = enrichment.prices.estimate(category, size)?;
                self.stats.prices_estimated += 1;
                Some(estimated)
            })
            .or(record.price);
        let compare_at = record
            .compare_at_price
            .filter(|compare| price.is_some_and(|p| *compare > p));

        CatalogRow {
            handle: handle.to_string(),
            option1_value: slot.axis1_value.clone(),
            option2_value: slot.axis2_value.clone().unwrap_or_default(),
            variant_sku: record.sku().unwrap_or_default().to_string(),
            variant_grams: grams,
            inventory_tracker: if record.stock_qty.is_some() {
                "shopify".to_string()
            } else {
                String::new()
            },
            inventory_qty: record.stock_qty,
            inventory_policy: "deny".to_string(),
            fulfillment_service: "manual".to_string(),
            price,
            compare_at_price: compare_at,
            requires_shipping: true,
            taxable: true,
            barcode: record.barcode().unwrap_or_default().to_string(),
            ..CatalogRow::default()
        }
    }
}

#[cfg(test)]
#[path = "emit_test.rs"]
mod tests;
