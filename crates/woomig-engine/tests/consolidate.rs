//! End-to-end consolidation scenarios over the public API.

use std::collections::HashSet;

use rust_decimal::Decimal;
use woomig_core::{AxisName, OptionSchema, RawRecord, TablesFile};
use woomig_engine::{consolidate, Consolidation, DropEvent, EngineSettings, Enrichment};

fn record(name: &str, vendor: &str) -> RawRecord {
    let mut r = RawRecord::named(name);
    if !vendor.is_empty() {
        r.vendor = Some(vendor.to_string());
    }
    r
}

fn priced(name: &str, cents: i64, sku: &str) -> RawRecord {
    let mut r = RawRecord::named(name);
    r.price = Some(Decimal::new(cents, 2));
    if !sku.is_empty() {
        r.sku = Some(sku.to_string());
    }
    r
}

fn grouped(name: &str, children: &[&str]) -> RawRecord {
    let mut r = RawRecord::named(name);
    r.explicit_children = children.iter().map(|c| (*c).to_string()).collect();
    r
}

fn run(records: &[RawRecord]) -> Consolidation {
    let enrichment = Enrichment::from_tables(&TablesFile::default()).unwrap();
    consolidate(records, &enrichment, &EngineSettings::default())
}

fn option1_values(result: &Consolidation, family: usize) -> Vec<&str> {
    result.families[family]
        .rows
        .iter()
        .map(|r| r.option1_value.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_axis_inferred_family() {
    let result = run(&[record("FloraGro 1 qt", "GH"), record("FloraGro 1 gal", "GH")]);
    assert_eq!(result.families.len(), 1);
    let family = &result.families[0];
    assert_eq!(family.key.base_name, "floragro");
    assert_eq!(family.rows[0].option1_name, "Size");
    assert_eq!(option1_values(&result, 0), vec!["1 qt", "1 gal"]);
    assert!(result.validation.is_ready());
}

#[test]
fn two_axis_family_from_explicit_children() {
    let result = run(&[
        grouped("Nutrient Combo", &["FloraGro 1 qt", "FloraBloom 1 qt"]),
        record("FloraGro 1 qt", ""),
        record("FloraBloom 1 qt", ""),
    ]);
    assert_eq!(result.families.len(), 1);
    let family = &result.families[0];
    assert_eq!(family.schema, OptionSchema::two(AxisName::Product, AxisName::Size));
    assert_eq!(family.rows[0].option1_name, "Product");
    assert_eq!(family.rows[0].option2_name, "Size");
    assert_eq!(option1_values(&result, 0), vec!["FloraGro", "FloraBloom"]);
    assert!(family.rows.iter().all(|r| r.option2_value == "1 qt"));
}

#[test]
fn conflict_keeps_complete_record_and_logs_one_discard() {
    let result = run(&[
        priced("FloraGro 1 gal", 0, ""),
        priced("FloraGro 1 gal", 2499, "FG-GAL"),
        priced("FloraGro 1 qt", 1299, "FG-QT"),
    ]);
    assert_eq!(result.stats.conflicts_discarded, 1);
    let gallon = result
        .rows()
        .find(|r| r.option1_value == "1 gal")
        .unwrap();
    assert_eq!(gallon.variant_sku, "FG-GAL");
    assert_eq!(gallon.price, Some(Decimal::new(2499, 2)));
    let conflicts: Vec<_> = result
        .events
        .iter()
        .filter(|e| matches!(e, DropEvent::SlotConflict { .. }))
        .collect();
    assert_eq!(conflicts.len(), 1);
}

#[test]
fn noise_member_dropped_sizes_unaffected() {
    let result = run(&[
        grouped("Widget A", &["Widget A 1 gal", "Widget A 5 gal", "Widget A Manual"]),
        priced("Widget A 1 gal", 1000, "WA1"),
        priced("Widget A 5 gal", 4000, "WA5"),
        record("Widget A Manual", ""),
    ]);
    assert_eq!(result.stats.noise_dropped, 1);
    assert_eq!(result.families[0].schema, OptionSchema::one(AxisName::Size));
    assert_eq!(option1_values(&result, 0), vec!["1 gal", "5 gal"]);
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, DropEvent::Noise { record, .. } if record == "Widget A Manual")));
}

#[test]
fn container_with_sku_and_price_is_not_emitted_as_a_variant() {
    let mut parent = grouped("Widget A", &["Widget A - 1 gal", "Widget A - 5 gal"]);
    parent.sku = Some("WA-GROUP".to_string());
    parent.price = Some(Decimal::new(4999, 2));
    let result = run(&[
        parent,
        record("Widget A - 1 gal", ""),
        record("Widget A - 5 gal", ""),
    ]);
    assert_eq!(result.families.len(), 1);
    assert_eq!(option1_values(&result, 0), vec!["1 gal", "5 gal"]);
    assert!(result.rows().all(|r| r.variant_sku != "WA-GROUP"));
    assert_eq!(result.families[0].title, "Widget A");
    assert_eq!(result.stats.containers, 1);
}

#[test]
fn two_axis_container_with_sku_keeps_only_children() {
    let mut parent = grouped("Nutrient Combo", &["FloraGro 1 qt", "FloraBloom 1 qt"]);
    parent.sku = Some("NC-KIT".to_string());
    let result = run(&[parent, record("FloraGro 1 qt", ""), record("FloraBloom 1 qt", "")]);
    let family = &result.families[0];
    assert_eq!(family.schema, OptionSchema::two(AxisName::Product, AxisName::Size));
    assert_eq!(option1_values(&result, 0), vec!["FloraGro", "FloraBloom"]);
    assert!(family.rows.iter().all(|r| r.option2_value == "1 qt"));
    assert_eq!(family.title, "Nutrient Combo");
}

#[test]
fn all_noise_container_family_still_emits_a_product() {
    let result = run(&[
        grouped("Kit", &["Thing A", "Thing B"]),
        record("Thing A", ""),
        record("Thing B", ""),
    ]);
    assert_eq!(result.families.len(), 1);
    assert_eq!(result.families[0].rows[0].option1_value, "Default Title");
    assert_eq!(result.stats.noise_dropped, 1);
}

#[test]
fn explicit_linkage_round_trip() {
    let result = run(&[
        grouped("Widget A", &["Widget A - 1 gal", "Widget A - 5 gal"]),
        record("Widget A - 1 gal", ""),
        record("Widget A - 5 gal", ""),
    ]);
    assert_eq!(result.families.len(), 1);
    let family = &result.families[0];
    assert_eq!(family.slots.len(), 2);
    assert_eq!(family.schema.axis1, AxisName::Size);
    assert_eq!(option1_values(&result, 0), vec!["1 gal", "5 gal"]);
    assert_eq!(family.title, "Widget A");
}

#[test]
fn unresolved_child_does_not_block_family() {
    let result = run(&[
        grouped("Kit", &["FloraGro 1 qt", "Ghost Product"]),
        priced("FloraGro 1 qt", 1299, "FG-QT"),
    ]);
    assert_eq!(result.stats.unresolved_children, 1);
    assert_eq!(result.families.len(), 1);
    assert!(result.events.contains(&DropEvent::UnresolvedChild {
        parent: "Kit".to_string(),
        child: "Ghost Product".to_string(),
    }));
}

// ---------------------------------------------------------------------------
// properties
// ---------------------------------------------------------------------------

fn mixed_catalog() -> Vec<RawRecord> {
    vec![
        grouped("Flora Series", &["FloraGro 1 qt", "FloraBloom 1 qt", "FloraMicro 1 qt"]),
        priced("FloraGro 1 qt", 1299, "FG-QT"),
        priced("FloraBloom 1 qt", 1299, "FB-QT"),
        priced("FloraMicro 1 qt", 1299, "FM-QT"),
        priced("FloraGro 1 gal", 2999, "FG-GAL"),
        priced("Cal-Mag 1 qt", 999, "CM-QT"),
        priced("Cal-Mag 1 qt", 999, ""),
        priced("Cal-Mag 1 gal", 2499, "CM-GAL"),
        priced("Trellis Net", 899, "TN"),
        priced("pH Down (8 oz)", 799, "PHD-8"),
        priced("pH Down (32 oz)", 1999, "PHD-32"),
        priced("Rockwool Cubes 50 pack", 1499, ""),
    ]
}

#[test]
fn option_slots_are_unique_per_family() {
    let result = run(&mixed_catalog());
    for family in &result.families {
        let mut seen = HashSet::new();
        for slot in &family.slots {
            assert!(
                seen.insert((slot.axis1_value.clone(), slot.axis2_value.clone())),
                "duplicate slot in {}",
                family.handle
            );
        }
    }
    assert!(result.validation.is_ready(), "{:?}", result.validation.issues);
}

#[test]
fn singletons_always_emit_default_title() {
    let result = run(&mixed_catalog());
    for family in result.families.iter().filter(|f| f.slots.len() == 1) {
        assert_eq!(family.rows[0].option1_name, "Title");
        assert_eq!(family.rows[0].option1_value, "Default Title");
    }
    let trellis = result.families.iter().find(|f| f.handle == "trellis-net").unwrap();
    assert_eq!(trellis.slots.len(), 1);
}

#[test]
fn exactly_one_primary_slot_per_family() {
    let result = run(&mixed_catalog());
    for family in &result.families {
        assert_eq!(family.slots.iter().filter(|s| s.is_primary).count(), 1);
        assert!(family.slots[0].is_primary);
        assert_eq!(family.rows.iter().filter(|r| r.is_title_row()).count(), 1);
    }
}

#[test]
fn every_record_is_accounted_for() {
    let records = mixed_catalog();
    let result = run(&records);
    let emitted: usize = result.families.iter().map(|f| f.slots.len()).sum();
    assert_eq!(
        emitted
            + result.stats.containers
            + result.stats.conflicts_discarded
            + result.stats.noise_dropped,
        records.len()
    );
}

#[test]
fn families_keep_first_seen_order_and_unique_handles() {
    let result = run(&mixed_catalog());
    let handles: Vec<&str> = result.families.iter().map(|f| f.handle.as_str()).collect();
    assert_eq!(
        handles,
        vec![
            "flora-series",
            "floragro-1-gal",
            "cal-mag",
            "trellis-net",
            "ph-down",
            "rockwool-cubes-50-pack"
        ]
    );
    assert_eq!(result.stats.rows_out, result.rows().count());
}

#[test]
fn empty_input_is_ready_and_empty() {
    let result = run(&[]);
    assert!(result.families.is_empty());
    assert!(result.validation.is_ready());
    assert_eq!(result.stats.records_in, 0);
}
