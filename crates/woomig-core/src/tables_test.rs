use std::path::Path;

use super::*;

fn rule(pattern: &str, label: &str) -> PatternLabel {
    PatternLabel {
        pattern: pattern.to_string(),
        label: label.to_string(),
    }
}

#[test]
fn validate_accepts_small_table() {
    let tables = TablesFile {
        brands: vec![rule(r"(?i)\bflora(gro|bloom|micro)\b", "General Hydroponics")],
        categories: vec![rule(r"(?i)\bnutrient", "Nutrients")],
        weights: vec![CategoryValue {
            category: r"(?i)nutrient".to_string(),
            value: 1200.0,
        }],
        prices: vec![CategoryValue {
            category: r"(?i)nutrient".to_string(),
            value: Decimal::new(1999, 2),
        }],
        placeholders: Placeholders::default(),
    };
    assert!(validate_tables(&tables).is_ok());
}

#[test]
fn validate_rejects_invalid_regex() {
    let tables = TablesFile {
        brands: vec![rule("(unclosed", "Broken")],
        ..TablesFile::default()
    };
    let err = validate_tables(&tables).unwrap_err();
    assert!(err.to_string().contains("is invalid"));
}

#[test]
fn validate_rejects_empty_label() {
    let tables = TablesFile {
        categories: vec![rule("(?i)lights?", "  ")],
        ..TablesFile::default()
    };
    let err = validate_tables(&tables).unwrap_err();
    assert!(err.to_string().contains("empty label"));
}

#[test]
fn validate_rejects_duplicate_pattern() {
    let tables = TablesFile {
        brands: vec![rule("(?i)fox ?farm", "FoxFarm"), rule("(?i)fox ?farm", "Fox Farm")],
        ..TablesFile::default()
    };
    let err = validate_tables(&tables).unwrap_err();
    assert!(err.to_string().contains("duplicate brands pattern"));
}

#[test]
fn validate_rejects_non_positive_weight() {
    let tables = TablesFile {
        weights: vec![CategoryValue {
            category: "(?i)soil".to_string(),
            value: 0.0,
        }],
        ..TablesFile::default()
    };
    let err = validate_tables(&tables).unwrap_err();
    assert!(err.to_string().contains("non-positive"));
}

#[test]
fn validate_rejects_invalid_placeholder_pattern() {
    let tables = TablesFile {
        placeholders: Placeholders {
            sku: vec!["[".to_string()],
            image: vec![],
        },
        ..TablesFile::default()
    };
    assert!(validate_tables(&tables).is_err());
}

#[test]
fn missing_sections_default_when_parsing() {
    let tables: TablesFile = serde_yaml::from_str("brands: []\n").unwrap();
    assert!(tables.categories.is_empty());
    assert_eq!(tables.placeholders, Placeholders::default());
}

#[test]
fn load_tables_reports_missing_file() {
    let err = load_tables(Path::new("/nonexistent/woomig/tables.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::TablesFileIo { .. }));
}

#[test]
fn load_tables_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("tables.yaml");
    assert!(
        path.exists(),
        "tables.yaml missing at {path:?}; required for this test"
    );
    let result = load_tables(&path);
    assert!(result.is_ok(), "failed to load tables.yaml: {result:?}");
    let tables = result.unwrap();
    assert!(!tables.brands.is_empty());
    assert!(!tables.categories.is_empty());
}
