use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_defaults_when_env_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.tables_path, PathBuf::from("./config/tables.yaml"));
    assert_eq!(cfg.child_delimiter, "|~|");
    assert_eq!(cfg.weight_unit, WeightUnit::Pounds);
    assert_eq!(cfg.option_max_len, 40);
    assert_eq!(cfg.handle_max_len, 100);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("WOOMIG_LOG_LEVEL", "debug");
    map.insert("WOOMIG_TABLES_PATH", "/etc/woomig/tables.yaml");
    map.insert("WOOMIG_CHILD_DELIMITER", ";");
    map.insert("WOOMIG_WEIGHT_UNIT", "kg");
    map.insert("WOOMIG_OPTION_MAX_LEN", "60");
    map.insert("WOOMIG_HANDLE_MAX_LEN", "80");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(cfg.tables_path, PathBuf::from("/etc/woomig/tables.yaml"));
    assert_eq!(cfg.child_delimiter, ";");
    assert_eq!(cfg.weight_unit, WeightUnit::Kilograms);
    assert_eq!(cfg.option_max_len, 60);
    assert_eq!(cfg.handle_max_len, 80);
}

#[test]
fn build_app_config_rejects_unknown_weight_unit() {
    let mut map = HashMap::new();
    map.insert("WOOMIG_WEIGHT_UNIT", "stone");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOOMIG_WEIGHT_UNIT"),
        "expected InvalidEnvVar(WOOMIG_WEIGHT_UNIT), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_option_len() {
    let mut map = HashMap::new();
    map.insert("WOOMIG_OPTION_MAX_LEN", "forty");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOOMIG_OPTION_MAX_LEN"),
        "expected InvalidEnvVar(WOOMIG_OPTION_MAX_LEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_option_len_too_small_for_ellipsis() {
    let mut map = HashMap::new();
    map.insert("WOOMIG_OPTION_MAX_LEN", "3");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref reason, .. }) if reason.contains("at least 4")),
        "expected minimum-length rejection, got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_handle_len() {
    let mut map = HashMap::new();
    map.insert("WOOMIG_HANDLE_MAX_LEN", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOOMIG_HANDLE_MAX_LEN"),
        "expected InvalidEnvVar(WOOMIG_HANDLE_MAX_LEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_empty_delimiter() {
    let mut map = HashMap::new();
    map.insert("WOOMIG_CHILD_DELIMITER", "");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOOMIG_CHILD_DELIMITER"),
        "expected InvalidEnvVar(WOOMIG_CHILD_DELIMITER), got: {result:?}"
    );
}

#[test]
fn weight_unit_parses_aliases() {
    assert_eq!("LBS".parse::<WeightUnit>().unwrap(), WeightUnit::Pounds);
    assert_eq!("pound".parse::<WeightUnit>().unwrap(), WeightUnit::Pounds);
    assert_eq!("grams".parse::<WeightUnit>().unwrap(), WeightUnit::Grams);
    assert_eq!(" oz ".parse::<WeightUnit>().unwrap(), WeightUnit::Ounces);
}

#[test]
fn weight_unit_pounds_to_grams() {
    let grams = WeightUnit::Pounds.to_grams(2.0);
    assert!((grams - 907.184).abs() < 1e-9);
}

#[test]
fn weight_unit_display_roundtrips_through_parse() {
    for unit in [
        WeightUnit::Pounds,
        WeightUnit::Kilograms,
        WeightUnit::Grams,
        WeightUnit::Ounces,
    ] {
        assert_eq!(unit.to_string().parse::<WeightUnit>().unwrap(), unit);
    }
}
