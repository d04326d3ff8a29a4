//! Lookup tables injected into the pipeline: brand and category classifier
//! rules, estimator fallbacks, and placeholder detectors.
//!
//! The production tables live in `config/tables.yaml`; tests build small
//! [`TablesFile`] values directly.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A regex paired with the label it assigns when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternLabel {
    pub pattern: String,
    pub label: String,
}

/// A category regex paired with a fallback value for records in that category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue<T> {
    pub category: String,
    pub value: T,
}

/// Regexes recognizing auto-generated SKUs and stock placeholder images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholders {
    #[serde(default)]
    pub sku: Vec<String>,
    #[serde(default)]
    pub image: Vec<String>,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            sku: vec![
                r"(?i)^(auto|gen|tmp|temp|grp|placeholder)[-_]".to_string(),
                r"(?i)^(woo|wc|sku)[-_]?\d+$".to_string(),
            ],
            image: vec![
                r"(?i)placeholder".to_string(),
                r"(?i)no[-_]?image".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablesFile {
    #[serde(default)]
    pub brands: Vec<PatternLabel>,
    #[serde(default)]
    pub categories: Vec<PatternLabel>,
    /// Fallback shipping weight in grams per category.
    #[serde(default)]
    pub weights: Vec<CategoryValue<f64>>,
    /// Fallback price per category.
    #[serde(default)]
    pub prices: Vec<CategoryValue<Decimal>>,
    #[serde(default)]
    pub placeholders: Placeholders,
}

/// Load and validate the lookup tables from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tables(path: &Path) -> Result<TablesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TablesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let tables: TablesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::TablesFileParse)?;

    validate_tables(&tables)?;

    Ok(tables)
}

/// Checks that every pattern compiles, labels are non-empty, and fallback
/// values are positive.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first problem found.
pub fn validate_tables(tables: &TablesFile) -> Result<(), ConfigError> {
    for (section, rules) in [("brands", &tables.brands), ("categories", &tables.categories)] {
        let mut seen = HashSet::new();
        for rule in rules {
            check_pattern(section, &rule.pattern)?;
            if rule.label.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{section} rule '{}' has an empty label",
                    rule.pattern
                )));
            }
            if !seen.insert(rule.pattern.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate {section} pattern: '{}'",
                    rule.pattern
                )));
            }
        }
    }

    for rule in &tables.weights {
        check_pattern("weights", &rule.category)?;
        if !(rule.value.is_finite() && rule.value > 0.0) {
            return Err(ConfigError::Validation(format!(
                "weights rule '{}' has non-positive value {}",
                rule.category, rule.value
            )));
        }
    }

    for rule in &tables.prices {
        check_pattern("prices", &rule.category)?;
        if rule.value <= Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "prices rule '{}' has non-positive value {}",
                rule.category, rule.value
            )));
        }
    }

    for pattern in tables
        .placeholders
        .sku
        .iter()
        .chain(&tables.placeholders.image)
    {
        check_pattern("placeholders", pattern)?;
    }

    Ok(())
}

fn check_pattern(section: &str, pattern: &str) -> Result<(), ConfigError> {
    if pattern.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{section} contains an empty pattern"
        )));
    }
    Regex::new(pattern).map_err(|e| {
        ConfigError::Validation(format!("{section} pattern '{pattern}' is invalid: {e}"))
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tests;
