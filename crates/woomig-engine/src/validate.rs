//! Post-emission structural checks over catalog rows.
//!
//! Validation only reports; it never edits the rows it flags.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use woomig_core::CatalogRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// A row of a product leaves an option value blank while the product
    /// declares that option.
    MissingOptionValue {
        handle: String,
        row: usize,
        option: u8,
    },
    /// Two rows of one product carry the same option combination.
    DuplicateOptions {
        handle: String,
        option1: String,
        option2: String,
    },
    /// A product has zero or several rows carrying a title.
    TitleRowCount { handle: String, count: usize },
    MissingHandle { row: usize },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::MissingOptionValue { handle, row, option } => {
                write!(f, "{handle}: row {row} has no Option{option} Value")
            }
            ValidationIssue::DuplicateOptions {
                handle,
                option1,
                option2,
            } => {
                if option2.is_empty() {
                    write!(f, "{handle}: duplicate option combination \"{option1}\"")
                } else {
                    write!(
                        f,
                        "{handle}: duplicate option combination \"{option1}\" / \"{option2}\""
                    )
                }
            }
            ValidationIssue::TitleRowCount { handle, count } => {
                write!(f, "{handle}: expected exactly one title row, found {count}")
            }
            ValidationIssue::MissingHandle { row } => write!(f, "row {row} has no handle"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub rows_checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// `true` when no issue was found and the output may be imported.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }
}

struct Product<'a> {
    handle: &'a str,
    /// 1-based row numbers paired with the rows.
    rows: Vec<(usize, &'a CatalogRow)>,
}

/// Checks every product in `rows` and reports all issues, not just the first.
///
/// Row numbers in issues are 1-based positions among the data rows.
#[must_use]
pub fn validate_rows(rows: &[CatalogRow]) -> ValidationReport {
    let mut issues = Vec::new();
    let mut products: Vec<Product<'_>> = Vec::new();
    let mut by_handle: HashMap<&str, usize> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 1;
        let handle = row.handle.trim();
        if handle.is_empty() {
            issues.push(ValidationIssue::MissingHandle { row: row_number });
            continue;
        }
        let slot = *by_handle.entry(handle).or_insert_with(|| {
            products.push(Product {
                handle,
                rows: Vec::new(),
            });
            products.len() - 1
        });
        products[slot].rows.push((row_number, row));
    }

    for product in &products {
        check_product(product, &mut issues);
    }

    if !issues.is_empty() {
        tracing::warn!(issues = issues.len(), "validation found problems");
    }

    ValidationReport {
        rows_checked: rows.len(),
        issues,
    }
}

fn check_product(product: &Product<'_>, issues: &mut Vec<ValidationIssue>) {
    let handle = product.handle;
    let title_rows: Vec<&CatalogRow> = product
        .rows
        .iter()
        .map(|(_, row)| *row)
        .filter(|row| row.is_title_row())
        .collect();
    if title_rows.len() != 1 {
        issues.push(ValidationIssue::TitleRowCount {
            handle: handle.to_string(),
            count: title_rows.len(),
        });
    }

    // Option names live on the title row; without one, fall back to the first row.
    let names_row = title_rows
        .first()
        .copied()
        .or_else(|| product.rows.first().map(|(_, row)| *row));
    let Some(names_row) = names_row else {
        return;
    };
    let declares_option1 = !names_row.option1_name.trim().is_empty();
    let declares_option2 = !names_row.option2_name.trim().is_empty();

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut reported: HashSet<(&str, &str)> = HashSet::new();
    for &(row_number, row) in &product.rows {
        let option1 = row.option1_value.trim();
        let option2 = row.option2_value.trim();
        if declares_option1 && option1.is_empty() {
            issues.push(ValidationIssue::MissingOptionValue {
                handle: handle.to_string(),
                row: row_number,
                option: 1,
            });
        }
        if declares_option2 && option2.is_empty() {
            issues.push(ValidationIssue::MissingOptionValue {
                handle: handle.to_string(),
                row: row_number,
                option: 2,
            });
        }
        if !seen.insert((option1, option2)) && reported.insert((option1, option2)) {
            issues.push(ValidationIssue::DuplicateOptions {
                handle: handle.to_string(),
                option1: option1.to_string(),
                option2: option2.to_string(),
            });
        }
    }
}
