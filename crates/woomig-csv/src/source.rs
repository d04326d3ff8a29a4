//! WooCommerce product export → [`RawRecord`]s.
//!
//! Rows that cannot be turned into a usable record are counted and skipped;
//! only a failure to read the input at all is an error.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use csv::StringRecord;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use woomig_core::{AppConfig, RawRecord, WeightUnit};
use woomig_engine::slugify;

use crate::{field, find_column, open_file, CsvError};

static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid markup regex"));

/// How the export encodes child lists and weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    pub child_delimiter: String,
    pub weight_unit: WeightUnit,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            child_delimiter: "|~|".to_string(),
            weight_unit: WeightUnit::Pounds,
        }
    }
}

impl From<&AppConfig> for SourceOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            child_delimiter: config.child_delimiter.clone(),
            weight_unit: config.weight_unit,
        }
    }
}

/// A source row that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRecord {
    /// 1-based line in the input file (the header is line 1).
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub records: Vec<RawRecord>,
    pub malformed: Vec<MalformedRecord>,
}

const NAME: &[&str] = &["Name"];
const SKU: &[&str] = &["SKU"];
const REGULAR_PRICE: &[&str] = &["Regular price", "Price"];
const SALE_PRICE: &[&str] = &["Sale price"];
const STOCK: &[&str] = &["Stock", "Stock quantity"];
const VENDOR: &[&str] = &["Brands", "Brand", "Vendor"];
const CATEGORIES: &[&str] = &["Categories"];
const TAGS: &[&str] = &["Tags"];
const DESCRIPTION: &[&str] = &["Description"];
const SHORT_DESCRIPTION: &[&str] = &["Short description"];
const IMAGES: &[&str] = &["Images"];
const GROUPED_PRODUCTS: &[&str] = &["Grouped products"];
const BARCODE: &[&str] = &["GTIN, UPC, EAN, or ISBN", "GTIN", "Barcode"];

/// Weight headers and the unit each one declares; a bare `Weight` column is
/// in the configured unit.
const WEIGHT: &[(&str, Option<WeightUnit>)] = &[
    ("Weight (lbs)", Some(WeightUnit::Pounds)),
    ("Weight (kg)", Some(WeightUnit::Kilograms)),
    ("Weight (g)", Some(WeightUnit::Grams)),
    ("Weight (oz)", Some(WeightUnit::Ounces)),
    ("Weight", None),
];

/// Column positions resolved once from the header row. When an export
/// carries several spellings of one column, the first listed spelling wins.
#[derive(Debug)]
struct Columns {
    name: usize,
    sku: Option<usize>,
    regular_price: Option<usize>,
    sale_price: Option<usize>,
    stock: Option<usize>,
    weight: Option<(usize, WeightUnit)>,
    vendor: Option<usize>,
    categories: Option<usize>,
    tags: Option<usize>,
    description: Option<usize>,
    short_description: Option<usize>,
    images: Option<usize>,
    grouped_products: Option<usize>,
    barcode: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, options: &SourceOptions) -> Result<Self, CsvError> {
        let name = find_column(headers, NAME).ok_or_else(|| CsvError::MissingColumn {
            context: "source".to_string(),
            column: "Name",
        })?;
        let weight = WEIGHT.iter().find_map(|(header, unit)| {
            let index = find_column(headers, &[*header])?;
            Some((index, unit.unwrap_or(options.weight_unit)))
        });
        Ok(Self {
            name,
            sku: find_column(headers, SKU),
            regular_price: find_column(headers, REGULAR_PRICE),
            sale_price: find_column(headers, SALE_PRICE),
            stock: find_column(headers, STOCK),
            weight,
            vendor: find_column(headers, VENDOR),
            categories: find_column(headers, CATEGORIES),
            tags: find_column(headers, TAGS),
            description: find_column(headers, DESCRIPTION),
            short_description: find_column(headers, SHORT_DESCRIPTION),
            images: find_column(headers, IMAGES),
            grouped_products: find_column(headers, GROUPED_PRODUCTS),
            barcode: find_column(headers, BARCODE),
        })
    }
}

/// Reads a WooCommerce export from any reader.
///
/// # Errors
///
/// Returns [`CsvError::Csv`] if the header or the underlying stream cannot be
/// read, and [`CsvError::MissingColumn`] if there is no `Name` column.
pub fn read_source<R: Read>(reader: R, options: &SourceOptions) -> Result<SourceTable, CsvError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| CsvError::csv("source header", e))?
        .clone();
    let columns = Columns::resolve(&headers, options)?;

    let mut table = SourceTable::default();
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(CsvError::csv("source", e)),
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                skip(&mut table, line, format!("unreadable row: {e}"));
                continue;
            }
        };
        let line = record.position().map_or(0, csv::Position::line);
        match to_record(&record, &columns, options) {
            Ok(raw) => table.records.push(raw),
            Err(reason) => skip(&mut table, line, reason),
        }
    }

    tracing::info!(
        records = table.records.len(),
        malformed = table.malformed.len(),
        "source loaded"
    );
    Ok(table)
}

/// Reads a WooCommerce export from a file.
///
/// # Errors
///
/// Returns [`CsvError::SourceUnavailable`] if the file cannot be opened, or
/// any error from [`read_source`].
pub fn read_source_file(path: &Path, options: &SourceOptions) -> Result<SourceTable, CsvError> {
    read_source(open_file(path)?, options)
}

fn skip(table: &mut SourceTable, line: u64, reason: String) {
    tracing::warn!(line, reason = %reason, "skipping malformed source row");
    table.malformed.push(MalformedRecord { line, reason });
}

fn to_record(
    record: &StringRecord,
    columns: &Columns,
    options: &SourceOptions,
) -> Result<RawRecord, String> {
    let get = |index: Option<usize>| field(record, index);

    let name = get(Some(columns.name)).ok_or("empty product name")?;
    if MARKUP_RE.is_match(&name) {
        return Err(format!("markup in product name: {name}"));
    }
    if slugify(&name, usize::MAX).is_empty() {
        return Err(format!("product name has no usable characters: {name}"));
    }

    let regular = parse_decimal(get(columns.regular_price).as_deref());
    let sale = parse_decimal(get(columns.sale_price).as_deref());
    let (price, compare_at_price) = match (regular, sale) {
        (Some(regular), Some(sale)) if sale < regular => (Some(sale), Some(regular)),
        (Some(regular), _) => (Some(regular), None),
        (None, sale) => (sale, None),
    };

    let explicit_children = get(columns.grouped_products)
        .map(|list| {
            list.split(options.child_delimiter.as_str())
                .map(str::trim)
                .filter(|child| !child.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let weight_grams = columns.weight.and_then(|(index, unit)| {
        parse_number(get(Some(index)).as_deref())
            .filter(|w| *w > 0.0)
            .map(|w| unit.to_grams(w))
    });

    Ok(RawRecord {
        name,
        sku: get(columns.sku),
        price,
        compare_at_price,
        stock_qty: parse_stock(get(columns.stock).as_deref()),
        weight_grams,
        barcode: get(columns.barcode),
        vendor: get(columns.vendor),
        category_path: get(columns.categories),
        tags: get(columns.tags),
        description: get(columns.description).or_else(|| get(columns.short_description)),
        image_url: get(columns.images).and_then(|images| {
            images
                .split(',')
                .map(str::trim)
                .find(|url| !url.is_empty())
                .map(str::to_string)
        }),
        explicit_children,
    })
}

fn clean_number(raw: Option<&str>) -> Option<String> {
    let cleaned: String = raw?
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn parse_decimal(raw: Option<&str>) -> Option<Decimal> {
    let cleaned = clean_number(raw)?;
    match Decimal::from_str(&cleaned) {
        Ok(value) if value >= Decimal::ZERO => Some(value),
        Ok(_) | Err(_) => {
            tracing::debug!(value = %cleaned, "ignoring unparseable price");
            None
        }
    }
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    clean_number(raw)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[allow(clippy::cast_possible_truncation)]
fn parse_stock(raw: Option<&str>) -> Option<i64> {
    let cleaned = clean_number(raw)?;
    cleaned
        .parse::<i64>()
        .ok()
        .or_else(|| cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
