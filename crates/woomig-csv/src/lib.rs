//! CSV boundary of the pipeline: WooCommerce export in, Shopify product
//! import out, plus the backup image catalog.

pub mod catalog;
pub mod images;
pub mod source;

use thiserror::Error;

pub use catalog::{read_catalog, read_catalog_file, write_catalog, write_catalog_file};
pub use images::{read_image_catalog, read_image_catalog_file};
pub use source::{read_source, read_source_file, MalformedRecord, SourceOptions, SourceTable};

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("cannot access {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("{context} is missing required column \"{column}\"")]
    MissingColumn {
        context: String,
        column: &'static str,
    },
}

impl CsvError {
    fn csv(context: &str, source: csv::Error) -> Self {
        CsvError::Csv {
            context: context.to_string(),
            source,
        }
    }
}

/// Position of the first of `names` present in `headers`. Names are tried in
/// the order given, so a preferred spelling wins over an alias regardless of
/// where either sits in the file.
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
}

/// Trimmed, non-empty text of column `index` in `record`.
fn field(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    let value = record.get(index?)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn open_file(path: &std::path::Path) -> Result<std::fs::File, CsvError> {
    std::fs::File::open(path).map_err(|source| CsvError::SourceUnavailable {
        path: path.display().to_string(),
        source,
    })
}

fn create_file(path: &std::path::Path) -> Result<std::fs::File, CsvError> {
    std::fs::File::create(path).map_err(|source| CsvError::SourceUnavailable {
        path: path.display().to_string(),
        source,
    })
}
