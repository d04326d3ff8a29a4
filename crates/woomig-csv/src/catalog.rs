//! Shopify product import CSV: one [`CatalogRow`] per variant.

use std::io::{Read, Write};
use std::path::Path;

use woomig_core::CatalogRow;

use crate::{create_file, open_file, CsvError};

/// Writes rows with a header line; returns how many rows were written.
///
/// # Errors
///
/// Returns [`CsvError::Csv`] if a row cannot be serialized or written.
pub fn write_catalog<'r, W: Write>(
    writer: W,
    rows: impl IntoIterator<Item = &'r CatalogRow>,
) -> Result<usize, CsvError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| CsvError::csv("catalog output", e))?;
        written += 1;
    }
    wtr.flush().map_err(|e| CsvError::csv("catalog output", e.into()))?;
    Ok(written)
}

/// # Errors
///
/// Returns [`CsvError::SourceUnavailable`] if the file cannot be created, or
/// any error from [`write_catalog`].
pub fn write_catalog_file<'r>(
    path: &Path,
    rows: impl IntoIterator<Item = &'r CatalogRow>,
) -> Result<usize, CsvError> {
    let written = write_catalog(create_file(path)?, rows)?;
    tracing::info!(path = %path.display(), rows = written, "catalog written");
    Ok(written)
}

/// Reads a previously written catalog back for validation.
///
/// # Errors
///
/// Returns [`CsvError::Csv`] if the input is not a readable catalog CSV.
pub fn read_catalog<R: Read>(reader: R) -> Result<Vec<CatalogRow>, CsvError> {
    csv::Reader::from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<CatalogRow>, _>>()
        .map_err(|e| CsvError::csv("catalog input", e))
}

/// # Errors
///
/// Returns [`CsvError::SourceUnavailable`] if the file cannot be opened, or
/// any error from [`read_catalog`].
pub fn read_catalog_file(path: &Path) -> Result<Vec<CatalogRow>, CsvError> {
    read_catalog(open_file(path)?)
}
