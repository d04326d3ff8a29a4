//! Backup image catalog: a `handle,image_url` CSV from an earlier export.

use std::io::Read;
use std::path::Path;

use woomig_engine::BackupImageCatalog;

use crate::{field, find_column, open_file, CsvError};

const HANDLE: &[&str] = &["handle"];
const IMAGE_URL: &[&str] = &["image_url", "Image Src", "image"];

/// # Errors
///
/// Returns [`CsvError::MissingColumn`] if either column is absent and
/// [`CsvError::Csv`] if the input is not CSV.
pub fn read_image_catalog<R: Read>(reader: R) -> Result<BackupImageCatalog, CsvError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| CsvError::csv("image catalog header", e))?
        .clone();
    let missing = |column| CsvError::MissingColumn {
        context: "image catalog".to_string(),
        column,
    };
    let handle = find_column(&headers, HANDLE).ok_or_else(|| missing("handle"))?;
    let image_url = find_column(&headers, IMAGE_URL).ok_or_else(|| missing("image_url"))?;

    let mut entries = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| CsvError::csv("image catalog", e))?;
        if let (Some(h), Some(url)) = (field(&record, Some(handle)), field(&record, Some(image_url))) {
            entries.push((h, url));
        }
    }
    Ok(BackupImageCatalog::new(entries))
}

/// # Errors
///
/// Returns [`CsvError::SourceUnavailable`] if the file cannot be opened, or
/// any error from [`read_image_catalog`].
pub fn read_image_catalog_file(path: &Path) -> Result<BackupImageCatalog, CsvError> {
    let catalog = read_image_catalog(open_file(path)?)?;
    tracing::info!(path = %path.display(), images = catalog.len(), "backup image catalog loaded");
    Ok(catalog)
}
