//! JSON run report written by `consolidate --report`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use woomig_csv::MalformedRecord;
use woomig_engine::{Consolidation, DropEvent, RunStats, ValidationReport};

#[derive(Debug, Serialize)]
pub(crate) struct RunReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub output: String,
    pub ready: bool,
    pub stats: &'a RunStats,
    pub malformed: &'a [MalformedRecord],
    pub events: &'a [DropEvent],
    pub validation: &'a ValidationReport,
}

impl<'a> RunReport<'a> {
    pub(crate) fn new(
        input: &Path,
        output: &Path,
        result: &'a Consolidation,
        malformed: &'a [MalformedRecord],
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            input: input.display().to_string(),
            output: output.display().to_string(),
            ready: result.validation.is_ready(),
            stats: &result.stats,
            malformed,
            events: &result.events,
            validation: &result.validation,
        }
    }

    pub(crate) fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
