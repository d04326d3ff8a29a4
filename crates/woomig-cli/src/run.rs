//! Command handlers. Each returns whether the result is ready for import.

use std::path::{Path, PathBuf};

use anyhow::Context;
use woomig_core::{load_tables, AppConfig, TablesFile};
use woomig_csv::{
    read_catalog_file, read_image_catalog_file, read_source_file, write_catalog_file,
    SourceOptions,
};
use woomig_engine::{
    consolidate, validate_rows, Consolidation, EngineSettings, Enrichment, ValidationReport,
};

use crate::report::RunReport;

/// Drop events listed individually in the summary before it switches to a count.
const EVENTS_SHOWN: usize = 20;

#[derive(Debug)]
pub(crate) struct ConsolidateArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tables: Option<PathBuf>,
    pub images: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// Reads the export, consolidates it, writes the import file and prints the
/// summary. Output is written even when validation fails.
///
/// # Errors
///
/// Returns an error if any input cannot be read or any output cannot be written.
pub(crate) fn run_consolidate(config: &AppConfig, args: &ConsolidateArgs) -> anyhow::Result<bool> {
    let tables = resolve_tables(config, args.tables.as_deref())?;
    let mut enrichment =
        Enrichment::from_tables(&tables).context("failed to compile lookup tables")?;
    if let Some(path) = &args.images {
        let catalog = read_image_catalog_file(path)
            .with_context(|| format!("failed to load image catalog {}", path.display()))?;
        enrichment = enrichment.with_images(catalog);
    }

    let source = read_source_file(&args.input, &SourceOptions::from(config))
        .with_context(|| format!("failed to read source {}", args.input.display()))?;

    let mut result = consolidate(&source.records, &enrichment, &EngineSettings::from(config));
    result.stats.malformed_records = source.malformed.len();

    write_catalog_file(&args.output, result.rows())
        .with_context(|| format!("failed to write output {}", args.output.display()))?;

    print_summary(&result, &args.output);
    print_validation(&result.validation);

    if let Some(path) = &args.report {
        let report = RunReport::new(&args.input, &args.output, &result, &source.malformed);
        report
            .write_to(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("report written to {}", path.display());
    }

    Ok(result.validation.is_ready())
}

/// Re-runs the post-emission checks over an existing import file.
///
/// # Errors
///
/// Returns an error if the file cannot be read as a catalog CSV.
pub(crate) fn run_validate(input: &Path) -> anyhow::Result<bool> {
    let rows = read_catalog_file(input)
        .with_context(|| format!("failed to read catalog {}", input.display()))?;
    let validation = validate_rows(&rows);
    println!("checked {} rows in {}", validation.rows_checked, input.display());
    print_validation(&validation);
    Ok(validation.is_ready())
}

/// An explicit `--tables` path must exist; the configured default may be
/// absent, in which case enrichment runs with empty tables.
fn resolve_tables(config: &AppConfig, explicit: Option<&Path>) -> anyhow::Result<TablesFile> {
    let path = match explicit {
        Some(path) => path,
        None if config.tables_path.exists() => config.tables_path.as_path(),
        None => {
            tracing::warn!(
                path = %config.tables_path.display(),
                "tables file not found; classification and estimates disabled"
            );
            return Ok(TablesFile::default());
        }
    };
    load_tables(path).with_context(|| format!("failed to load tables {}", path.display()))
}

fn print_summary(result: &Consolidation, output: &Path) {
    let stats = &result.stats;
    println!("wrote {} rows for {} products to {}", stats.rows_out, stats.families, output.display());
    println!("  source records:        {}", stats.records_in);
    println!("  malformed rows:        {}", stats.malformed_records);
    println!("  multi-variant products: {}", stats.multi_variant_families);
    println!("  grouped containers:    {}", stats.containers);
    println!("  unresolved children:   {}", stats.unresolved_children);
    println!("  duplicate claims:      {}", stats.duplicate_claims);
    println!("  slot conflicts:        {}", stats.conflicts_discarded);
    println!("  noise dropped:         {}", stats.noise_dropped);
    println!("  Default -> Standard:   {}", stats.defaults_relabeled);
    let e = &stats.enrichment;
    println!(
        "  enrichment:            {} vendors, {} categories, {} weights, {} prices, {} images",
        e.vendors_classified,
        e.categories_classified,
        e.weights_estimated,
        e.prices_estimated,
        e.images_resolved
    );

    if !result.events.is_empty() {
        println!();
        println!("dropped / merged:");
        for event in result.events.iter().take(EVENTS_SHOWN) {
            println!("  - {event}");
        }
        if result.events.len() > EVENTS_SHOWN {
            println!(
                "  ... and {} more (see --report)",
                result.events.len() - EVENTS_SHOWN
            );
        }
    }
}

fn print_validation(validation: &ValidationReport) {
    println!();
    if validation.is_ready() {
        println!("VALIDATION: PASS ({} rows)", validation.rows_checked);
        return;
    }
    println!(
        "VALIDATION: FAIL ({} issues in {} rows); output is not ready for import",
        validation.issues.len(),
        validation.rows_checked
    );
    for issue in &validation.issues {
        println!("  - {issue}");
    }
}
