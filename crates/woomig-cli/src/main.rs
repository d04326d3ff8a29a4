mod report;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "woomig")]
#[command(about = "Consolidate a WooCommerce product export into a Shopify import")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Group, resolve and emit the source catalog as Shopify rows
    Consolidate {
        /// WooCommerce product export (CSV)
        #[arg(long)]
        input: PathBuf,
        /// Shopify product import to write (CSV)
        #[arg(long)]
        output: PathBuf,
        /// Lookup tables; defaults to `WOOMIG_TABLES_PATH`
        #[arg(long)]
        tables: Option<PathBuf>,
        /// Backup image catalog (`handle,image_url` CSV)
        #[arg(long)]
        images: Option<PathBuf>,
        /// Write a JSON run report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Re-check an existing Shopify import file
    Validate {
        #[arg(long)]
        input: PathBuf,
    },
}

/// Exit status when output was written but failed validation.
const EXIT_NOT_READY: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    let config = woomig_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ready = match cli.command {
        Commands::Consolidate {
            input,
            output,
            tables,
            images,
            report,
        } => run::run_consolidate(
            &config,
            &run::ConsolidateArgs {
                input,
                output,
                tables,
                images,
                report,
            },
        )?,
        Commands::Validate { input } => run::run_validate(&input)?,
    };

    Ok(if ready {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_READY)
    })
}
