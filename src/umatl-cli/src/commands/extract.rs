//! Extraction command handler

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use umatl::{BatchSummary, DumpLoader, ExtractConfig, Extractor, Processed};
use umatl_meta::SqliteMeta;

use crate::cli::ExtractArgs;
use crate::config::Config;

/// Build the run settings from flags and saved configuration
fn build_config(args: &ExtractArgs, config: &Config) -> ExtractConfig {
    let asset_root = config.resolve_asset_root(args.src.clone());
    let export_root = config.resolve_export_root(args.dst.clone(), args.content_type);

    let mut extract = ExtractConfig::new(args.content_type, asset_root, export_root);
    extract.group = args.group.clone();
    extract.id = args.id.clone();
    extract.limit = args.limit;
    extract.overwrite = args.overwrite;
    extract
}

/// Handle the extract command
pub fn handle(args: &ExtractArgs, config: &Config) -> Result<()> {
    let settings = build_config(args, config);
    let meta_path = config.resolve_meta_path(args.meta.clone());
    debug!(
        meta = %meta_path.display(),
        pattern = %settings.query_pattern(),
        "resolved extraction settings"
    );

    println!(
        "Extracting group {}, id {} (limit {}, overwrite: {})",
        settings.group,
        settings.id,
        settings
            .limit
            .map_or_else(|| "ALL".to_string(), |l| l.to_string()),
        settings.overwrite
    );
    println!(
        "from {} to {}",
        settings.asset_root.display(),
        settings.export_root.display()
    );

    let meta = SqliteMeta::open(&meta_path)
        .with_context(|| format!("Failed to open metadata index {}", meta_path.display()))?;
    let extractor = Extractor::new(settings, meta, DumpLoader::new());

    let records = extractor.list().context("Failed to query metadata index")?;
    println!("Found {} files.", records.len());

    if args.list {
        for record in &records {
            println!("{}  {}", record.bundle, record.path);
        }
        return Ok(());
    }

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let summary = extractor.process_all(records, |record, result| {
        match result {
            Ok(Processed::Skipped { path }) => pb.println(format!(
                "Skipping existing: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            )),
            Err(e) => pb.println(format!("Error {}: {e}", record.path)),
            Ok(Processed::Written { .. }) => {}
        }
        pb.set_message(record.path.clone());
        pb.inc(1);
    });

    pb.finish_and_clear();
    report(&summary)
}

fn report(summary: &BatchSummary) -> Result<()> {
    println!(
        "Written: {}, Skipped: {}, Failed: {}",
        summary.written,
        summary.skipped,
        summary.failures.len()
    );

    if summary.is_success() {
        println!("Processing finished successfully.");
        return Ok(());
    }

    for failure in &summary.failures {
        eprintln!("  {} ({}): {}", failure.record.path, failure.record.bundle, failure.error);
    }
    bail!("{} of {} files failed", summary.failures.len(), summary.found)
}
