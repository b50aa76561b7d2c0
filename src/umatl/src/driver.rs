//! Batch extraction: index query, bundle lookup, extract, merge, export
//!
//! Records are processed one at a time. A failing record is reported and
//! the batch moves on; only a failed index query stops the run.

use std::path::{Path, PathBuf};

use umatl_meta::{AssetRecord, MetaIndex};

use crate::content::{ContentType, StoryId};
use crate::export::{
    export, export_file_name, find_existing_export, remove_stale_exports, ExportOutcome,
};
use crate::extract::extract;
use crate::merge::{MergeStats, TranslationMerger};
use crate::tree::TreeLoader;
use crate::Error;

/// Group filter matching every group
pub const ANY_GROUP: &str = "__";
/// Id filter matching every id
pub const ANY_ID: &str = "____";

/// Settings for one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    pub content_type: ContentType,
    /// Two-character group filter (`_` matches any character)
    pub group: String,
    /// Four-character id filter (`_` matches any character)
    pub id: String,
    /// Maximum number of index records; `None` for all
    pub limit: Option<u32>,
    /// Root of the game's asset store
    pub asset_root: PathBuf,
    /// Root of the export tree for this content type
    pub export_root: PathBuf,
    pub overwrite: bool,
}

impl ExtractConfig {
    pub fn new(
        content_type: ContentType,
        asset_root: impl Into<PathBuf>,
        export_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            content_type,
            group: ANY_GROUP.to_string(),
            id: ANY_ID.to_string(),
            limit: None,
            asset_root: asset_root.into(),
            export_root: export_root.into(),
            overwrite: false,
        }
    }

    /// `translations/<type>`
    pub fn default_export_root(content_type: ContentType) -> PathBuf {
        Path::new("translations").join(content_type.as_str())
    }

    pub fn query_pattern(&self) -> String {
        self.content_type.query_pattern(&self.group, &self.id)
    }

    /// Bundles live at `<asset_root>/<first two chars>/<bundle>`
    pub fn bundle_path(&self, bundle: &str) -> PathBuf {
        let prefix = bundle.get(..2).unwrap_or(bundle);
        self.asset_root.join(prefix).join(bundle)
    }
}

/// Result of processing one record successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processed {
    Written { path: PathBuf, merge: MergeStats },
    /// An export already existed and overwrite was off
    Skipped { path: PathBuf },
}

/// A record that could not be processed
#[derive(Debug)]
pub struct RecordFailure {
    pub record: AssetRecord,
    pub error: Error,
}

/// Totals for a batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub found: usize,
    pub written: usize,
    pub skipped: usize,
    pub failures: Vec<RecordFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, record: AssetRecord, result: Result<Processed, Error>) {
        match result {
            Ok(Processed::Written { .. }) => self.written += 1,
            Ok(Processed::Skipped { .. }) => self.skipped += 1,
            Err(error) => self.failures.push(RecordFailure { record, error }),
        }
    }
}

/// Runs the extraction pipeline over index records
pub struct Extractor<M, L> {
    config: ExtractConfig,
    index: M,
    loader: L,
    merger: TranslationMerger,
}

impl<M: MetaIndex, L: TreeLoader> Extractor<M, L> {
    pub fn new(config: ExtractConfig, index: M, loader: L) -> Self {
        let merger = TranslationMerger::new(&config.export_root);
        Self {
            config,
            index,
            loader,
            merger,
        }
    }

    /// Index records matching the configured filters
    pub fn list(&self) -> Result<Vec<AssetRecord>, Error> {
        let pattern = self.config.query_pattern();
        let records = self.index.query(&pattern, self.config.limit)?;
        tracing::info!(pattern = %pattern, count = records.len(), "queried metadata index");
        Ok(records)
    }

    /// Process every matching record. `observer` sees each record's result
    /// as it completes.
    pub fn run<F>(&self, observer: F) -> Result<BatchSummary, Error>
    where
        F: FnMut(&AssetRecord, &Result<Processed, Error>),
    {
        let records = self.list()?;
        Ok(self.process_all(records, observer))
    }

    /// Process already-queried records
    pub fn process_all<F>(&self, records: Vec<AssetRecord>, mut observer: F) -> BatchSummary
    where
        F: FnMut(&AssetRecord, &Result<Processed, Error>),
    {
        let mut summary = BatchSummary {
            found: records.len(),
            ..BatchSummary::default()
        };

        for record in records {
            let result = self.process(&record);
            if let Err(e) = &result {
                tracing::error!(path = %record.path, bundle = %record.bundle, "{e}");
            }
            observer(&record, &result);
            summary.record(record, result);
        }

        tracing::info!(
            found = summary.found,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failures.len(),
            "batch finished"
        );
        summary
    }

    /// Extract, merge and export a single record
    pub fn process(&self, record: &AssetRecord) -> Result<Processed, Error> {
        let cfg = &self.config;
        let story = StoryId::from_asset_path(cfg.content_type, &record.path)?;
        let dir = story.export_dir(&cfg.export_root);

        if !cfg.overwrite {
            if let Some(path) = find_existing_export(&dir, &story.index) {
                tracing::info!(
                    "Skipping existing: {}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                );
                return Ok(Processed::Skipped { path });
            }
        }

        let bundle_path = cfg.bundle_path(&record.bundle);
        let tree = self.loader.load(&bundle_path)?;
        let mut doc = extract(cfg.content_type, tree.as_ref())?
            .ok_or_else(|| Error::Unextractable(record.path.clone()))?;

        let merge = self.merger.merge_document(&story, &mut doc)?;

        let path = dir.join(export_file_name(&story.index, &doc.title));
        match export(&doc, &path, cfg.overwrite)? {
            ExportOutcome::Written => {
                remove_stale_exports(&dir, &story.index, &path)?;
                Ok(Processed::Written { path, merge })
            }
            ExportOutcome::Skipped => Ok(Processed::Skipped { path }),
        }
    }
}
