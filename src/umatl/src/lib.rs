//! # umatl
//!
//! Story text extraction for game asset bundles, with translation merge.
//!
//! This library:
//! - Reads story, home and race dialogue out of decoded asset bundles
//! - Carries translations forward from previous exports by block index
//! - Writes one JSON document per story without clobbering translator work
//!
//! ## Example
//!
//! ```no_run
//! use umatl::{ContentType, DumpLoader, ExtractConfig, Extractor};
//! use umatl_meta::SqliteMeta;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let meta = SqliteMeta::open("meta")?;
//! let config = ExtractConfig::new(
//!     ContentType::Story,
//!     "dat",
//!     ExtractConfig::default_export_root(ContentType::Story),
//! );
//!
//! let summary = Extractor::new(config, meta, DumpLoader::new()).run(|_, _| {})?;
//! println!("{} written, {} skipped", summary.written, summary.skipped);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod content;
pub mod document;
pub mod driver;
pub mod export;
pub mod extract;
pub mod merge;
pub mod tree;

#[doc(inline)]
pub use content::{ContentType, StoryId};
#[doc(inline)]
pub use document::{Choice, ColoredText, DialogueDocument, TextBlock, FORMAT_VERSION};
#[doc(inline)]
pub use driver::{BatchSummary, ExtractConfig, Extractor, Processed, RecordFailure};
#[doc(inline)]
pub use export::{export, export_file_name, ExportOutcome};
#[doc(inline)]
pub use extract::extract;
#[doc(inline)]
pub use merge::{MergeStats, TranslationMerger};
#[doc(inline)]
pub use tree::{AssetObject, AssetTree, DecodeError, DumpLoader, TreeLoader};

/// Errors from extraction runs
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unsupported content type '{0}' (expected story, home or race)")]
    UnsupportedContentType(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Root object of {0} has no typetree")]
    Unextractable(String),

    #[error("Asset path too short for a story id: {0}")]
    InvalidStoryPath(String),

    #[error("Metadata index error: {0}")]
    Meta(#[from] umatl_meta::MetaError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}
