//! Index trait and record types.

use serde::{Deserialize, Serialize};

/// Error type for index lookups
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Metadata file not found: {0}")]
    NotFound(String),
}

/// Result type for index lookups
pub type MetaResult<T> = Result<T, MetaError>;

/// One row of the metadata index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Bundle file name (hash) as stored in the asset directory
    pub bundle: String,
    /// Logical asset path
    pub path: String,
}

impl AssetRecord {
    pub fn new(bundle: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            bundle: bundle.into(),
            path: path.into(),
        }
    }
}

/// Read-only lookup from logical asset paths to bundles
pub trait MetaIndex {
    /// Find records whose logical path matches a SQL `LIKE` pattern.
    ///
    /// `_` matches exactly one character and `%` any run of characters.
    /// `limit` of `None` returns every match.
    fn query(&self, pattern: &str, limit: Option<u32>) -> MetaResult<Vec<AssetRecord>>;
}

impl<T: MetaIndex + ?Sized> MetaIndex for &T {
    fn query(&self, pattern: &str, limit: Option<u32>) -> MetaResult<Vec<AssetRecord>> {
        (**self).query(pattern, limit)
    }
}
