//! Metadata index for game assets
//!
//! The game ships a SQLite `meta` file that maps logical asset paths
//! (`story/data/02/1001/storytimeline_021001001`) to the hashed bundle
//! names stored on disk. This crate exposes a small read-only trait over
//! that mapping, plus a rusqlite-backed implementation.
//!
//! # Features
//!
//! - `sqlite` (default) - Synchronous SQLite access using rusqlite
//!
//! # Example
//!
//! ```no_run
//! use umatl_meta::{MetaIndex, SqliteMeta};
//!
//! let meta = SqliteMeta::open("meta").unwrap();
//! for record in meta.query("story/data/02/%", None).unwrap() {
//!     println!("{} -> {}", record.path, record.bundle);
//! }
//! ```

pub mod index;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use index::{AssetRecord, MetaError, MetaIndex, MetaResult};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteMeta;
