//! Read-only view over decoded asset bundles
//!
//! Extraction never touches a container decoder directly. It walks objects
//! through [`AssetTree`] and [`AssetObject`], which expose the typetree of a
//! serialized object as a nested JSON-like mapping and resolve path ids to
//! sibling objects within the same bundle.
//!
//! [`DumpLoader`] is the shipped adapter: it reads typetree dumps, the JSON
//! rendering of a bundle produced by an external Unity decoder.
//!
//! ```text
//! {
//!   "name": "<bundle file name>",
//!   "root": { "pathId": 1, "type": "MonoBehaviour", "tree": { ... } },
//!   "objects": { "<pathId>": { "type": "MonoBehaviour", "tree": { ... } } }
//! }
//! ```
//!
//! A `null` or absent `tree` marks an object without schema.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Materialized fields of one object
pub type Fields = serde_json::Map<String, Value>;

/// Signature at the start of an undecoded Unity bundle
pub const UNITYFS_MAGIC: &[u8] = b"UnityFS";

/// Errors from loading or walking an asset tree
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed typetree dump {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("{} is an undecoded UnityFS bundle and has no typetree dump", .0.display())]
    UndecodedContainer(PathBuf),

    #[error("No object with path id {0}")]
    MissingObject(i64),

    #[error("Object has no typetree")]
    NoSchema,

    #[error("Missing or invalid field '{0}'")]
    MissingField(String),
}

/// A serialized object inside a bundle
pub trait AssetObject {
    /// Class name of the object, e.g. `MonoBehaviour`
    fn type_name(&self) -> &str;

    /// Whether the object carries a typetree that can be read
    fn has_schema(&self) -> bool;

    /// Materialize the typetree as a field mapping
    fn read_fields(&self) -> Result<Fields, DecodeError>;
}

/// A loaded bundle
pub trait AssetTree {
    /// File name of the bundle the tree was loaded from
    fn bundle_name(&self) -> &str;

    /// The primary object of the bundle
    fn root(&self) -> &dyn AssetObject;

    /// Look up a sibling object by path id
    fn resolve(&self, path_id: i64) -> Result<&dyn AssetObject, DecodeError>;
}

/// Opens bundles from the asset store
pub trait TreeLoader {
    fn load(&self, bundle_path: &Path) -> Result<Box<dyn AssetTree>, DecodeError>;
}

/// Typed access to fields by name
pub trait FieldAccess {
    fn get_str(&self, name: &str) -> Result<&str, DecodeError>;
    fn get_int(&self, name: &str) -> Result<i64, DecodeError>;
    fn get_map(&self, name: &str) -> Result<&Fields, DecodeError>;
    /// A list whose entries are all objects
    fn get_list(&self, name: &str) -> Result<Vec<&Fields>, DecodeError>;
}

impl FieldAccess for Fields {
    fn get_str(&self, name: &str) -> Result<&str, DecodeError> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::MissingField(name.to_string()))
    }

    fn get_int(&self, name: &str) -> Result<i64, DecodeError> {
        let value = match self.get(name) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        value.ok_or_else(|| DecodeError::MissingField(name.to_string()))
    }

    fn get_map(&self, name: &str) -> Result<&Fields, DecodeError> {
        self.get(name)
            .and_then(Value::as_object)
            .ok_or_else(|| DecodeError::MissingField(name.to_string()))
    }

    fn get_list(&self, name: &str) -> Result<Vec<&Fields>, DecodeError> {
        let missing = || DecodeError::MissingField(name.to_string());
        self.get(name)
            .and_then(Value::as_array)
            .ok_or_else(missing)?
            .iter()
            .map(|v| v.as_object().ok_or_else(missing))
            .collect()
    }
}

/// One object entry of a typetree dump
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpObject {
    #[serde(default)]
    pub path_id: i64,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub tree: Option<Fields>,
}

impl AssetObject for DumpObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn has_schema(&self) -> bool {
        self.tree.is_some()
    }

    fn read_fields(&self) -> Result<Fields, DecodeError> {
        self.tree.clone().ok_or(DecodeError::NoSchema)
    }
}

#[derive(Deserialize)]
struct DumpFile {
    #[serde(default)]
    name: Option<String>,
    root: DumpObject,
    #[serde(default)]
    objects: HashMap<String, DumpObject>,
}

/// A bundle loaded from a typetree dump
#[derive(Debug, Clone)]
pub struct DumpTree {
    name: String,
    root: DumpObject,
    objects: HashMap<i64, DumpObject>,
}

impl DumpTree {
    /// Build a tree from dump JSON. `fallback_name` is used when the dump
    /// does not record the bundle name.
    pub fn from_value(value: Value, fallback_name: &str) -> Result<Self, String> {
        let dump: DumpFile = serde_json::from_value(value).map_err(|e| e.to_string())?;

        let mut objects = HashMap::with_capacity(dump.objects.len());
        for (key, mut object) in dump.objects {
            let path_id: i64 = key
                .parse()
                .map_err(|_| format!("object key '{key}' is not a path id"))?;
            object.path_id = path_id;
            objects.insert(path_id, object);
        }

        Ok(Self {
            name: dump.name.unwrap_or_else(|| fallback_name.to_string()),
            root: dump.root,
            objects,
        })
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl AssetTree for DumpTree {
    fn bundle_name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &dyn AssetObject {
        &self.root
    }

    fn resolve(&self, path_id: i64) -> Result<&dyn AssetObject, DecodeError> {
        self.objects
            .get(&path_id)
            .map(|o| o as &dyn AssetObject)
            .ok_or(DecodeError::MissingObject(path_id))
    }
}

/// Loads typetree dumps from the asset store.
///
/// For a bundle at `dat/AB/ABCD...`, a sidecar `dat/AB/ABCD....json` is
/// preferred; otherwise the bundle file itself must be a dump.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpLoader;

impl DumpLoader {
    pub fn new() -> Self {
        Self
    }

    fn sidecar_path(bundle_path: &Path) -> PathBuf {
        let mut name = bundle_path.as_os_str().to_os_string();
        name.push(".json");
        PathBuf::from(name)
    }
}

impl TreeLoader for DumpLoader {
    fn load(&self, bundle_path: &Path) -> Result<Box<dyn AssetTree>, DecodeError> {
        let sidecar = Self::sidecar_path(bundle_path);
        let source = if sidecar.is_file() {
            sidecar
        } else {
            bundle_path.to_path_buf()
        };

        let data = std::fs::read(&source).map_err(|e| DecodeError::Io {
            path: source.clone(),
            source: e,
        })?;
        if data.starts_with(UNITYFS_MAGIC) {
            return Err(DecodeError::UndecodedContainer(source));
        }

        let malformed = |reason: String| DecodeError::Malformed {
            path: source.clone(),
            reason,
        };
        let value: Value = serde_json::from_slice(&data).map_err(|e| malformed(e.to_string()))?;

        let fallback = bundle_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tree = DumpTree::from_value(value, &fallback).map_err(malformed)?;

        tracing::debug!(
            bundle = tree.bundle_name(),
            objects = tree.object_count(),
            "loaded typetree dump"
        );
        Ok(Box::new(tree))
    }
}
