//! Manifest descriptor for add-on packages.
//!
//! The manifest is validated as a raw JSON document first so that type
//! errors (a float where an integer belongs, a string where a list belongs)
//! are reported against the offending key rather than as a serde error.

use crate::{BundleError, BundleResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Keys every manifest must define, in reporting order.
pub const REQUIRED_KEYS: [&str; 7] = [
    "package",
    "name",
    "mod",
    "conflicts",
    "min_point_version",
    "max_point_version",
    "branch_index",
];

const STRING_KEYS: [&str; 2] = ["package", "name"];
const INTEGER_KEYS: [&str; 4] = ["mod", "min_point_version", "max_point_version", "branch_index"];

/// Add-on manifest - the `manifest.json` file at the package root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Package identifier.
    pub package: String,

    /// Display name.
    pub name: String,

    /// Compatibility revision.
    #[serde(rename = "mod")]
    pub revision: i64,

    /// Identifiers of packages that cannot be installed alongside this one.
    pub conflicts: Vec<Value>,

    /// Lowest compatible host point version.
    pub min_point_version: i64,

    /// Highest compatible host point version.
    pub max_point_version: i64,

    /// Branch/variant index.
    pub branch_index: i64,

    /// Keys outside the required schema, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Load and validate a manifest file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| BundleError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse and validate a manifest document.
    pub fn from_json(json: &str) -> BundleResult<Self> {
        let document: Value = serde_json::from_str(json)?;
        validate_document(&document)?;
        Ok(serde_json::from_value(document)?)
    }
}

/// Check a manifest document against the required schema.
///
/// Rules are checked in a fixed order and the first violation is returned:
/// required keys, non-empty `package` and `name`, list-typed `conflicts`,
/// integer-typed numeric fields, positive `mod`, and an ordered version range.
pub fn validate_document(document: &Value) -> BundleResult<()> {
    let Some(fields) = document.as_object() else {
        return Err(BundleError::InvalidManifest(
            "manifest must be a JSON object".to_string(),
        ));
    };

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !fields.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(BundleError::InvalidManifest(format!(
            "missing required keys: {}",
            missing.join(", ")
        )));
    }

    for key in STRING_KEYS {
        let non_empty = fields[key]
            .as_str()
            .is_some_and(|value| !value.trim().is_empty());
        if !non_empty {
            return Err(BundleError::InvalidManifest(format!(
                "`{key}` must be a non-empty string"
            )));
        }
    }

    if !fields["conflicts"].is_array() {
        return Err(BundleError::InvalidManifest(
            "`conflicts` must be a list".to_string(),
        ));
    }

    for key in INTEGER_KEYS {
        let value = &fields[key];
        if !is_integer(value) {
            return Err(BundleError::InvalidManifest(format!(
                "`{key}` must be an integer"
            )));
        }
        if !value.is_i64() {
            return Err(BundleError::InvalidManifest(format!(
                "`{key}` must fit in a signed 64-bit integer"
            )));
        }
    }

    let revision = integer(&fields["mod"]);
    if revision <= 0 {
        return Err(BundleError::InvalidManifest(
            "`mod` must be > 0".to_string(),
        ));
    }

    let min_version = integer(&fields["min_point_version"]);
    let max_version = integer(&fields["max_point_version"]);
    if min_version > max_version {
        return Err(BundleError::InvalidManifest(format!(
            "`min_point_version` ({min_version}) must be <= `max_point_version` ({max_version})"
        )));
    }

    Ok(())
}

/// Integer-typed JSON number. `1.0` is a float and does not qualify.
fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

/// Value of a field already checked to be an `i64`.
fn integer(value: &Value) -> i64 {
    value.as_i64().unwrap_or_default()
}
