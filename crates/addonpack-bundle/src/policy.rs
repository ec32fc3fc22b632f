//! Packaging policy: which files are mandatory, which are left out, and
//! where the archive goes by default.

use crate::{DEFAULT_OUTPUT, MANIFEST_FILE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Inclusion/exclusion rules applied to the tracked file listing.
///
/// Every field has a default, so a partial configuration file only needs to
/// name the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagePolicy {
    /// Manifest descriptor path, relative to the repository root.
    pub manifest_file: String,

    /// Files that must be present in the selection and in the final archive.
    pub required_files: Vec<String>,

    /// Path prefixes that are never packaged (docs, CI, build output, ...).
    pub excluded_prefixes: Vec<String>,

    /// Exact paths that are never packaged (the packaging tool's own files).
    pub excluded_files: Vec<String>,

    /// Archive location used when no output path is given, relative to the
    /// repository root.
    pub default_output: PathBuf,
}

impl Default for PackagePolicy {
    fn default() -> Self {
        Self {
            manifest_file: MANIFEST_FILE.to_string(),
            required_files: vec![
                MANIFEST_FILE.to_string(),
                "config.json".to_string(),
                "__init__.py".to_string(),
            ],
            excluded_prefixes: vec![
                ".github/".to_string(),
                "screenshots/".to_string(),
                "ads/".to_string(),
                "docs/".to_string(),
                "dist/".to_string(),
            ],
            excluded_files: vec!["addonpack.toml".to_string()],
            default_output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl PackagePolicy {
    /// Whether a candidate path is dropped by the exclusion rules.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_files.iter().any(|f| f == path)
            || self
                .excluded_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Mandatory entries, with the manifest always among them.
    #[must_use]
    pub fn mandatory_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.required_files.iter().map(String::as_str).collect();
        if !files.contains(&self.manifest_file.as_str()) {
            files.insert(0, self.manifest_file.as_str());
        }
        files
    }
}
