//! File selection.
//!
//! The [`FileSelector`] turns the repository's tracked file listing into the
//! set of paths that go into the package. The listing itself comes from a
//! [`CandidateSource`]; [`GitTrackedFiles`] asks `git ls-files`, tests hand in
//! a fixed list.

use crate::{BundleError, BundleResult, PackagePolicy};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Supplier of candidate paths, relative to the repository root.
pub trait CandidateSource {
    /// List every path that may belong in the package.
    fn list_candidate_paths(&self) -> BundleResult<Vec<String>>;
}

impl CandidateSource for Vec<String> {
    fn list_candidate_paths(&self) -> BundleResult<Vec<String>> {
        Ok(self.clone())
    }
}

impl CandidateSource for [&str] {
    fn list_candidate_paths(&self) -> BundleResult<Vec<String>> {
        Ok(self.iter().map(|p| (*p).to_string()).collect())
    }
}

/// Files tracked by git in a working tree.
#[derive(Debug, Clone)]
pub struct GitTrackedFiles {
    root: PathBuf,
}

impl GitTrackedFiles {
    /// Use the repository whose top-level directory is `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve the top-level directory of the repository containing `dir`.
    pub fn discover_root<P: AsRef<Path>>(dir: P) -> BundleResult<PathBuf> {
        let stdout = run_git(dir.as_ref(), &["rev-parse", "--show-toplevel"])?;
        let root = stdout.trim();
        if root.is_empty() {
            return Err(BundleError::SourceListing(
                "git rev-parse returned an empty path".to_string(),
            ));
        }
        Ok(PathBuf::from(root))
    }
}

impl CandidateSource for GitTrackedFiles {
    fn list_candidate_paths(&self) -> BundleResult<Vec<String>> {
        let stdout = run_git(&self.root, &["-c", "core.quotepath=off", "ls-files", "-z"])?;
        Ok(parse_path_list(&stdout))
    }
}

fn run_git(dir: &Path, args: &[&str]) -> BundleResult<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| BundleError::SourceListing(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BundleError::SourceListing(format!(
            "git {} exited with {}: {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| BundleError::SourceListing(format!("git output is not UTF-8: {e}")))
}

/// Split a path listing, dropping blank entries.
///
/// NUL-delimited listings (`git ls-files -z`) are taken verbatim; otherwise
/// the listing is split on newlines and each line is trimmed.
#[must_use]
pub fn parse_path_list(listing: &str) -> Vec<String> {
    if listing.contains('\0') {
        return listing
            .split('\0')
            .filter(|path| !path.is_empty())
            .map(String::from)
            .collect();
    }

    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Sorted, duplicate-free set of relative paths selected for packaging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedFileSet {
    paths: BTreeSet<String>,
}

impl TrackedFileSet {
    /// Number of selected files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Paths in archive order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// Applies a [`PackagePolicy`] to a candidate listing.
#[derive(Debug, Clone)]
pub struct FileSelector<'a> {
    policy: &'a PackagePolicy,
}

impl<'a> FileSelector<'a> {
    #[must_use]
    pub fn new(policy: &'a PackagePolicy) -> Self {
        Self { policy }
    }

    /// Compute the package file set.
    ///
    /// Fails with [`BundleError::MissingRequiredFiles`] naming every mandatory
    /// file that did not make it into the selection.
    pub fn select<S: CandidateSource + ?Sized>(
        &self,
        source: &S,
    ) -> BundleResult<TrackedFileSet> {
        let mut paths = BTreeSet::new();

        for candidate in source.list_candidate_paths()? {
            let candidate = candidate.trim();
            if candidate.is_empty() {
                continue;
            }
            if self.policy.is_excluded(candidate) {
                debug!(path = candidate, "excluded from package");
                continue;
            }
            paths.insert(candidate.to_string());
        }

        self.include_manifest(&mut paths);

        let missing: Vec<String> = self
            .policy
            .mandatory_files()
            .into_iter()
            .filter(|required| !paths.contains(*required))
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(BundleError::MissingRequiredFiles(missing));
        }

        Ok(TrackedFileSet { paths })
    }

    /// The manifest is always part of the package, even when the exclusion
    /// rules dropped it or the listing never reported it.
    fn include_manifest(&self, paths: &mut BTreeSet<String>) {
        let manifest = &self.policy.manifest_file;
        if paths.insert(manifest.clone()) {
            warn!(path = %manifest, "manifest was not in the selection, adding it back");
        }
    }
}
