//! Package command implementation
//!
//! Runs validate → select → build → verify and prints a one-line summary.

use crate::config;
use addonpack_bundle::{
    CandidateSource, FileSelector, GitTrackedFiles, Manifest, PackageBuilder, PackagePolicy,
    PackageReport,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line options for a packaging run.
#[derive(Debug, Default)]
pub struct Options {
    pub output: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Run the package command
pub fn run(options: Options) -> Result<()> {
    let policy = config::load_policy(options.config.as_deref())?;

    let root = match options.root {
        Some(root) => root,
        None => GitTrackedFiles::discover_root(".")
            .context("Failed to locate the repository root (use --root)")?,
    };

    let output = resolve_output(options.output, &root, &policy);
    let report = package(&root, &policy, &GitTrackedFiles::new(&root), &output)?;

    println!("{}", summary(&report));
    Ok(())
}

/// Validate the manifest, select files from `source` and write the archive.
pub fn package<S: CandidateSource + ?Sized>(
    root: &Path,
    policy: &PackagePolicy,
    source: &S,
    output: &Path,
) -> Result<PackageReport> {
    let manifest_path = root.join(&policy.manifest_file);
    let manifest = Manifest::from_file(&manifest_path)
        .with_context(|| format!("Manifest check failed: {}", manifest_path.display()))?;
    info!(
        package = %manifest.package,
        name = %manifest.name,
        revision = manifest.revision,
        "manifest valid"
    );

    let files = FileSelector::new(policy)
        .select(source)
        .context("File selection failed")?;
    info!(files = files.len(), "files selected");

    PackageBuilder::new(root, files)
        .require(policy.mandatory_files())
        .write(output)
        .with_context(|| format!("Failed to build package: {}", output.display()))
}

/// The explicit output path, or the policy default under the repository root.
pub fn resolve_output(output: Option<PathBuf>, root: &Path, policy: &PackagePolicy) -> PathBuf {
    output.unwrap_or_else(|| root.join(&policy.default_output))
}

/// Success line printed after the archive is verified.
pub fn summary(report: &PackageReport) -> String {
    format!(
        "Created {} ({} files)",
        report.output.display(),
        report.file_count
    )
}
