//! Package creation.
//!
//! The [`PackageBuilder`] writes a [`TrackedFileSet`] into a deflate-compressed
//! ZIP archive and reads the result back before it is moved into place.

use crate::{BundleError, BundleResult, PackageLoader, TrackedFileSet};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builder for add-on packages.
///
/// # Example
///
/// ```no_run
/// use addonpack_bundle::{FileSelector, PackageBuilder, PackagePolicy};
///
/// let policy = PackagePolicy::default();
/// let listing: &[&str] = &["manifest.json", "config.json", "__init__.py"];
/// let files = FileSelector::new(&policy).select(listing)?;
///
/// let report = PackageBuilder::new(".", files)
///     .require(policy.mandatory_files())
///     .write("dist/addon.ankiaddon")?;
/// println!("{} files", report.file_count);
/// # Ok::<(), addonpack_bundle::BundleError>(())
/// ```
#[derive(Debug)]
pub struct PackageBuilder {
    root: PathBuf,
    files: TrackedFileSet,
    required: Vec<String>,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// Where the archive was written.
    pub output: PathBuf,
    /// Number of entries in the archive.
    pub file_count: usize,
    /// SHA-256 of the archive file, hex encoded.
    pub sha256: String,
}

impl PackageBuilder {
    /// Package `files`, read relative to `root`.
    pub fn new<P: AsRef<Path>>(root: P, files: TrackedFileSet) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            files,
            required: Vec::new(),
        }
    }

    /// Entries that must be present when the archive is read back.
    #[must_use]
    pub fn require<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Write the package to `output_path`, replacing any existing file.
    ///
    /// The archive is assembled in a temporary file next to the destination
    /// and only persisted once verification passes, so a failed build leaves
    /// nothing new at `output_path`.
    pub fn write<P: AsRef<Path>>(self, output_path: P) -> BundleResult<PackageReport> {
        let output_path = output_path.as_ref();
        let parent = match output_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut staged = NamedTempFile::new_in(&parent)?;
        self.write_archive(staged.as_file_mut())?;
        self.verify(staged.path())?;

        let sha256 = compute_sha256(staged.as_file_mut())?;
        set_output_permissions(staged.as_file(), output_path)?;
        staged
            .persist(output_path)
            .map_err(|e| BundleError::Io(e.error))?;

        info!(
            output = %output_path.display(),
            files = self.files.len(),
            sha256 = %sha256,
            "package created"
        );

        Ok(PackageReport {
            output: output_path.to_path_buf(),
            file_count: self.files.len(),
            sha256,
        })
    }

    fn write_archive<W: Write + Seek>(&self, writer: W) -> BundleResult<()> {
        let mut zip = ZipWriter::new(writer);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for archive_path in self.files.iter() {
            let source_path = self.root.join(archive_path);
            let read_error = |source| BundleError::ReadSource {
                path: source_path.clone(),
                source,
            };

            let contents = fs::read(&source_path).map_err(read_error)?;
            let metadata = fs::metadata(&source_path).map_err(read_error)?;

            let file_options = {
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    options.unix_permissions(metadata.permissions().mode())
                }
                #[cfg(not(unix))]
                {
                    let _ = &metadata;
                    options
                }
            };

            debug!(entry = archive_path, bytes = contents.len(), "adding file");
            zip.start_file(archive_path, file_options)?;
            zip.write_all(&contents)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Reopen the written archive and check it against the selection.
    fn verify(&self, archive_path: &Path) -> BundleResult<()> {
        let mut loader = PackageLoader::open(archive_path)?;

        loader.verify_entries(self.required.iter().map(String::as_str))?;
        loader.verify_entries(self.files.iter())?;

        let entries = loader.list_files();
        if entries.len() != self.files.len() {
            return Err(BundleError::EntryCountMismatch {
                expected: self.files.len(),
                actual: entries.len(),
            });
        }

        loader.check_integrity()
    }
}

/// Give the staged archive the mode of the file it replaces, or `0o644`.
///
/// Temp files are created `0o600`, which would leave the package unreadable
/// to anyone but the owner once persisted.
#[cfg(unix)]
fn set_output_permissions(staged: &File, output_path: &Path) -> BundleResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = match fs::metadata(output_path) {
        Ok(existing) => existing.permissions().mode() & 0o7777,
        Err(_) => 0o644,
    };
    staged.set_permissions(fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_output_permissions(_staged: &File, _output_path: &Path) -> BundleResult<()> {
    Ok(())
}

/// Compute the SHA-256 of everything readable from `reader`, from the start.
pub fn compute_sha256<R: Read + Seek>(mut reader: R) -> BundleResult<String> {
    reader.rewind()?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
