//! Read-only access to a written package.
//!
//! The [`PackageLoader`] reopens an archive to check what actually landed in
//! it.

use crate::{BundleError, BundleResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Loader for add-on packages.
///
/// # Example
///
/// ```no_run
/// use addonpack_bundle::PackageLoader;
///
/// let mut loader = PackageLoader::open("dist/addon.ankiaddon")?;
/// loader.verify_entries(["manifest.json", "__init__.py"])?;
/// let manifest = loader.read_file("manifest.json")?;
/// # Ok::<(), addonpack_bundle::BundleError>(())
/// ```
#[derive(Debug)]
pub struct PackageLoader {
    archive: ZipArchive<File>,
}

impl PackageLoader {
    /// Open a package file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let file = File::open(path.as_ref())?;
        let archive = ZipArchive::new(file)?;
        Ok(Self { archive })
    }

    /// Number of entries in the archive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// List all entry names in archive order.
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i).map(String::from))
            .collect()
    }

    /// Check if an entry exists in the package.
    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }

    /// Read an entry as bytes.
    pub fn read_file(&mut self, path: &str) -> BundleResult<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| BundleError::VerificationFailed(vec![path.to_string()]))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Confirm that every named entry is present.
    ///
    /// Fails with [`BundleError::VerificationFailed`] listing each absent entry.
    pub fn verify_entries<'a, I>(&self, expected: I) -> BundleResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let missing: Vec<String> = expected
            .into_iter()
            .filter(|name| !self.has_file(name))
            .map(String::from)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BundleError::VerificationFailed(missing))
        }
    }

    /// Decompress every entry, surfacing CRC or truncation errors.
    pub fn check_integrity(&mut self) -> BundleResult<()> {
        let mut sink = std::io::sink();
        for i in 0..self.archive.len() {
            let mut entry = self.archive.by_index(i)?;
            std::io::copy(&mut entry, &mut sink)?;
        }
        Ok(())
    }
}
