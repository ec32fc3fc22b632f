//! Add-on packaging for addonpack
//!
//! This crate turns a version-controlled add-on source tree into an
//! installable `.ankiaddon` archive: a ZIP file whose entries are the
//! repository-relative paths of the packaged files.
//!
//! # Package Structure
//!
//! ```text
//! addon.ankiaddon
//! ├── __init__.py         # entry point
//! ├── config.json         # runtime metadata
//! ├── manifest.json       # package descriptor
//! └── web/
//!     └── ...
//! ```
//!
//! # Example
//!
//! ```no_run
//! use addonpack_bundle::{FileSelector, GitTrackedFiles, Manifest, PackageBuilder, PackagePolicy};
//!
//! let policy = PackagePolicy::default();
//! let root = GitTrackedFiles::discover_root(".")?;
//!
//! Manifest::from_file(root.join(&policy.manifest_file))?;
//! let files = FileSelector::new(&policy).select(&GitTrackedFiles::new(&root))?;
//! let report = PackageBuilder::new(&root, files)
//!     .require(policy.mandatory_files())
//!     .write(root.join(&policy.default_output))?;
//!
//! println!("Created {} ({} files)", report.output.display(), report.file_count);
//! # Ok::<(), addonpack_bundle::BundleError>(())
//! ```

mod error;
mod policy;

pub mod builder;
pub mod loader;
pub mod manifest;
pub mod selector;

pub use builder::{PackageBuilder, PackageReport};
pub use error::BundleError;
pub use loader::PackageLoader;
pub use manifest::Manifest;
pub use policy::PackagePolicy;
pub use selector::{CandidateSource, FileSelector, GitTrackedFiles, TrackedFileSet};

/// Result type for packaging operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Manifest file name at the package root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Default archive location, relative to the repository root.
pub const DEFAULT_OUTPUT: &str = "dist/addon.ankiaddon";
