//! Integration tests for the validate, select, build, verify pipeline.
//!
//! The tracked file listing is supplied in memory, so no git checkout is
//! needed.

#![allow(non_snake_case)]

use addonpack_bundle::{
    BundleError, FileSelector, Manifest, PackageBuilder, PackageLoader, PackagePolicy,
    PackageReport,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VALID_MANIFEST: &str = r#"{"package":"p","name":"P","mod":1,"conflicts":[],"min_point_version":1,"max_point_version":5,"branch_index":0}"#;

/// Helper to lay out an add-on source tree.
fn create_source_tree(manifest: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let files = [
        ("manifest.json", manifest),
        ("config.json", "{\"theme\": \"dark\"}\n"),
        ("__init__.py", "from . import main\n"),
        ("main.py", "def run():\n    pass\n"),
        ("docs/guide.md", "# Guide\n"),
    ];
    for (path, contents) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
    dir
}

/// Run the whole pipeline the way the command line does.
fn package(root: &Path, listing: &[&str], output: &Path) -> Result<PackageReport, BundleError> {
    let policy = PackagePolicy::default();
    Manifest::from_file(root.join(&policy.manifest_file))?;
    let files = FileSelector::new(&policy).select(listing)?;
    PackageBuilder::new(root, files)
        .require(policy.mandatory_files())
        .write(output)
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

mod end_to_end {
    use super::*;

    #[test]
    fn package___valid_manifest_and_four_files___writes_four_entries() {
        let tree = create_source_tree(VALID_MANIFEST);
        let output = tree.path().join("dist/addon.ankiaddon");

        let report = package(
            tree.path(),
            &["manifest.json", "config.json", "__init__.py", "main.py"],
            &output,
        )
        .unwrap();

        assert_eq!(report.file_count, 4);
        let loader = PackageLoader::open(&output).unwrap();
        assert_eq!(
            loader.list_files(),
            vec!["__init__.py", "config.json", "main.py", "manifest.json"]
        );
    }

    #[test]
    fn package___zero_revision___fails_without_archive() {
        let manifest = VALID_MANIFEST.replace("\"mod\":1", "\"mod\":0");
        let tree = create_source_tree(&manifest);
        let output = tree.path().join("dist/addon.ankiaddon");

        let err = package(
            tree.path(),
            &["manifest.json", "config.json", "__init__.py", "main.py"],
            &output,
        )
        .unwrap_err();

        assert!(err.to_string().contains("`mod` must be > 0"));
        assert!(!output.exists());
        assert!(!tree.path().join("dist").exists());
    }

    #[test]
    fn package___missing_runtime_metadata___fails_without_archive() {
        let tree = create_source_tree(VALID_MANIFEST);
        let output = tree.path().join("dist/addon.ankiaddon");

        let err = package(
            tree.path(),
            &["manifest.json", "__init__.py", "main.py"],
            &output,
        )
        .unwrap_err();

        assert!(matches!(err, BundleError::MissingRequiredFiles(ref m) if m == &["config.json"]));
        assert!(!output.exists());
    }

    #[test]
    fn package___excluded_docs___never_packaged() {
        let tree = create_source_tree(VALID_MANIFEST);
        let output = tree.path().join("out.ankiaddon");

        let report = package(
            tree.path(),
            &["manifest.json", "config.json", "__init__.py", "docs/guide.md"],
            &output,
        )
        .unwrap();

        assert_eq!(report.file_count, 3);
        assert!(!PackageLoader::open(&output).unwrap().has_file("docs/guide.md"));
    }

    #[test]
    fn package___every_entry___matches_source_bytes_once() {
        let tree = create_source_tree(VALID_MANIFEST);
        let output = tree.path().join("out.ankiaddon");
        let listing = ["main.py", "manifest.json", "config.json", "__init__.py", "main.py"];

        package(tree.path(), &listing, &output).unwrap();

        let mut loader = PackageLoader::open(&output).unwrap();
        let names = loader.list_files();
        assert_eq!(names.len(), 4);
        for name in names {
            let expected = fs::read(tree.path().join(&name)).unwrap();
            assert_eq!(loader.read_file(&name).unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn package___manifest_readable_from_archive() {
        let tree = create_source_tree(VALID_MANIFEST);
        let output = tree.path().join("out.ankiaddon");

        package(
            tree.path(),
            &["manifest.json", "config.json", "__init__.py"],
            &output,
        )
        .unwrap();

        let mut loader = PackageLoader::open(&output).unwrap();
        let bytes = loader.read_file("manifest.json").unwrap();
        let manifest = Manifest::from_json(&String::from_utf8(bytes).unwrap());
        assert_eq!(manifest.unwrap().package, "p");
    }
}

// =============================================================================
// Selection properties
// =============================================================================

mod selection_properties {
    use super::*;
    use proptest::prelude::*;

    const REQUIRED: [&str; 3] = ["manifest.json", "config.json", "__init__.py"];

    fn arb_path() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,8}(/[a-z]{1,8}){0,2}\\.(py|json|js|css)",
            "(docs|screenshots|\\.github|ads|dist)/[a-z]{1,8}\\.[a-z]{2,3}",
        ]
    }

    fn arb_listing() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(arb_path(), 0..24).prop_map(|mut paths| {
            paths.extend(REQUIRED.iter().map(|p| (*p).to_string()));
            paths
        })
    }

    proptest! {
        /// Property: the same listing always yields the same sorted selection
        #[test]
        fn proptest_selection_is_deterministic_and_sorted(listing in arb_listing()) {
            let policy = PackagePolicy::default();
            let selector = FileSelector::new(&policy);

            let first: Vec<String> =
                selector.select(&listing).unwrap().iter().map(String::from).collect();
            let mut shuffled = listing.clone();
            shuffled.reverse();
            let second: Vec<String> =
                selector.select(&shuffled).unwrap().iter().map(String::from).collect();

            prop_assert_eq!(&first, &second);
            let mut sorted = first.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(first, sorted);
        }

        /// Property: excluded prefixes never reach the selection
        #[test]
        fn proptest_excluded_prefixes_never_selected(listing in arb_listing()) {
            let policy = PackagePolicy::default();
            let selected = FileSelector::new(&policy).select(&listing).unwrap();

            for path in selected.iter() {
                prop_assert!(!policy.is_excluded(path), "{} was selected", path);
            }
            for required in REQUIRED {
                prop_assert!(selected.contains(required));
            }
        }
    }
}
