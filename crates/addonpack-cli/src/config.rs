//! Packaging policy configuration file

use addonpack_bundle::PackagePolicy;
use anyhow::{Context, Result};
use std::path::Path;

/// Load the policy from an optional TOML file, falling back to defaults.
pub fn load_policy(path: Option<&Path>) -> Result<PackagePolicy> {
    let Some(path) = path else {
        return Ok(PackagePolicy::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    parse_policy(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

/// Parse policy overrides; keys that are absent keep their defaults.
pub fn parse_policy(content: &str) -> Result<PackagePolicy> {
    let policy: PackagePolicy = toml::from_str(content).context("Failed to parse config")?;

    if policy.manifest_file.trim().is_empty() {
        anyhow::bail!("manifest_file cannot be empty");
    }

    if policy.excluded_prefixes.iter().any(|p| p.is_empty()) {
        anyhow::bail!("excluded_prefixes cannot contain an empty prefix");
    }

    Ok(policy)
}
