// src/repository/catalog.rs

//! Browsable catalog of selectable packages
//!
//! Built once per run from the release feed. Component packages come from
//! asset names matching the filename grammar; runtime packages come from
//! configuration and never enter the dependency graph.

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::version;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use super::client::Transport;
use super::feed::{self, AssetGrammar, Release};

/// Kind of a selectable package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    /// Versioned catalog component, resolved transitively
    Component,
    /// Terminal entry that only produces a manifest pin
    Runtime,
}

/// An entry a user may choose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectablePackage {
    pub display_name: String,
    pub identifier: String,
    pub kind: PackageKind,
}

/// In-memory index of the release feed
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// identifier -> discovered versions (unordered, no duplicates)
    versions: BTreeMap<String, Vec<String>>,
    /// (identifier, version) -> download URL
    assets: HashMap<(String, String), String>,
    /// Components sorted by identifier, then runtime packages
    packages: Vec<SelectablePackage>,
}

impl Catalog {
    /// Retrieve the release feed and build the catalog
    pub fn fetch(transport: &dyn Transport, config: &ToolConfig) -> Result<Self> {
        info!("Fetching release information from {}", config.feed_url);
        let bytes = transport
            .fetch_bytes(&config.feed_url)
            .map_err(|e| Error::FeedUnavailable(e.to_string()))?;
        let releases = feed::parse_feed(&bytes)?;
        Self::from_releases(&releases, config)
    }

    /// Build a catalog from already-parsed releases
    pub fn from_releases(releases: &[Release], config: &ToolConfig) -> Result<Self> {
        let grammar = AssetGrammar::new(&config.namespace, &config.package_extension)?;
        let mut catalog = Catalog::default();

        for release in releases {
            for asset in &release.assets {
                let Some(parsed) = grammar.parse(&asset.name) else {
                    continue;
                };
                let versions = catalog.versions.entry(parsed.identifier.clone()).or_default();
                if !versions.contains(&parsed.version) {
                    versions.push(parsed.version.clone());
                }
                // First listing of a version wins; the feed is newest-release first
                catalog
                    .assets
                    .entry((parsed.identifier, parsed.version))
                    .or_insert_with(|| asset.browser_download_url.clone());
            }
        }

        catalog.packages = catalog
            .versions
            .keys()
            .map(|identifier| SelectablePackage {
                display_name: identifier.clone(),
                identifier: identifier.clone(),
                kind: PackageKind::Component,
            })
            .collect();

        catalog
            .packages
            .extend(config.runtime.iter().map(|runtime| SelectablePackage {
                display_name: runtime.display_name.clone(),
                identifier: runtime.identifier.clone(),
                kind: PackageKind::Runtime,
            }));

        debug!(
            "Catalog holds {} components ({} assets)",
            catalog.versions.len(),
            catalog.assets.len()
        );
        Ok(catalog)
    }

    /// All selectable packages; indices into this slice are selection indices
    pub fn packages(&self) -> &[SelectablePackage] {
        &self.packages
    }

    pub fn package(&self, index: usize) -> Option<&SelectablePackage> {
        self.packages.get(index)
    }

    /// Known versions of a component, in feed order
    pub fn versions(&self, identifier: &str) -> &[String] {
        self.versions
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Newest known version of a component
    pub fn latest_version(&self, identifier: &str) -> Result<Option<String>> {
        let newest = version::newest(self.versions(identifier).iter().map(String::as_str))?;
        Ok(newest.map(str::to_string))
    }

    /// Download URL for an exact component version
    pub fn download_url(&self, identifier: &str, version: &str) -> Option<&str> {
        self.assets
            .get(&(identifier.to_string(), version.to_string()))
            .map(String::as_str)
    }

    /// Number of distinct component identifiers
    pub fn component_count(&self) -> usize {
        self.versions.len()
    }
}
