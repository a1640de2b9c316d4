// src/repository/feed.rs

//! Release feed model and asset filename grammar
//!
//! The feed is a JSON array of releases, each carrying an `assets` array of
//! `{name, browser_download_url}`. Only assets named
//! `<namespace>.<identifier>-<version>.<ext>` are catalog entries; the version
//! matches `\d+\.\d+\.\d+(-pre\.\d+)?`.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Deserialize;

/// One release in the feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable file attached to a release
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseAsset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
}

/// Parse the raw feed payload
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Release>> {
    serde_json::from_slice(bytes).map_err(|e| Error::FeedMalformed(e.to_string()))
}

/// Component identifier and version parsed from an asset filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    pub identifier: String,
    pub version: String,
}

/// Compiled filename grammar for one namespace and extension
#[derive(Debug, Clone)]
pub struct AssetGrammar {
    pattern: Regex,
}

impl AssetGrammar {
    pub fn new(namespace: &str, extension: &str) -> Result<Self> {
        let pattern = format!(
            r"^{}\.(.+?)-(\d+\.\d+\.\d+(?:-pre\.\d+)?)\.{}$",
            regex::escape(namespace),
            regex::escape(extension)
        );
        let pattern = Regex::new(&pattern)
            .map_err(|e| Error::Config(format!("Invalid asset grammar: {e}")))?;
        Ok(Self { pattern })
    }

    /// Parse an asset filename; `None` when it is not a catalog entry
    pub fn parse(&self, file_name: &str) -> Option<AssetName> {
        let captures = self.pattern.captures(file_name)?;
        Some(AssetName {
            identifier: captures[1].to_string(),
            version: captures[2].to_string(),
        })
    }
}
