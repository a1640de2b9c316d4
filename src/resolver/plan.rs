// src/resolver/plan.rs

//! Resolution result types

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Result of resolving one selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Component identifier -> version the user picked (always the newest known)
    pub user_selection: BTreeMap<String, String>,
    /// Component identifier -> the single converged version to install
    pub requirements: BTreeMap<String, String>,
    /// Runtime package identifiers chosen by the user
    pub runtime: BTreeSet<String>,
    /// Branches abandoned during the walk
    pub skipped: Vec<SkippedNode>,
    /// Selection indices that did not name a catalog entry
    pub invalid_indices: Vec<usize>,
}

impl Resolution {
    /// Requirements that were not selected directly
    pub fn dependencies_only(&self) -> BTreeMap<&str, &str> {
        self.requirements
            .iter()
            .filter(|(id, _)| !self.user_selection.contains_key(*id))
            .map(|(id, version)| (id.as_str(), version.as_str()))
            .collect()
    }

    /// Nothing to download and nothing to pin
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty() && self.runtime.is_empty()
    }
}

/// A graph node whose expansion was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNode {
    pub identifier: String,
    pub version: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    DownloadFailed(String),
    Archive(String),
    VersionParse(String),
    /// Recursion ceiling reached at this depth
    DepthLimit(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DownloadFailed(msg) => write!(f, "download failed: {}", msg),
            SkipReason::Archive(msg) => write!(f, "unreadable package: {}", msg),
            SkipReason::VersionParse(msg) => write!(f, "bad version: {}", msg),
            SkipReason::DepthLimit(depth) => write!(f, "dependency depth limit {} reached", depth),
        }
    }
}

impl fmt::Display for SkippedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.identifier, self.version, self.reason)
    }
}
