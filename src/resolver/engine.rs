// src/resolver/engine.rs

//! Recursive dependency walk
//!
//! Starting from each selected component at its newest catalog version, the
//! walk downloads the package, reads its manifest fragment and follows every
//! declared dependency depth-first. Where two paths reach the same component
//! the newer version wins; there is no backtracking.
//!
//! Termination rests on two guards: the visited `identifier@version` set
//! catches exact repeats, and the "not older" short-circuit stops a cycle that
//! alternates between versions. A depth ceiling backs both up.

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::packages::read_manifest_fragment;
use crate::progress::{ProgressSink, SilentProgress};
use crate::repository::{Catalog, PackageKind, Transport};
use crate::version;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::plan::{Resolution, SkipReason, SkippedNode};

static SILENT: SilentProgress = SilentProgress;

/// Dependency resolver over a fetched catalog
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    transport: &'a dyn Transport,
    config: &'a ToolConfig,
    progress: &'a dyn ProgressSink,
}

/// State for one `resolve` call; dropped when it returns
struct Walk {
    resolution: Resolution,
    visited: HashSet<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog, transport: &'a dyn Transport, config: &'a ToolConfig) -> Self {
        Self {
            catalog,
            transport,
            config,
            progress: &SILENT,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Resolve a selection of catalog indices
    ///
    /// Out-of-range indices are reported and skipped. Failures below the
    /// selection level only prune the branch they occur in.
    pub fn resolve(&self, selected: &[usize]) -> Result<Resolution> {
        let mut walk = Walk {
            resolution: Resolution::default(),
            visited: HashSet::new(),
        };

        for &index in selected {
            let Some(package) = self.catalog.package(index) else {
                let err = Error::InvalidSelectionIndex {
                    index,
                    available: self.catalog.packages().len(),
                };
                self.progress.warning(&err.to_string());
                walk.resolution.invalid_indices.push(index);
                continue;
            };

            match package.kind {
                PackageKind::Runtime => {
                    walk.resolution.runtime.insert(package.identifier.clone());
                }
                PackageKind::Component => match self.catalog.latest_version(&package.identifier)? {
                    Some(latest) => {
                        walk.resolution
                            .user_selection
                            .insert(package.identifier.clone(), latest);
                    }
                    None => {
                        self.progress
                            .warning(&format!("No versions known for {}", package.identifier));
                    }
                },
            }
        }

        let roots: Vec<(String, String)> = walk
            .resolution
            .user_selection
            .iter()
            .map(|(id, version)| (id.clone(), version.clone()))
            .collect();

        for (identifier, version) in roots {
            self.progress
                .message(&format!("Resolving {}@{}", identifier, version));
            self.resolve_node(&mut walk, &identifier, &version, 0);
        }

        debug!(
            "Resolved {} requirements ({} skipped)",
            walk.resolution.requirements.len(),
            walk.resolution.skipped.len()
        );
        Ok(walk.resolution)
    }

    fn skip(&self, walk: &mut Walk, identifier: &str, version: &str, reason: SkipReason) {
        let node = SkippedNode {
            identifier: identifier.to_string(),
            version: version.to_string(),
            reason,
        };
        self.progress.warning(&format!("Skipping {}", node));
        walk.resolution.skipped.push(node);
    }

    fn resolve_node(&self, walk: &mut Walk, identifier: &str, version: &str, depth: usize) {
        let key = format!("{}@{}", identifier, version);
        if walk.visited.contains(&key) {
            return;
        }

        if let Some(existing) = walk.resolution.requirements.get(identifier) {
            match version::is_newer(existing, version) {
                Ok(true) => {
                    debug!("{} supersedes {}@{}", key, identifier, existing);
                }
                Ok(false) => return,
                Err(e) => {
                    self.skip(walk, identifier, version, SkipReason::VersionParse(e.to_string()));
                    return;
                }
            }
        }

        if depth >= self.config.max_depth {
            self.skip(walk, identifier, version, SkipReason::DepthLimit(depth));
            return;
        }

        walk.resolution
            .requirements
            .insert(identifier.to_string(), version.to_string());
        walk.visited.insert(key);

        let Some(url) = self.catalog.download_url(identifier, version) else {
            debug!("No catalog asset for {}@{}, leaving as unresolved leaf", identifier, version);
            return;
        };

        let bytes = match self.transport.fetch_bytes(url) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.skip(walk, identifier, version, SkipReason::DownloadFailed(e.to_string()));
                return;
            }
        };

        let fragment =
            match read_manifest_fragment(bytes.as_slice(), &self.config.manifest_fragment_path) {
                Ok(fragment) => fragment,
                Err(e) => {
                    self.skip(walk, identifier, version, SkipReason::Archive(e.to_string()));
                    return;
                }
            };
        drop(bytes);

        let namespace_prefix = self.config.namespace_prefix();
        for (dep_id, dep_version) in &fragment.dependencies {
            if dep_id.starts_with(&self.config.external_namespace) {
                debug!("{} depends on host-managed {}, ignoring", identifier, dep_id);
                continue;
            }

            match dep_id.strip_prefix(&namespace_prefix) {
                Some(short_id) => self.resolve_node(walk, short_id, dep_version, depth + 1),
                None => {
                    if *dep_id != self.config.special.identifier {
                        warn!("{} depends on out-of-catalog package {}", identifier, dep_id);
                    }
                    self.resolve_node(walk, dep_id, dep_version, depth + 1)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Release, ReleaseAsset};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeTransport {
        files: HashMap<String, Vec<u8>>,
        fetched: Mutex<Vec<String>>,
    }

    impl Transport for FakeTransport {
        fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.fetched.lock().unwrap().push(url.to_string());
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| Error::DownloadFailed(format!("HTTP 404 from {url}")))
        }
    }

    fn package(deps: &[(&str, &str)]) -> Vec<u8> {
        let deps: serde_json::Map<String, serde_json::Value> = deps
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect();
        let json = serde_json::json!({ "name": "x", "dependencies": deps }).to_string();

        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let mut header = tar::Header::new_gnu();
        header.set_size(json.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "package/package.json", json.as_bytes())
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn url(id: &str, version: &str) -> String {
        format!("https://dl.test/org.mixedrealitytoolkit.{id}-{version}.tgz")
    }

    /// Build a catalog and transport from (id, version, deps) triples
    fn fixture(nodes: &[(&str, &str, &[(&str, &str)])]) -> (Catalog, FakeTransport) {
        let assets = nodes
            .iter()
            .map(|(id, version, _)| ReleaseAsset {
                name: format!("org.mixedrealitytoolkit.{id}-{version}.tgz"),
                browser_download_url: url(id, version),
            })
            .collect();
        let release = Release {
            tag_name: None,
            assets,
        };
        let catalog = Catalog::from_releases(&[release], &ToolConfig::default()).unwrap();
        let files = nodes
            .iter()
            .map(|(id, version, deps)| (url(id, version), package(deps)))
            .collect();
        let transport = FakeTransport {
            files,
            fetched: Mutex::new(Vec::new()),
        };
        (catalog, transport)
    }

    fn index_of(catalog: &Catalog, id: &str) -> usize {
        catalog
            .packages()
            .iter()
            .position(|p| p.identifier == id)
            .unwrap()
    }

    #[test]
    fn test_transitive_walk_strips_namespace() {
        let (catalog, transport) = fixture(&[
            ("uxcore", "3.1.0", &[("org.mixedrealitytoolkit.core", "3.0.0")]),
            ("core", "3.0.0", &[]),
        ]);
        let config = ToolConfig::default();
        let resolver = Resolver::new(&catalog, &transport, &config);

        let resolution = resolver.resolve(&[index_of(&catalog, "uxcore")]).unwrap();
        assert_eq!(resolution.requirements.len(), 2);
        assert_eq!(resolution.requirements["core"], "3.0.0");
        assert_eq!(resolution.dependencies_only().len(), 1);
    }

    #[test]
    fn test_newer_requirement_is_not_downgraded() {
        let (catalog, transport) = fixture(&[
            ("widgets", "1.0.0", &[("org.mixedrealitytoolkit.core", "1.0.0")]),
            ("core", "1.0.0", &[]),
            ("core", "2.0.0", &[]),
        ]);
        let config = ToolConfig::default();
        let resolver = Resolver::new(&catalog, &transport, &config);

        // core@2.0.0 is walked first, so widgets' older requirement is dominated
        let resolution = resolver
            .resolve(&[index_of(&catalog, "widgets"), index_of(&catalog, "core")])
            .unwrap();
        assert_eq!(resolution.requirements["core"], "2.0.0");
        assert!(!transport.fetched.lock().unwrap().contains(&url("core", "1.0.0")));
    }

    #[test]
    fn test_invalid_index_is_recorded() {
        let (catalog, transport) = fixture(&[("core", "1.0.0", &[])]);
        let config = ToolConfig::default();
        let resolver = Resolver::new(&catalog, &transport, &config);

        let resolution = resolver.resolve(&[0, 99]).unwrap();
        assert_eq!(resolution.invalid_indices, vec![99]);
        assert_eq!(resolution.user_selection.len(), 1);
    }

    #[test]
    fn test_download_failure_prunes_branch_only() {
        let (catalog, mut transport) = fixture(&[
            (
                "top",
                "1.0.0",
                &[
                    ("org.mixedrealitytoolkit.broken", "1.0.0"),
                    ("org.mixedrealitytoolkit.ok", "1.0.0"),
                ],
            ),
            ("broken", "1.0.0", &[("org.mixedrealitytoolkit.hidden", "1.0.0")]),
            ("ok", "1.0.0", &[]),
        ]);
        transport.files.remove(&url("broken", "1.0.0"));
        let config = ToolConfig::default();
        let resolver = Resolver::new(&catalog, &transport, &config);

        let resolution = resolver.resolve(&[index_of(&catalog, "top")]).unwrap();
        assert!(resolution.requirements.contains_key("ok"));
        assert!(resolution.requirements.contains_key("broken"));
        assert!(!resolution.requirements.contains_key("hidden"));
        assert_eq!(resolution.skipped.len(), 1);
        assert!(matches!(resolution.skipped[0].reason, SkipReason::DownloadFailed(_)));
    }

    #[test]
    fn test_depth_ceiling() {
        let (catalog, transport) = fixture(&[
            ("a", "1.0.0", &[("org.mixedrealitytoolkit.b", "1.0.0")]),
            ("b", "1.0.0", &[("org.mixedrealitytoolkit.c", "1.0.0")]),
            ("c", "1.0.0", &[]),
        ]);
        let config = ToolConfig {
            max_depth: 2,
            ..ToolConfig::default()
        };
        let resolver = Resolver::new(&catalog, &transport, &config);

        let resolution = resolver.resolve(&[index_of(&catalog, "a")]).unwrap();
        assert!(resolution.requirements.contains_key("b"));
        assert!(!resolution.requirements.contains_key("c"));
        assert_eq!(resolution.skipped[0].reason, SkipReason::DepthLimit(2));
    }
}
