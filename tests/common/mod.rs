// tests/common/mod.rs

//! Shared test utilities: an in-memory transport, release feed and package
//! builders, and fixture projects.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use mrfeature::{Engine, Error, Project, Result, ToolConfig, Transport};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const NAMESPACE: &str = "org.mixedrealitytoolkit";
pub const SPECIAL_ID: &str = "com.microsoft.mrtk.graphicstools.unity";
pub const SPECIAL_REPO: &str = "MixedReality-GraphicsTools-Unity";

/// Transport serving fixed byte blobs by URL and recording every request
#[derive(Clone, Default)]
pub struct MemoryTransport {
    files: HashMap<String, Vec<u8>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MemoryTransport {
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(url.into(), bytes);
    }

    /// Handle onto the request log that survives boxing the transport
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }
}

impl Transport for MemoryTransport {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.log.lock().unwrap().push(url.to_string());
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| Error::DownloadFailed(format!("HTTP 404 Not Found from {url}")))
    }
}

/// Gzipped tarball from (path, content) pairs
pub fn tarball(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A component package whose manifest fragment declares `deps`
pub fn package_tarball(name: &str, version: &str, deps: &[(&str, &str)]) -> Vec<u8> {
    let deps: serde_json::Map<String, serde_json::Value> = deps
        .iter()
        .map(|(id, v)| (id.to_string(), serde_json::Value::from(*v)))
        .collect();
    let manifest = serde_json::json!({
        "name": name,
        "version": version,
        "dependencies": deps,
    })
    .to_string();
    tarball(&[
        ("package/package.json", manifest.as_str()),
        ("package/Runtime/Feature.cs", "class Feature {}"),
    ])
}

/// Source snapshot of the graphics tools repository
pub fn snapshot_tarball(version: &str, with_package: bool) -> Vec<u8> {
    let root = format!("{SPECIAL_REPO}-{version}");
    let readme = format!("{root}/README.md");
    let manifest_path = format!("{root}/{SPECIAL_ID}/package.json");
    let shader_path = format!("{root}/{SPECIAL_ID}/Runtime/Shaders/Standard.shader");
    let manifest = format!(r#"{{"name": "{SPECIAL_ID}", "version": "{version}"}}"#);

    let mut entries = vec![(readme.as_str(), "graphics tools")];
    if with_package {
        entries.push((manifest_path.as_str(), manifest.as_str()));
        entries.push((shader_path.as_str(), "Shader \"Standard\" {}"));
    }
    tarball(&entries)
}

pub fn asset_name(id: &str, version: &str) -> String {
    format!("{NAMESPACE}.{id}-{version}.tgz")
}

pub fn asset_url(id: &str, version: &str) -> String {
    format!("https://downloads.test/{}", asset_name(id, version))
}

pub fn snapshot_url(version: &str) -> String {
    format!("https://github.com/microsoft/{SPECIAL_REPO}/archive/refs/tags/v{version}.tar.gz")
}

/// Builds a release feed and the transport that serves it
#[derive(Default)]
pub struct FeedBuilder {
    assets: Vec<(String, String)>,
    transport: MemoryTransport,
}

impl FeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A downloadable component declaring `deps`
    pub fn component(mut self, id: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        let name = format!("{NAMESPACE}.{id}");
        self.transport
            .insert(asset_url(id, version), package_tarball(&name, version, deps));
        self.listed(id, version)
    }

    /// A component listed in the feed whose download fails
    pub fn listed(mut self, id: &str, version: &str) -> Self {
        self.assets
            .push((asset_name(id, version), asset_url(id, version)));
        self
    }

    /// A component whose download is not a valid package archive
    pub fn corrupt(mut self, id: &str, version: &str) -> Self {
        self.transport
            .insert(asset_url(id, version), b"not a tarball".to_vec());
        self.listed(id, version)
    }

    /// Serve the graphics tools source snapshot for `version`
    pub fn snapshot(mut self, version: &str, with_package: bool) -> Self {
        self.transport
            .insert(snapshot_url(version), snapshot_tarball(version, with_package));
        self
    }

    pub fn build(mut self) -> MemoryTransport {
        let assets: Vec<_> = self
            .assets
            .iter()
            .map(|(name, url)| serde_json::json!({ "name": name, "browser_download_url": url }))
            .collect();
        let feed = serde_json::json!([
            { "tag_name": "v3", "assets": assets },
            { "tag_name": "source", "assets": [{ "name": "Source code (zip)", "browser_download_url": "https://downloads.test/src.zip" }] },
        ]);
        let feed_url = ToolConfig::default().feed_url;
        self.transport.insert(feed_url, feed.to_string().into_bytes());
        self.transport
    }
}

/// Engine over `transport` with a fetched catalog
pub fn engine(transport: MemoryTransport, work_dir: &Path) -> Engine {
    engine_with_config(transport, work_dir, ToolConfig::default())
}

pub fn engine_with_config(transport: MemoryTransport, work_dir: &Path, config: ToolConfig) -> Engine {
    let mut engine = Engine::new(config, Box::new(transport), work_dir);
    engine.fetch_catalog().unwrap();
    engine
}

/// Catalog index of an identifier
pub fn index_of(engine: &Engine, identifier: &str) -> usize {
    engine
        .catalog()
        .unwrap()
        .packages()
        .iter()
        .position(|p| p.identifier == identifier)
        .unwrap_or_else(|| panic!("{identifier} not in catalog"))
}

pub const DEFAULT_MANIFEST: &str = r#"{
    "dependencies": {
        "com.unity.textmeshpro": "3.0.6",
        "com.unity.xr.management": "4.4.0"
    }
}"#;

/// A project directory with an editor version and (optionally) a manifest
pub fn fixture_project(editor_version: Option<&str>, manifest: Option<&str>) -> (TempDir, Project) {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["Assets", "Packages", "ProjectSettings"] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
    }
    if let Some(version) = editor_version {
        fs::write(
            dir.path().join("ProjectSettings").join("ProjectVersion.txt"),
            format!("m_EditorVersion: {version}\nm_EditorVersionWithRevision: {version} (abc)\n"),
        )
        .unwrap();
    }
    if let Some(manifest) = manifest {
        fs::write(dir.path().join("Packages").join("manifest.json"), manifest).unwrap();
    }
    let project = Project::open(dir.path()).unwrap();
    (dir, project)
}

/// Read the project's manifest as JSON
pub fn read_manifest(project: &Project) -> serde_json::Value {
    let content = fs::read_to_string(project.manifest_path()).unwrap();
    serde_json::from_str(&content).unwrap()
}
