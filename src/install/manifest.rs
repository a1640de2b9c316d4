// src/install/manifest.rs

//! The project's package manifest (`Packages/manifest.json`)
//!
//! Only the `dependencies` object is touched; every other key and the order
//! of existing entries survive a load/save cycle.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DEPENDENCIES_KEY: &str = "dependencies";

/// A loaded manifest document
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: Map<String, Value>,
}

impl Manifest {
    /// Load the manifest; `ManifestMissing` when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestMissing(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let document: Map<String, Value> = serde_json::from_str(&content)?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set (or overwrite) one dependency entry
    pub fn set_dependency(&mut self, identifier: &str, specifier: &str) {
        debug!("manifest: {} = {}", identifier, specifier);
        let value = Value::String(specifier.to_string());
        let dependencies = self
            .document
            .entry(DEPENDENCIES_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = dependencies {
            map.insert(identifier.to_string(), value);
        } else {
            warn!("Manifest '{}' is not an object, replacing it", DEPENDENCIES_KEY);
            let mut map = Map::new();
            map.insert(identifier.to_string(), value);
            *dependencies = Value::Object(map);
        }
    }

    pub fn dependency(&self, identifier: &str) -> Option<&str> {
        self.document
            .get(DEPENDENCIES_KEY)?
            .get(identifier)?
            .as_str()
    }

    /// Render with 4-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.document.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(|e| Error::Io(std::io::Error::other(e)))
    }

    /// Write the manifest back to where it was loaded from
    pub fn save(&self) -> Result<()> {
        let rendered = self.to_json()?;
        fs::write(&self.path, rendered)?;
        Ok(())
    }
}
