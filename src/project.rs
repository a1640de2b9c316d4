// src/project.rs

//! Target project discovery
//!
//! A project is a directory with `Assets/`, `Packages/` and
//! `ProjectSettings/`. Its host platform version is recorded in
//! `ProjectSettings/ProjectVersion.txt` on the `m_EditorVersion:` line.

use crate::error::{Error, Result};
use crate::version::HostVersion;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Subdirectories every project must have
pub const REQUIRED_DIRS: [&str; 3] = ["Assets", "Packages", "ProjectSettings"];

const VERSION_FILE: &str = "ProjectVersion.txt";
const VERSION_KEY: &str = "m_EditorVersion:";

/// A validated target project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Open a project directory, checking its layout
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref();
        if !root.is_dir() {
            return Err(Error::InvalidProject {
                path: root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        let missing: Vec<&str> = REQUIRED_DIRS
            .iter()
            .copied()
            .filter(|dir| !root.join(dir).is_dir())
            .collect();
        if !missing.is_empty() {
            return Err(Error::InvalidProject {
                path: root.display().to_string(),
                reason: format!("missing {}", missing.join(", ")),
            });
        }

        debug!("Opened project at {}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root.join("Packages")
    }

    /// `Packages/manifest.json`
    pub fn manifest_path(&self) -> PathBuf {
        self.packages_dir().join("manifest.json")
    }

    pub fn version_file(&self) -> PathBuf {
        self.root.join("ProjectSettings").join(VERSION_FILE)
    }

    /// Raw host version string, e.g. `2022.3.5f1`
    pub fn host_version_string(&self) -> Option<String> {
        let content = fs::read_to_string(self.version_file()).ok()?;
        parse_version_line(&content)
    }

    /// Parsed host version; `None` (with a warning) when unknown
    pub fn host_version(&self) -> Option<HostVersion> {
        let Some(raw) = self.host_version_string() else {
            warn!("No editor version found in {}", self.version_file().display());
            return None;
        };
        match HostVersion::parse(&raw) {
            Ok(version) => Some(version),
            Err(e) => {
                warn!("Unrecognised editor version '{}': {}", raw, e);
                None
            }
        }
    }
}

/// Value after the first space on the version key line
fn parse_version_line(content: &str) -> Option<String> {
    content
        .lines()
        .find(|line| line.starts_with(VERSION_KEY))
        .and_then(|line| line.split_once(' '))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
