// src/packages/artifact.rs

//! Staged package artifacts
//!
//! An artifact is an installable archive on local disk named
//! `<package_name>-<version>.<ext>`. The identity of an artifact travels with
//! it as structured metadata so the installer never has to re-derive the
//! package name from the file name.

use crate::error::Result;
use crate::version::ComponentVersion;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::fsops::move_file;

/// A packaged archive ready for installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Full package name as written into the manifest
    pub package_name: String,
    /// Identifier used in the requirement set (short for catalog components)
    pub identifier: String,
    pub version: String,
    pub path: PathBuf,
}

impl Artifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| artifact_file_name(&self.package_name, &self.version, ""))
    }
}

/// `<package_name>-<version>.<ext>`
pub fn artifact_file_name(package_name: &str, version: &str, extension: &str) -> String {
    if extension.is_empty() {
        format!("{package_name}-{version}")
    } else {
        format!("{package_name}-{version}.{extension}")
    }
}

/// Recover the package name from an artifact file name
///
/// Identifiers may themselves contain `-`, so every split point is tried from
/// the left and the first one whose remainder parses as a component version
/// wins. If none does, the text before the last `-` is used.
pub fn package_name_from_file_name(file_name: &str, extension: &str) -> Option<String> {
    let suffix = format!(".{extension}");
    let stem = file_name.strip_suffix(&suffix).unwrap_or(file_name);

    for (index, _) in stem.match_indices('-') {
        let (name, rest) = (&stem[..index], &stem[index + 1..]);
        if !name.is_empty() && ComponentVersion::parse(rest).is_ok() {
            return Some(name.to_string());
        }
    }

    stem.rfind('-')
        .map(|index| &stem[..index])
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Working directory where artifacts collect before installation
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
    extension: String,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Where an artifact for this package version is staged
    pub fn artifact_path(&self, package_name: &str, version: &str) -> PathBuf {
        self.dir
            .join(artifact_file_name(package_name, version, &self.extension))
    }

    /// Delete staged artifacts of `package_name` at any version but `keep_version`
    ///
    /// Returns the paths removed.
    pub fn evict_superseded(&self, package_name: &str, keep_version: &str) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        if !self.dir.is_dir() {
            return Ok(removed);
        }

        let keep = artifact_file_name(package_name, keep_version, &self.extension);
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name == keep {
                continue;
            }
            if package_name_from_file_name(&file_name, &self.extension).as_deref()
                == Some(package_name)
            {
                debug!("Removing superseded artifact {}", file_name);
                fs::remove_file(entry.path())?;
                removed.push(entry.path());
            }
        }
        Ok(removed)
    }

    /// Move an artifact built elsewhere into the staging directory
    pub fn adopt(&self, artifact: Artifact) -> Result<Artifact> {
        self.ensure()?;
        self.evict_superseded(&artifact.package_name, &artifact.version)?;

        let dest = self.artifact_path(&artifact.package_name, &artifact.version);
        if artifact.path != dest {
            move_file(&artifact.path, &dest)?;
        }
        Ok(Artifact {
            path: dest,
            ..artifact
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_file_name_with_hyphenated_identifier() {
        assert_eq!(
            package_name_from_file_name("org.mixedrealitytoolkit.input-sim-1.0.1.tgz", "tgz")
                .as_deref(),
            Some("org.mixedrealitytoolkit.input-sim")
        );
        assert_eq!(
            package_name_from_file_name("org.mixedrealitytoolkit.core-3.2.0-pre.5.tgz", "tgz")
                .as_deref(),
            Some("org.mixedrealitytoolkit.core")
        );
    }

    #[test]
    fn test_name_from_file_name_falls_back_to_last_hyphen() {
        assert_eq!(
            package_name_from_file_name("vendor.tool-latest.tgz", "tgz").as_deref(),
            Some("vendor.tool")
        );
        assert_eq!(package_name_from_file_name("nohyphen.tgz", "tgz"), None);
    }

    #[test]
    fn test_evict_superseded_keeps_other_packages() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path(), "tgz");
        for name in [
            "org.x.core-1.0.0.tgz",
            "org.x.core-1.1.0.tgz",
            "org.x.core-ext-1.0.0.tgz",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let removed = staging.evict_superseded("org.x.core", "1.1.0").unwrap();
        assert_eq!(removed, vec![dir.path().join("org.x.core-1.0.0.tgz")]);
        assert!(dir.path().join("org.x.core-1.1.0.tgz").exists());
        assert!(dir.path().join("org.x.core-ext-1.0.0.tgz").exists());
    }

    #[test]
    fn test_adopt_moves_into_staging() {
        let dir = tempfile::tempdir().unwrap();
        let built = dir.path().join("build").join("tools.tgz");
        fs::create_dir_all(built.parent().unwrap()).unwrap();
        fs::write(&built, b"archive").unwrap();

        let staging = StagingArea::new(dir.path().join("stage"), "tgz");
        let artifact = staging
            .adopt(Artifact {
                package_name: "com.example.tools".into(),
                identifier: "com.example.tools".into(),
                version: "0.8.0".into(),
                path: built.clone(),
            })
            .unwrap();

        assert!(!built.exists());
        assert_eq!(artifact.file_name(), "com.example.tools-0.8.0.tgz");
        assert_eq!(fs::read(&artifact.path).unwrap(), b"archive");
    }
}
