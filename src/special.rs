// src/special.rs

//! Repackaging of the cross-repository dependency
//!
//! One dependency is never published to the release feed. It lives as a
//! subdirectory of another repository, so it is fetched as a tagged source
//! snapshot and rebuilt into an ordinary package archive:
//!
//! 1. download `<repo_base>/archive/refs/tags/v<version>.tar.gz`
//! 2. extract it into a scratch directory
//! 3. move `<repo_name>-<version>/<identifier>` to a staging root
//! 4. archive the staging root under `package/` as `<identifier>-<version>.<ext>`
//!
//! The snapshot archive, the scratch tree and the staging root are removed
//! whether or not the rebuild succeeds.

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::packages::{Artifact, archive_utils, artifact_file_name, move_dir};
use crate::repository::Transport;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Archive root every package is rebuilt under
pub const PACKAGE_ROOT: &str = "package";

/// Rebuilds the special dependency from its source repository
pub struct Repackager<'a> {
    transport: &'a dyn Transport,
    config: &'a ToolConfig,
    work_dir: PathBuf,
}

impl<'a> Repackager<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a ToolConfig, work_dir: &Path) -> Self {
        Self {
            transport,
            config,
            work_dir: work_dir.to_path_buf(),
        }
    }

    /// Tag snapshot URL for a version
    pub fn source_url(&self, version: &str) -> String {
        format!(
            "{}/archive/refs/tags/v{}.tar.gz",
            self.config.special.repo_base.trim_end_matches('/'),
            version
        )
    }

    /// Fetch and rebuild the special dependency at `version`
    ///
    /// The artifact is written into the work directory.
    pub fn repackage(&self, version: &str) -> Result<Artifact> {
        let special = &self.config.special;
        info!("Repackaging {}@{}", special.identifier, version);

        fs::create_dir_all(&self.work_dir)?;
        let snapshot = self.work_dir.join(format!("v{}.tar.gz", version));
        self.transport
            .download_file(&self.source_url(version), &snapshot)?;

        let result = self.rebuild(&snapshot, version);

        if let Err(e) = fs::remove_file(&snapshot) {
            warn!("Failed to remove snapshot {}: {}", snapshot.display(), e);
        }
        result
    }

    fn rebuild(&self, snapshot: &Path, version: &str) -> Result<Artifact> {
        let special = &self.config.special;

        let scratch = tempfile::Builder::new()
            .prefix("snapshot-")
            .tempdir_in(&self.work_dir)?;
        archive_utils::unpack_archive(snapshot, scratch.path())?;

        let source = scratch
            .path()
            .join(format!("{}-{}", special.repo_name, version))
            .join(&special.identifier);
        if !source.is_dir() {
            return Err(Error::Archive(format!(
                "Snapshot v{} has no {}-{}/{} directory",
                version, special.repo_name, version, special.identifier
            )));
        }

        let staging = tempfile::Builder::new()
            .prefix("repack-")
            .tempdir_in(&self.work_dir)?;
        let package_root = staging.path().join(PACKAGE_ROOT);
        move_dir(&source, &package_root)?;
        debug!("Staged {} at {}", special.identifier, package_root.display());

        let output = self.work_dir.join(artifact_file_name(
            &special.identifier,
            version,
            &self.config.package_extension,
        ));
        archive_utils::build_package_archive(&package_root, PACKAGE_ROOT, &output)?;

        Ok(Artifact {
            package_name: special.identifier.clone(),
            identifier: special.identifier.clone(),
            version: version.to_string(),
            path: output,
        })
    }
}
