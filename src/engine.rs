// src/engine.rs

//! Stateful front door to the whole pipeline
//!
//! An [`Engine`] owns everything one run produces: the catalog, the latest
//! resolution and the staged artifacts. The phases must be called in order:
//!
//! ```ignore
//! let mut engine = Engine::new(config, Box::new(client), work_dir);
//! engine.fetch_catalog()?;
//! engine.resolve(&[0, 3])?;
//! engine.fetch_artifacts()?;
//! engine.install(&project)?;
//! ```
//!
//! Calling a phase before its predecessor yields `Error::NotReady`. A new
//! `resolve` replaces the previous resolution entirely. Nothing is shared
//! between engines, so independent runs (or tests) cannot interfere.

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::install::{InstallReport, Installer};
use crate::packages::{Artifact, StagingArea};
use crate::progress::{Phase, ProgressSink, SilentProgress};
use crate::project::Project;
use crate::repository::{Catalog, Transport};
use crate::resolver::{Resolution, Resolver};
use crate::special::Repackager;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Subdirectory of the work directory where artifacts are staged
const ARTIFACT_DIR: &str = "artifacts";

pub struct Engine {
    config: ToolConfig,
    transport: Box<dyn Transport>,
    progress: Arc<dyn ProgressSink>,
    work_dir: PathBuf,
    catalog: Option<Catalog>,
    resolution: Option<Resolution>,
    artifacts: Vec<Artifact>,
}

impl Engine {
    pub fn new(config: ToolConfig, transport: Box<dyn Transport>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            transport,
            progress: Arc::new(SilentProgress),
            work_dir: work_dir.into(),
            catalog: None,
            resolution: None,
            artifacts: Vec::new(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Swap the progress sink between phases
    pub fn set_progress(&mut self, progress: Arc<dyn ProgressSink>) {
        self.progress = progress;
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Artifacts staged by the last download phase
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    fn staging(&self) -> StagingArea {
        StagingArea::new(
            self.work_dir.join(ARTIFACT_DIR),
            self.config.package_extension.clone(),
        )
    }

    /// Fetch the release feed and build the catalog
    pub fn fetch_catalog(&mut self) -> Result<&Catalog> {
        self.progress.set_phase(Phase::FetchingCatalog);
        let catalog = Catalog::fetch(self.transport.as_ref(), &self.config)?;
        self.progress.message(&format!(
            "Found {} component packages",
            catalog.component_count()
        ));
        Ok(&*self.catalog.insert(catalog))
    }

    /// Resolve a selection of catalog indices
    pub fn resolve(&mut self, selected: &[usize]) -> Result<&Resolution> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| Error::NotReady("Catalog not fetched; call fetch_catalog first".into()))?;

        self.progress.set_phase(Phase::Resolving);
        let resolution = Resolver::new(catalog, self.transport.as_ref(), &self.config)
            .with_progress(self.progress.as_ref())
            .resolve(selected)?;

        self.artifacts.clear();
        Ok(&*self.resolution.insert(resolution))
    }

    /// Download every resolved component and rebuild the special dependency
    pub fn fetch_artifacts(&mut self) -> Result<&[Artifact]> {
        self.progress.set_phase(Phase::Downloading);
        self.artifacts = self.download_components()?;
        let specials = self.repackage_specials()?;
        self.artifacts.extend(specials);
        info!("Staged {} artifacts", self.artifacts.len());
        Ok(&self.artifacts)
    }

    fn ready(&self) -> Result<(&Catalog, &Resolution)> {
        match (&self.catalog, &self.resolution) {
            (Some(catalog), Some(resolution)) => Ok((catalog, resolution)),
            _ => Err(Error::NotReady(
                "Nothing resolved; call fetch_catalog and resolve first".into(),
            )),
        }
    }

    /// Download the catalog-served requirements into the staging directory
    ///
    /// A failed download is reported and skipped.
    pub fn download_components(&self) -> Result<Vec<Artifact>> {
        let (catalog, resolution) = self.ready()?;
        let staging = self.staging();
        staging.ensure()?;

        let mut artifacts = Vec::new();
        for (identifier, version) in &resolution.requirements {
            if *identifier == self.config.special.identifier {
                continue;
            }
            let Some(url) = catalog.download_url(identifier, version) else {
                self.progress
                    .warning(&format!("No download available for {}@{}", identifier, version));
                continue;
            };

            let package_name = self.config.package_name(identifier);
            staging.evict_superseded(&package_name, version)?;
            let path = staging.artifact_path(&package_name, version);

            if path.exists() {
                debug!("Reusing staged {}", path.display());
            } else {
                self.progress
                    .message(&format!("Downloading {}@{}", identifier, version));
                if let Err(e) = self.transport.download_file(url, &path) {
                    self.progress
                        .warning(&format!("Failed to download {}@{}: {}", identifier, version, e));
                    continue;
                }
            }

            artifacts.push(Artifact {
                package_name,
                identifier: identifier.clone(),
                version: version.clone(),
                path,
            });
        }
        Ok(artifacts)
    }

    /// Rebuild each required special dependency from its source repository
    ///
    /// A failed rebuild is reported and skipped.
    pub fn repackage_specials(&self) -> Result<Vec<Artifact>> {
        let (_, resolution) = self.ready()?;
        let special = &self.config.special.identifier;
        let Some(version) = resolution.requirements.get(special) else {
            return Ok(Vec::new());
        };

        let staging = self.staging();
        let repackager = Repackager::new(self.transport.as_ref(), &self.config, &self.work_dir);
        self.progress
            .message(&format!("Repackaging {}@{}", special, version));

        match repackager.repackage(version).and_then(|a| staging.adopt(a)) {
            Ok(artifact) => Ok(vec![artifact]),
            Err(e) => {
                self.progress
                    .warning(&format!("Failed to repackage {}@{}: {}", special, version, e));
                Ok(Vec::new())
            }
        }
    }

    /// Install staged artifacts and runtime pins into `project`
    pub fn install(&mut self, project: &Project) -> Result<InstallReport> {
        let (_, resolution) = self.ready()?;
        self.progress.set_phase(Phase::Installing);

        let host = project.host_version();
        let report = Installer::new(&self.config, &self.work_dir)
            .with_progress(self.progress.as_ref())
            .install(project, &self.artifacts, &resolution.runtime, host.as_ref())?;

        self.artifacts.clear();
        Ok(report)
    }
}
