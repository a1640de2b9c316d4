// src/install/mod.rs

//! Installation of staged artifacts into a project
//!
//! Every artifact is gathered into one `<install_dir_name>/` directory under
//! the work directory, which then replaces `Packages/<install_dir_name>/` in
//! the project wholesale. The manifest gets a `file:` entry per archive in the
//! installed directory plus a version pin for each selected runtime package.

mod manifest;

pub use manifest::Manifest;

use crate::config::{PinDecision, ToolConfig};
use crate::error::Result;
use crate::packages::{Artifact, move_dir, move_file, package_name_from_file_name};
use crate::progress::{ProgressSink, SilentProgress};
use crate::project::Project;
use crate::version::HostVersion;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

static SILENT: SilentProgress = SilentProgress;

/// What an install changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Directory the artifacts now live in
    pub installed_dir: PathBuf,
    /// Manifest entries written, in the order they were set
    pub entries: Vec<(String, String)>,
    /// Runtime packages whose pin was not written
    pub skipped_pins: Vec<(String, PinDecision)>,
}

/// Moves artifacts into a project and rewrites its manifest
pub struct Installer<'a> {
    config: &'a ToolConfig,
    work_dir: &'a Path,
    progress: &'a dyn ProgressSink,
}

impl<'a> Installer<'a> {
    pub fn new(config: &'a ToolConfig, work_dir: &'a Path) -> Self {
        Self {
            config,
            work_dir,
            progress: &SILENT,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Install `artifacts` and pin `runtime` packages into `project`
    ///
    /// Fails with `ManifestMissing` before anything is moved when the project
    /// has no manifest; the artifacts then stay where they are.
    pub fn install(
        &self,
        project: &Project,
        artifacts: &[Artifact],
        runtime: &BTreeSet<String>,
        host: Option<&HostVersion>,
    ) -> Result<InstallReport> {
        let mut manifest = Manifest::load(&project.manifest_path())?;
        let mut report = InstallReport::default();

        let staging = self.work_dir.join(&self.config.install_dir_name);
        fs::create_dir_all(&staging)?;
        for artifact in artifacts {
            let dest = staging.join(artifact.file_name());
            if artifact.path != dest {
                move_file(&artifact.path, &dest)?;
            }
        }

        let installed = project.packages_dir().join(&self.config.install_dir_name);
        if installed.exists() {
            debug!("Replacing {}", installed.display());
            fs::remove_dir_all(&installed)?;
        }
        move_dir(&staging, &installed)?;
        self.progress
            .message(&format!("Installed packages into {}", installed.display()));

        let known: HashMap<String, &str> = artifacts
            .iter()
            .map(|a| (a.file_name(), a.package_name.as_str()))
            .collect();
        for file_name in self.installed_archives(&installed)? {
            let package_name = match known.get(&file_name) {
                Some(name) => name.to_string(),
                None => match package_name_from_file_name(&file_name, &self.config.package_extension) {
                    Some(name) => name,
                    None => {
                        self.progress
                            .warning(&format!("Cannot tell which package {} is", file_name));
                        continue;
                    }
                },
            };
            let specifier = format!("file:{}/{}", self.config.install_dir_name, file_name);
            manifest.set_dependency(&package_name, &specifier);
            report.entries.push((package_name, specifier));
        }

        for package in &self.config.runtime {
            if !runtime.contains(&package.identifier) {
                continue;
            }
            match package.pin.decide(host) {
                PinDecision::Pinned(version) => {
                    manifest.set_dependency(&package.identifier, &version);
                    report.entries.push((package.identifier.clone(), version));
                }
                decision @ PinDecision::BelowThresholds => {
                    self.progress.warning(&format!(
                        "Editor version {} is too old for {}, not adding it",
                        host.map(ToString::to_string).unwrap_or_default(),
                        package.display_name
                    ));
                    report.skipped_pins.push((package.identifier.clone(), decision));
                }
                decision @ PinDecision::UnknownHost => {
                    self.progress.warning(&format!(
                        "Editor version unknown, cannot choose a version of {}",
                        package.display_name
                    ));
                    report.skipped_pins.push((package.identifier.clone(), decision));
                }
            }
        }

        manifest.save()?;
        info!(
            "Wrote {} manifest entries to {}",
            report.entries.len(),
            manifest.path().display()
        );
        report.installed_dir = installed;
        Ok(report)
    }

    /// Package archives in the installed directory, sorted by name
    fn installed_archives(&self, dir: &Path) -> Result<Vec<String>> {
        let suffix = format!(".{}", self.config.package_extension);
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(&suffix) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
