// src/lib.rs

//! Mixed Reality feature package installer
//!
//! Resolves toolkit feature packages from the published release feed, pulls
//! in their transitive dependencies, rebuilds the one dependency that lives in
//! a separate repository, and installs the lot into a Unity project.
//!
//! # Architecture
//!
//! - Catalog: one scan of the release feed, asset names parsed by a fixed grammar
//! - Resolver: depth-first walk, one converged version per component, newest wins
//! - Repackager: source snapshot -> subdirectory -> ordinary package archive
//! - Installer: artifacts into `Packages/`, `file:` entries and runtime pins into the manifest
//! - Engine: owns one run's state and exposes the phases in order

pub mod config;
pub mod engine;
mod error;
pub mod install;
pub mod packages;
pub mod progress;
pub mod project;
pub mod repository;
pub mod resolver;
pub mod special;
pub mod version;

pub use config::{PinDecision, PinPolicy, ToolConfig};
pub use engine::Engine;
pub use error::{Error, Result};
pub use install::{InstallReport, Installer, Manifest};
pub use packages::Artifact;
pub use progress::{
    CallbackProgress, ChannelProgress, CliProgress, LogProgress, Phase, ProgressEvent,
    ProgressSink, SilentProgress,
};
pub use project::Project;
pub use repository::{Catalog, PackageKind, RepositoryClient, SelectablePackage, Transport};
pub use resolver::{Resolution, Resolver, SkipReason, SkippedNode};
pub use special::Repackager;
pub use version::{ComponentVersion, HostVersion, is_newer};
