// src/packages/mod.rs

//! Package archives and staged artifacts
//!
//! Component packages are gzipped tarballs carrying a manifest fragment at
//! `package/package.json`. This module reads those fragments, rebuilds
//! archives from a directory tree, and manages the staging directory where
//! downloaded and repackaged artifacts wait for installation.

pub mod archive_utils;
pub mod artifact;
pub mod fsops;

pub use archive_utils::{ManifestFragment, build_package_archive, read_manifest_fragment};
pub use artifact::{Artifact, StagingArea, artifact_file_name, package_name_from_file_name};
pub use fsops::{move_dir, move_file};
