// src/repository/mod.rs

//! Remote release catalog and package transport
//!
//! This module provides functionality for:
//! - Fetching the release feed over HTTP
//! - Parsing asset filenames into (identifier, version) pairs
//! - Building the browsable catalog of selectable packages

mod client;

pub mod catalog;
pub mod feed;

// Re-export main types and functions
pub use catalog::{Catalog, PackageKind, SelectablePackage};
pub use client::{RepositoryClient, Transport};
pub use feed::{AssetGrammar, AssetName, Release, ReleaseAsset};
