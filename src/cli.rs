// src/cli.rs
//! CLI definitions and the interactive package menu
//!
//! Argument parsing uses clap. The menu and index parsing live here so the
//! library stays free of terminal concerns.

use clap::Parser;
use mrfeature::{Catalog, PackageKind};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mrfeature")]
#[command(author, version)]
#[command(
    about = "Install Mixed Reality Toolkit feature packages and their dependencies into a Unity project",
    long_about = None
)]
pub struct Cli {
    /// Path to the Unity project (must contain Assets, Packages and ProjectSettings)
    pub project: PathBuf,

    /// Package numbers to install, e.g. "2 7 14"; prompts when omitted
    #[arg(short, long)]
    pub select: Option<String>,

    /// Configuration file (default: <config dir>/mrfeature/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for downloads and staging (default: a temporary directory)
    #[arg(short, long)]
    pub work_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Numbered menu of the catalog, components first then runtime packages
pub fn render_menu(catalog: &Catalog) -> String {
    let mut out = String::new();
    let groups = [
        (PackageKind::Component, "Feature packages"),
        (PackageKind::Runtime, "Runtime packages"),
    ];
    for (kind, title) in groups {
        let _ = writeln!(out, "{}:", title);
        for (index, package) in catalog.packages().iter().enumerate() {
            if package.kind == kind {
                let _ = writeln!(out, "  {:>3}. {}", index, package.display_name);
            }
        }
    }
    out
}

/// Result of reading a list of selection indices
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedIndices {
    pub indices: Vec<usize>,
    /// Tokens that were not non-negative integers
    pub rejected: Vec<String>,
}

/// Parse whitespace- or comma-separated indices
pub fn parse_indices(input: &str) -> ParsedIndices {
    let mut parsed = ParsedIndices::default();
    for token in input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        match token.parse::<usize>() {
            Ok(index) => parsed.indices.push(index),
            Err(_) => parsed.rejected.push(token.to_string()),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mrfeature::ToolConfig;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_indices_mixed_separators() {
        let parsed = parse_indices(" 2 7,14\t3 ");
        assert_eq!(parsed.indices, vec![2, 7, 14, 3]);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_parse_indices_rejects_garbage() {
        let parsed = parse_indices("1 two -3 4");
        assert_eq!(parsed.indices, vec![1, 4]);
        assert_eq!(parsed.rejected, vec!["two".to_string(), "-3".to_string()]);
        assert_eq!(parse_indices(""), ParsedIndices::default());
    }

    #[test]
    fn test_menu_groups_runtime_last() {
        let catalog = Catalog::from_releases(&[], &ToolConfig::default()).unwrap();
        let menu = render_menu(&catalog);
        assert!(menu.starts_with("Feature packages:\nRuntime packages:\n"));
        assert!(menu.contains("    0. Microsoft Mixed Reality OpenXR"));
        assert!(menu.contains("    1. Meta OpenXR"));
    }
}
