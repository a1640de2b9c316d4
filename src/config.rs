// src/config.rs

//! Tool configuration
//!
//! Every field has a built-in default, so an empty file (or no file at all)
//! yields the stock Mixed Reality Toolkit setup.
//!
//! # Example config.toml
//!
//! ```toml
//! feed_url = "https://api.github.com/repos/MixedRealityToolkit/MixedRealityToolkit-Unity/releases"
//! max_depth = 32
//!
//! [special]
//! identifier = "com.microsoft.mrtk.graphicstools.unity"
//! repo_base = "https://github.com/microsoft/MixedReality-GraphicsTools-Unity"
//! repo_name = "MixedReality-GraphicsTools-Unity"
//!
//! [[runtime]]
//! display_name = "Microsoft Mixed Reality OpenXR"
//! identifier = "com.microsoft.mixedreality.openxr"
//! pin = { fixed = "1.11.2" }
//!
//! [[runtime]]
//! display_name = "Meta OpenXR"
//! identifier = "com.unity.xr.meta-openxr"
//! pin = { tiers = [
//!     { above = "6000.0.0", version = "2.2.0" },
//!     { above = "2022.3.0f1", version = "1.0.4" },
//! ] }
//! ```

use crate::error::{Error, Result};
use crate::version::HostVersion;
use crate::version::host::NO_RELEASE_TYPE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-user config directory and file
pub const CONFIG_DIR_NAME: &str = "mrfeature";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Release feed endpoint (JSON array of releases with assets)
    pub feed_url: String,

    /// Namespace prefix of this toolkit's own packages (without trailing dot)
    pub namespace: String,

    /// Prefix of host-managed packages that are never pulled in
    pub external_namespace: String,

    /// Package archive extension
    pub package_extension: String,

    /// Path of the manifest fragment inside a package archive
    pub manifest_fragment_path: String,

    /// Directory name used for staging and under the project's Packages/
    pub install_dir_name: String,

    /// The cross-repository dependency that is not in the catalog
    pub special: SpecialDependencyConfig,

    /// Runtime packages offered alongside catalog components
    pub runtime: Vec<RuntimePackageConfig>,

    /// Recursion ceiling for the dependency walk
    pub max_depth: usize,

    /// Per-request timeout; unset blocks until the server answers
    pub http_timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            feed_url:
                "https://api.github.com/repos/MixedRealityToolkit/MixedRealityToolkit-Unity/releases"
                    .to_string(),
            namespace: "org.mixedrealitytoolkit".to_string(),
            external_namespace: "com.unity.".to_string(),
            package_extension: "tgz".to_string(),
            manifest_fragment_path: "package/package.json".to_string(),
            install_dir_name: "MixedReality".to_string(),
            special: SpecialDependencyConfig::default(),
            runtime: default_runtime_packages(),
            max_depth: 64,
            http_timeout_secs: None,
            user_agent: format!("mrfeature/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Location of the special dependency's source repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialDependencyConfig {
    /// Full package identifier, as it appears in dependency fragments
    pub identifier: String,
    /// Repository base URL (tag archives live under `<repo_base>/archive/refs/tags/`)
    pub repo_base: String,
    /// Top-level directory prefix of the snapshot (`<repo_name>-<version>/`)
    pub repo_name: String,
}

impl Default for SpecialDependencyConfig {
    fn default() -> Self {
        Self {
            identifier: "com.microsoft.mrtk.graphicstools.unity".to_string(),
            repo_base: "https://github.com/microsoft/MixedReality-GraphicsTools-Unity".to_string(),
            repo_name: "MixedReality-GraphicsTools-Unity".to_string(),
        }
    }
}

/// A runtime package and how its manifest pin is chosen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimePackageConfig {
    pub display_name: String,
    pub identifier: String,
    pub pin: PinPolicy,
}

/// How a runtime package's version pin is picked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinPolicy {
    /// Always the same version
    Fixed(String),
    /// First tier whose threshold the host version is strictly above
    Tiers(Vec<PinTier>),
}

/// One host-version tier of a [`PinPolicy::Tiers`] policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinTier {
    pub above: HostVersion,
    pub version: String,
}

/// Outcome of evaluating a pin policy against a host version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinDecision {
    Pinned(String),
    /// Host version known but not above any tier threshold
    BelowThresholds,
    /// Tiered policy but the host version could not be determined
    UnknownHost,
}

impl PinPolicy {
    pub fn decide(&self, host: Option<&HostVersion>) -> PinDecision {
        match self {
            PinPolicy::Fixed(version) => PinDecision::Pinned(version.clone()),
            PinPolicy::Tiers(tiers) => {
                let Some(host) = host else {
                    return PinDecision::UnknownHost;
                };
                tiers
                    .iter()
                    .find(|tier| *host > tier.above)
                    .map(|tier| PinDecision::Pinned(tier.version.clone()))
                    .unwrap_or(PinDecision::BelowThresholds)
            }
        }
    }
}

fn default_runtime_packages() -> Vec<RuntimePackageConfig> {
    vec![
        RuntimePackageConfig {
            display_name: "Microsoft Mixed Reality OpenXR".to_string(),
            identifier: "com.microsoft.mixedreality.openxr".to_string(),
            pin: PinPolicy::Fixed("1.11.2".to_string()),
        },
        RuntimePackageConfig {
            display_name: "Meta OpenXR".to_string(),
            identifier: "com.unity.xr.meta-openxr".to_string(),
            pin: PinPolicy::Tiers(vec![
                PinTier {
                    above: HostVersion::new(6000, 0, 0, NO_RELEASE_TYPE, 0),
                    version: "2.2.0".to_string(),
                },
                PinTier {
                    above: HostVersion::new(2022, 3, 0, 'f', 1),
                    version: "1.0.4".to_string(),
                },
            ]),
        },
    ]
}

impl ToolConfig {
    /// Parse a config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a config file from an explicit path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load the effective config
    ///
    /// An explicit path must exist. Otherwise the per-user config file is used
    /// when present, falling back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Prefix (with trailing dot) of this toolkit's own package identifiers
    pub fn namespace_prefix(&self) -> String {
        format!("{}.", self.namespace)
    }

    /// Full package name for a short catalog identifier
    pub fn package_name(&self, identifier: &str) -> String {
        format!("{}.{}", self.namespace, identifier)
    }

    pub fn runtime_package(&self, identifier: &str) -> Option<&RuntimePackageConfig> {
        self.runtime.iter().find(|r| r.identifier == identifier)
    }
}

/// `<user config dir>/mrfeature/config.toml`, if the platform has one
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
