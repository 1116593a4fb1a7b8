//! Configuration file support for pkgraph.
//!
//! Two configuration file locations are read:
//! - Global: `~/.pkgraph/config.toml` - User-wide defaults
//! - Project: `.pkgraph/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// pkgraph configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Manifest settings
    pub manifest: ManifestConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Manifest to use instead of searching for Packages.toml.
    /// Relative paths are resolved against the project root.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Force colored diagnostics on or off
    pub color: Option<bool>,

    /// Default depth limit for `pkgraph tree`
    pub tree_depth: Option<usize>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;

        if let Some(base) = config_base_dir(path) {
            config.manifest.path = config.manifest.path.map(|manifest| {
                if manifest.is_relative() {
                    base.join(manifest)
                } else {
                    manifest
                }
            });
        }

        Ok(config)
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.manifest.path.is_some() {
            self.manifest.path = other.manifest.path;
        }
        if other.output.color.is_some() {
            self.output.color = other.output.color;
        }
        if other.output.tree_depth.is_some() {
            self.output.tree_depth = other.output.tree_depth;
        }
    }
}

/// `.pkgraph/config.toml` resolves relative paths against the project root,
/// a bare `config.toml` against its own directory.
fn config_base_dir(path: &Path) -> Option<&Path> {
    let dir = path.parent()?;
    if dir.file_name().is_some_and(|n| n == CONFIG_DIR_NAME) {
        dir.parent()
    } else {
        Some(dir)
    }
}

const CONFIG_DIR_NAME: &str = ".pkgraph";

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.pkgraph/config.toml)
/// 2. Global config (~/.pkgraph/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global pkgraph config directory (~/.pkgraph).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (~/.pkgraph/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.pkgraph/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}
