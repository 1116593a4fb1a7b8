//! Global context for pkgraph operations.
//!
//! Holds the working directory, the merged configuration, and any manifest
//! override passed on the command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::find_manifest;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Where package declarations come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// A Packages.toml on disk
    File(PathBuf),
    /// The built-in package catalogue
    Builtin,
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
    config: Config,
    manifest_override: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a context for the current directory, loading configuration.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at `cwd`.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let global = global_config_path();
        let config = load_config(global.as_deref(), &project_config_path(&cwd));
        GlobalContext {
            cwd,
            config,
            manifest_override: None,
        }
    }

    /// Use `path` as the manifest regardless of config and search.
    pub fn with_manifest(mut self, path: Option<PathBuf>) -> Self {
        self.manifest_override = path.map(|p| {
            if p.is_relative() {
                self.cwd.join(p)
            } else {
                p
            }
        });
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pick the manifest: command line, then config, then a Packages.toml
    /// in the working directory or its parents, then the built-in catalogue.
    pub fn manifest_source(&self) -> ManifestSource {
        if let Some(path) = &self.manifest_override {
            return ManifestSource::File(path.clone());
        }
        if let Some(path) = &self.config.manifest.path {
            return ManifestSource::File(path.clone());
        }
        match find_manifest(&self.cwd) {
            Some(path) => ManifestSource::File(path),
            None => ManifestSource::Builtin,
        }
    }
}
