//! Packages.toml manifest parsing and schema.
//!
//! A manifest declares the packages known to one invocation:
//!
//! ```toml
//! [[package]]
//! name = "cbase"
//! namespace = "github.com\\jurgen-kluft\\cbase"
//!
//! [[package]]
//! name = "cvkmem"
//! namespace = "github.com\\jurgen-kluft\\cvkmem"
//! dependencies = ["cbase"]
//! test-dependencies = ["cunittest"]
//! ```
//!
//! `namespace` defaults to the package name.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::Namespace;
use crate::registry::{ConfigError, PackageDecl, PackageRegistry};

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Packages.toml";

/// The parsed manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageEntry>,
}

/// One `[[package]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PackageEntry {
    pub name: String,

    #[serde(default)]
    pub namespace: Option<Namespace>,

    /// Packages linked by the library and the tests
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Packages linked only by the tests (e.g. a unit-test framework)
    #[serde(default)]
    pub test_dependencies: Vec<String>,
}

impl PackageEntry {
    fn to_decl(&self) -> Result<PackageDecl, ConfigError> {
        let namespace = match &self.namespace {
            Some(ns) => ns.clone(),
            None => Namespace::parse(&self.name)?,
        };

        let decl = self
            .dependencies
            .iter()
            .fold(PackageDecl::new(&self.name, namespace), |d, dep| {
                d.with_dependency(dep)
            });
        Ok(self
            .test_dependencies
            .iter()
            .fold(decl, |d, dep| d.with_test_dependency(dep)))
    }
}

impl Manifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse a manifest from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Register every declared package.
    pub fn into_registry(self) -> Result<PackageRegistry, ConfigError> {
        let mut registry = PackageRegistry::new();
        for entry in &self.packages {
            registry.register(entry.to_decl()?)?;
        }
        Ok(registry)
    }
}

/// Find `Packages.toml` in `start` or any parent directory.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CVKMEM: &str = r#"
[[package]]
name = "cbase"
namespace = "github.com\\jurgen-kluft\\cbase"

[[package]]
name = "cunittest"

[[package]]
name = "cvkmem"
namespace = "github.com/jurgen-kluft/cvkmem"
dependencies = ["cbase"]
test-dependencies = ["cunittest"]
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(CVKMEM).unwrap();
        assert_eq!(manifest.packages.len(), 3);

        let cvkmem = &manifest.packages[2];
        assert_eq!(cvkmem.dependencies, ["cbase"]);
        assert_eq!(cvkmem.test_dependencies, ["cunittest"]);
        assert_eq!(
            cvkmem.namespace.as_ref().unwrap().to_string(),
            "github.com\\jurgen-kluft\\cvkmem"
        );
    }

    #[test]
    fn test_namespace_defaults_to_name() {
        let registry = Manifest::parse(CVKMEM).unwrap().into_registry().unwrap();
        assert_eq!(
            registry.get("cunittest").unwrap().namespace().to_string(),
            "cunittest"
        );
    }

    #[test]
    fn test_registry_from_manifest_builds() {
        let registry = Manifest::parse(CVKMEM).unwrap().into_registry().unwrap();
        let graph = registry.get_package("cvkmem").unwrap();
        assert_eq!(graph.sub_packages(graph.root()).len(), 2);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = Manifest::parse(
            r#"
[[package]]
name = "cbase"
depends = ["x"]
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_duplicate_declarations() {
        let manifest = Manifest::parse(
            r#"
[[package]]
name = "cbase"

[[package]]
name = "cbase"
"#,
        )
        .unwrap();
        assert!(matches!(
            manifest.into_registry(),
            Err(ConfigError::DuplicatePackage { .. })
        ));
    }

    #[test]
    fn test_load_and_find() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), CVKMEM).unwrap();

        let found = find_manifest(&nested).unwrap();
        assert_eq!(found, tmp.path().join(MANIFEST_NAME));

        let manifest = Manifest::load(&found).unwrap();
        assert_eq!(manifest.packages.len(), 3);
    }

    #[test]
    fn test_load_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&path, "[[package]]\nname = 3\n").unwrap();

        let err = Manifest::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse manifest"));
    }
}
