//! Registry loading and graph composition for commands.

use anyhow::{bail, Result};

use crate::core::{Manifest, PackageGraph};
use crate::registry::PackageRegistry;
use crate::util::{GlobalContext, ManifestSource};

/// Load the package registry the context points at.
pub fn load_registry(ctx: &GlobalContext) -> Result<PackageRegistry> {
    let registry = match ctx.manifest_source() {
        ManifestSource::File(path) => {
            tracing::debug!("loading manifest {}", path.display());
            Manifest::load(&path)?.into_registry()?
        }
        ManifestSource::Builtin => {
            tracing::debug!("no manifest found, using built-in packages");
            PackageRegistry::builtin()?
        }
    };

    tracing::debug!("{} packages declared", registry.len());
    Ok(registry)
}

/// Load the registry and compose the descriptor graph of `package`.
///
/// Without a package name, the single declared package nothing else depends
/// on is used.
pub fn describe_package(ctx: &GlobalContext, package: Option<&str>) -> Result<PackageGraph> {
    let registry = load_registry(ctx)?;

    let name = match package {
        Some(name) => name,
        None => match registry.roots().as_slice() {
            [only] => *only,
            [] => bail!("no root package declared; pass a package name"),
            many => bail!(
                "several root packages declared ({}); pass a package name",
                many.join(", ")
            ),
        },
    };

    Ok(registry.get_package(name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MANIFEST_NAME;
    use crate::registry::ConfigError;
    use crate::util::Config;
    use tempfile::TempDir;

    fn ctx(dir: &std::path::Path) -> GlobalContext {
        GlobalContext::with_cwd(dir.to_path_buf()).with_config(Config::default())
    }

    #[test]
    fn test_builtin_fallback() {
        let tmp = TempDir::new().unwrap();
        let graph = describe_package(&ctx(tmp.path()), Some("cvkmem")).unwrap();
        assert_eq!(graph.root_package().name(), "cvkmem");
    }

    #[test]
    fn test_default_root() {
        let tmp = TempDir::new().unwrap();
        let graph = describe_package(&ctx(tmp.path()), None).unwrap();
        assert_eq!(graph.root_package().name(), "cvkmem");
    }

    #[test]
    fn test_ambiguous_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(MANIFEST_NAME),
            "[[package]]\nname = \"a\"\n\n[[package]]\nname = \"b\"\n",
        )
        .unwrap();

        let err = describe_package(&ctx(tmp.path()), None).unwrap_err();
        assert!(err.to_string().contains("several root packages declared (a, b)"));
    }

    #[test]
    fn test_manifest_on_disk() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(MANIFEST_NAME),
            "[[package]]\nname = \"solo\"\n",
        )
        .unwrap();

        let registry = load_registry(&ctx(tmp.path())).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("solo"));
    }

    #[test]
    fn test_config_error_survives_anyhow() {
        let tmp = TempDir::new().unwrap();
        let err = describe_package(&ctx(tmp.path()), Some("nope")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownPackage { .. })
        ));
    }
}
