//! Package composition - wiring one package on top of its upstream packages.

use crate::core::target::test_project_name;
use crate::core::{GraphBuilder, Namespace, PackageId, TargetId};
use crate::registry::ConfigError;

/// Compose a package descriptor from already-built upstream packages.
///
/// `dependencies` are linked by both the library and the test project;
/// `test_dependencies` (e.g. a unit-test framework) only by the test project.
/// All upstream packages become sub-packages of the new package.
///
/// The library is named after the package and the test project gets the
/// `_test` suffix; both live in `namespace`.
pub fn build_package_descriptor(
    builder: &mut GraphBuilder,
    name: &str,
    namespace: &Namespace,
    dependencies: &[PackageId],
    test_dependencies: &[PackageId],
) -> Result<PackageId, ConfigError> {
    check_not_included(builder, name, dependencies.iter().chain(test_dependencies))?;

    let dep_libs = upstream_libs(builder, name, dependencies)?;
    let test_libs = upstream_libs(builder, name, test_dependencies)?;

    let package = builder.new_package(name, namespace.clone())?;
    for &upstream in dependencies.iter().chain(test_dependencies) {
        builder.add_package(package, upstream)?;
    }

    let mainlib = builder.setup_lib_project(package, name, namespace.clone())?;
    builder.add_dependencies(mainlib, dep_libs.iter().copied())?;

    let maintest = builder.setup_test_project(package, &test_project_name(name), namespace.clone())?;
    builder.add_dependencies(maintest, dep_libs.iter().chain(&test_libs).copied())?;
    builder.add_dependency(maintest, mainlib)?;

    builder.add_main_lib(package, mainlib)?;
    builder.add_unittest(package, maintest)?;

    tracing::debug!(
        "composed package {} ({} dependencies, {} test dependencies)",
        name,
        dependencies.len(),
        test_dependencies.len()
    );

    Ok(package)
}

/// Main libraries of the given upstream packages.
fn upstream_libs(
    builder: &GraphBuilder,
    requirer: &str,
    upstream: &[PackageId],
) -> Result<Vec<TargetId>, ConfigError> {
    upstream
        .iter()
        .map(|&id| {
            let pkg = builder
                .package(id)
                .ok_or_else(|| ConfigError::UnresolvedDependency {
                    package: requirer.to_string(),
                    dependency: id.to_string(),
                })?;
            pkg.main_lib().ok_or_else(|| ConfigError::MissingMainLibrary {
                package: pkg.name().to_string(),
            })
        })
        .collect()
}

/// Reject upstream packages that already include a package called `name`.
fn check_not_included<'a>(
    builder: &GraphBuilder,
    name: &str,
    upstream: impl Iterator<Item = &'a PackageId>,
) -> Result<(), ConfigError> {
    // names are unique, so only an existing package of that name can be hit
    let Some(existing) = builder.find_package(name) else {
        return Ok(());
    };

    for &id in upstream {
        let hit = builder
            .sub_package_paths(id)
            .into_iter()
            .find(|(pkg, _)| *pkg == existing);

        if let Some((_, path)) = hit {
            let mut cycle = vec![name.to_string()];
            cycle.extend(
                path.iter()
                    .filter_map(|&p| builder.package(p))
                    .map(|p| p.name().to_string()),
            );
            return Err(ConfigError::CyclicDependency { cycle });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TargetKind;

    fn ns(name: &str) -> Namespace {
        Namespace::parse(&format!("github.com\\jurgen-kluft\\{}", name)).unwrap()
    }

    fn leaf(b: &mut GraphBuilder, name: &str) -> PackageId {
        build_package_descriptor(b, name, &ns(name), &[], &[]).unwrap()
    }

    fn names(b: &GraphBuilder, ids: &[TargetId]) -> Vec<String> {
        let mut out: Vec<String> = ids
            .iter()
            .map(|&id| b.target(id).unwrap().name().to_string())
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_cvkmem_composition() {
        let mut b = GraphBuilder::new();
        let cbase = leaf(&mut b, "cbase");
        let cunittest = leaf(&mut b, "cunittest");

        let cvkmem =
            build_package_descriptor(&mut b, "cvkmem", &ns("cvkmem"), &[cbase], &[cunittest])
                .unwrap();

        let pkg = b.package(cvkmem).unwrap();
        assert_eq!(pkg.sub_packages(), [cbase, cunittest]);

        let lib = pkg.main_lib().unwrap();
        assert_eq!(names(&b, b.target(lib).unwrap().dependencies()), ["cbase"]);

        assert_eq!(pkg.unittests().len(), 1);
        let test = b.target(pkg.unittests()[0]).unwrap();
        assert_eq!(test.name(), "cvkmem_test");
        assert_eq!(test.kind(), TargetKind::TestProject);
        assert_eq!(
            names(&b, test.dependencies()),
            ["cbase", "cunittest", "cvkmem"]
        );
    }

    #[test]
    fn test_leaf_package_targets() {
        let mut b = GraphBuilder::new();
        let cbase = leaf(&mut b, "cbase");

        let pkg = b.package(cbase).unwrap();
        let lib = b.target(pkg.main_lib().unwrap()).unwrap();
        assert_eq!(lib.kind(), TargetKind::Library);
        assert!(lib.dependencies().is_empty());
        assert_eq!(lib.namespace(), &ns("cbase"));

        let test = b.target(pkg.unittests()[0]).unwrap();
        assert_eq!(test.dependencies(), [pkg.main_lib().unwrap()]);
    }

    #[test]
    fn test_library_edges_are_direct_only() {
        let mut b = GraphBuilder::new();
        let cbase = leaf(&mut b, "cbase");
        let ccore =
            build_package_descriptor(&mut b, "ccore", &ns("ccore"), &[cbase], &[]).unwrap();
        let capp =
            build_package_descriptor(&mut b, "capp", &ns("capp"), &[ccore], &[]).unwrap();

        let lib = b.main_lib(capp).unwrap();
        assert_eq!(names(&b, b.target(lib).unwrap().dependencies()), ["ccore"]);
    }

    #[test]
    fn test_missing_main_library() {
        let mut b = GraphBuilder::new();
        let empty = b.new_package("empty", ns("empty")).unwrap();

        let err =
            build_package_descriptor(&mut b, "user", &ns("user"), &[empty], &[]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingMainLibrary {
                package: "empty".to_string()
            }
        );
        assert!(b.find_package("user").is_none());
    }

    #[test]
    fn test_unresolved_upstream_id() {
        let mut b = GraphBuilder::new();
        let err = build_package_descriptor(&mut b, "user", &ns("user"), &[PackageId::new(5)], &[])
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedDependency { .. }));
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let mut b = GraphBuilder::new();
        let cbase = leaf(&mut b, "cbase");
        let ccore =
            build_package_descriptor(&mut b, "ccore", &ns("ccore"), &[cbase], &[]).unwrap();

        // a second "cbase" on top of something that already includes cbase
        let err =
            build_package_descriptor(&mut b, "cbase", &ns("cbase"), &[ccore], &[]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::CyclicDependency {
                cycle: vec!["cbase".into(), "ccore".into(), "cbase".into()]
            }
        );
    }

    #[test]
    fn test_shared_dependency_deduplicated() {
        let mut b = GraphBuilder::new();
        let cbase = leaf(&mut b, "cbase");

        let pkg =
            build_package_descriptor(&mut b, "dup", &ns("dup"), &[cbase], &[cbase]).unwrap();
        let pkg = b.package(pkg).unwrap();
        assert_eq!(pkg.sub_packages(), [cbase]);

        let test = b.target(pkg.unittests()[0]).unwrap();
        assert_eq!(names(&b, test.dependencies()), ["cbase", "dup"]);
    }
}
