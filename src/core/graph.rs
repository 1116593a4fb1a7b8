//! Descriptor graph - the arena of packages and targets.
//!
//! `GraphBuilder` is the mutable side: it mirrors the operations a build
//! engine offers for declaring packages (new package, include package, set up
//! library / test project, add dependency, register main lib / unittest).
//! `finish` validates the whole arena once and freezes it into a
//! `PackageGraph`, which only has read accessors.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Serialize, Serializer};

use crate::core::{Namespace, Package, PackageId, Target, TargetId, TargetKind};
use crate::registry::ConfigError;

/// Check that a package or target name is usable as an identifier.
pub fn validate_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("name must not contain whitespace"));
    }
    if name.contains(['\\', '/', ':']) {
        return Err(invalid("name must not contain `\\`, `/` or `:`"));
    }
    Ok(())
}

/// Mutable arena used while composing packages.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    packages: Vec<Package>,
    targets: Vec<Target>,
    by_name: HashMap<String, PackageId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new, empty package.
    pub fn new_package(
        &mut self,
        name: &str,
        namespace: Namespace,
    ) -> Result<PackageId, ConfigError> {
        validate_name(name)?;
        if self.by_name.contains_key(name) {
            return Err(ConfigError::DuplicatePackage {
                package: name.to_string(),
            });
        }

        let id = PackageId::new(self.packages.len());
        self.packages.push(Package::new(name, namespace));
        self.by_name.insert(name.to_string(), id);
        tracing::trace!("new package {} as {}", name, id);
        Ok(id)
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.index())
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id.index())
    }

    pub fn find_package(&self, name: &str) -> Option<PackageId> {
        self.by_name.get(name).copied()
    }

    /// The main library of a package, if it has one.
    pub fn main_lib(&self, id: PackageId) -> Option<TargetId> {
        self.package(id).and_then(Package::main_lib)
    }

    /// Include `child` as a sub-package of `parent`.
    ///
    /// Including the same package twice is a no-op.
    pub fn add_package(&mut self, parent: PackageId, child: PackageId) -> Result<(), ConfigError> {
        self.package_ref(child)?;
        if parent == child {
            let name = self.package_ref(parent)?.name().to_string();
            return Err(ConfigError::CyclicDependency {
                cycle: vec![name.clone(), name],
            });
        }
        self.package_mut(parent)?.push_sub_package(child);
        Ok(())
    }

    /// Create the library target of a package (not yet registered as main lib).
    pub fn setup_lib_project(
        &mut self,
        package: PackageId,
        name: &str,
        namespace: Namespace,
    ) -> Result<TargetId, ConfigError> {
        self.new_target(package, name, TargetKind::Library, namespace)
    }

    /// Create a unit-test target of a package (not yet registered).
    pub fn setup_test_project(
        &mut self,
        package: PackageId,
        name: &str,
        namespace: Namespace,
    ) -> Result<TargetId, ConfigError> {
        self.new_target(package, name, TargetKind::TestProject, namespace)
    }

    fn new_target(
        &mut self,
        package: PackageId,
        name: &str,
        kind: TargetKind,
        namespace: Namespace,
    ) -> Result<TargetId, ConfigError> {
        validate_name(name)?;
        let owner = self.package_ref(package)?.name().to_string();
        if self
            .targets
            .iter()
            .any(|t| t.package() == package && t.name() == name)
        {
            return Err(ConfigError::DuplicateTarget {
                package: owner,
                target: name.to_string(),
            });
        }

        let id = TargetId::new(self.targets.len());
        self.targets.push(Target::new(name, kind, package, namespace));
        tracing::trace!("new {} {}:{} as {}", kind, owner, name, id);
        Ok(id)
    }

    /// Record a dependency edge from `from` to the library `to`.
    ///
    /// Duplicate edges collapse into one.
    pub fn add_dependency(&mut self, from: TargetId, to: TargetId) -> Result<(), ConfigError> {
        let dep = self.target_ref(to)?;
        if !dep.kind().is_linkable() {
            return Err(ConfigError::UnexpectedTargetKind {
                target: self.label(to),
                expected: TargetKind::Library,
                found: dep.kind(),
            });
        }
        self.target_ref(from)?;
        if from == to {
            let label = self.label(from);
            return Err(ConfigError::CyclicDependency {
                cycle: vec![label.clone(), label],
            });
        }

        if self.target_mut(from)?.push_dependency(to) {
            tracing::debug!("edge {} -> {}", self.label(from), self.label(to));
        }
        Ok(())
    }

    pub fn add_dependencies(
        &mut self,
        from: TargetId,
        to: impl IntoIterator<Item = TargetId>,
    ) -> Result<(), ConfigError> {
        for dep in to {
            self.add_dependency(from, dep)?;
        }
        Ok(())
    }

    /// Register `target` as the package's single main library.
    pub fn add_main_lib(&mut self, package: PackageId, target: TargetId) -> Result<(), ConfigError> {
        self.expect_owned(package, target, TargetKind::Library)?;

        let pkg = self.package_ref(package)?;
        match pkg.main_lib() {
            Some(existing) if existing == target => Ok(()),
            Some(existing) => Err(ConfigError::DuplicateMainLibrary {
                package: pkg.name().to_string(),
                existing: self.label(existing),
                new: self.label(target),
            }),
            None => {
                self.package_mut(package)?.set_main_lib(target);
                Ok(())
            }
        }
    }

    /// Register a unit-test target on the package.
    pub fn add_unittest(&mut self, package: PackageId, target: TargetId) -> Result<(), ConfigError> {
        self.expect_owned(package, target, TargetKind::TestProject)?;
        self.package_mut(package)?.push_unittest(target);
        Ok(())
    }

    /// All packages reachable from `from` through sub-package links,
    /// including `from` itself, each paired with the path that reaches it.
    pub fn sub_package_paths(&self, from: PackageId) -> Vec<(PackageId, Vec<PackageId>)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut queue = VecDeque::from([(from, vec![from])]);

        while let Some((id, path)) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(pkg) = self.package(id) {
                for &child in pkg.sub_packages() {
                    let mut child_path = path.clone();
                    child_path.push(child);
                    queue.push_back((child, child_path));
                }
            }
            out.push((id, path));
        }

        out
    }

    /// Validate the arena and freeze it, rooted at `root`.
    pub fn finish(self, root: PackageId) -> Result<PackageGraph, ConfigError> {
        self.package_ref(root)?;
        self.check_references()?;

        let package_order = self.check_sub_packages_acyclic()?;
        self.check_targets_acyclic()?;

        let by_name = self
            .by_name
            .into_iter()
            .collect::<BTreeMap<String, PackageId>>();

        tracing::debug!(
            "finished descriptor graph: {} packages, {} targets",
            self.packages.len(),
            self.targets.len()
        );

        Ok(PackageGraph {
            packages: self.packages,
            targets: self.targets,
            by_name,
            root,
            build_order: package_order,
        })
    }

    fn check_references(&self) -> Result<(), ConfigError> {
        for pkg in &self.packages {
            for &sub in pkg.sub_packages() {
                self.package_ref(sub)?;
            }
            for target in pkg.main_lib().iter().chain(pkg.unittests()) {
                self.target_ref(*target)?;
            }
        }
        for target in &self.targets {
            self.package_ref(target.package())?;
            for &dep in target.dependencies() {
                if !self.target_ref(dep)?.kind().is_linkable() {
                    return Err(ConfigError::UnexpectedTargetKind {
                        target: self.label(dep),
                        expected: TargetKind::Library,
                        found: TargetKind::TestProject,
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns packages with sub-packages ordered before the packages
    /// including them.
    fn check_sub_packages_acyclic(&self) -> Result<Vec<PackageId>, ConfigError> {
        let mut graph = DiGraph::<PackageId, ()>::with_capacity(self.packages.len(), 0);
        let nodes: Vec<NodeIndex> = (0..self.packages.len())
            .map(|i| graph.add_node(PackageId::new(i)))
            .collect();
        for (i, pkg) in self.packages.iter().enumerate() {
            for sub in pkg.sub_packages() {
                graph.add_edge(nodes[i], nodes[sub.index()], ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().rev().map(|n| graph[n]).collect()),
            Err(cycle) => {
                let path = cycle_through(&graph, cycle.node_id());
                Err(ConfigError::CyclicDependency {
                    cycle: path
                        .into_iter()
                        .map(|n| self.packages[graph[n].index()].name().to_string())
                        .collect(),
                })
            }
        }
    }

    fn check_targets_acyclic(&self) -> Result<(), ConfigError> {
        let mut graph = DiGraph::<TargetId, ()>::with_capacity(self.targets.len(), 0);
        let nodes: Vec<NodeIndex> = (0..self.targets.len())
            .map(|i| graph.add_node(TargetId::new(i)))
            .collect();
        for (i, target) in self.targets.iter().enumerate() {
            for dep in target.dependencies() {
                graph.add_edge(nodes[i], nodes[dep.index()], ());
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            let path = cycle_through(&graph, cycle.node_id());
            ConfigError::CyclicDependency {
                cycle: path.into_iter().map(|n| self.label(graph[n])).collect(),
            }
        })
    }

    fn expect_owned(
        &self,
        package: PackageId,
        target: TargetId,
        kind: TargetKind,
    ) -> Result<(), ConfigError> {
        let pkg = self.package_ref(package)?;
        let t = self.target_ref(target)?;
        if t.kind() != kind {
            return Err(ConfigError::UnexpectedTargetKind {
                target: self.label(target),
                expected: kind,
                found: t.kind(),
            });
        }
        if t.package() != package {
            return Err(ConfigError::DanglingReference {
                reference: format!("{} is not owned by package `{}`", self.label(target), pkg.name()),
            });
        }
        Ok(())
    }

    fn label(&self, id: TargetId) -> String {
        match self.target(id) {
            Some(t) => match self.package(t.package()) {
                Some(pkg) => format!("{}:{}", pkg.name(), t.name()),
                None => t.name().to_string(),
            },
            None => id.to_string(),
        }
    }

    fn package_ref(&self, id: PackageId) -> Result<&Package, ConfigError> {
        self.package(id).ok_or_else(|| ConfigError::DanglingReference {
            reference: id.to_string(),
        })
    }

    fn package_mut(&mut self, id: PackageId) -> Result<&mut Package, ConfigError> {
        self.packages
            .get_mut(id.index())
            .ok_or_else(|| ConfigError::DanglingReference {
                reference: id.to_string(),
            })
    }

    fn target_ref(&self, id: TargetId) -> Result<&Target, ConfigError> {
        self.target(id).ok_or_else(|| ConfigError::DanglingReference {
            reference: id.to_string(),
        })
    }

    fn target_mut(&mut self, id: TargetId) -> Result<&mut Target, ConfigError> {
        self.targets
            .get_mut(id.index())
            .ok_or_else(|| ConfigError::DanglingReference {
                reference: id.to_string(),
            })
    }
}

/// Shortest cycle through `start`, returned as `[start, .., start]`.
///
/// `start` must lie on a cycle, as reported by `toposort`.
pub(crate) fn cycle_through<N>(graph: &DiGraph<N, ()>, start: NodeIndex) -> Vec<NodeIndex> {
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            if next == start {
                let mut path = vec![start, node];
                let mut cur = node;
                while let Some(&p) = parent.get(&cur) {
                    path.push(p);
                    cur = p;
                }
                // collected back to front
                path.reverse();
                return path;
            }
            if !parent.contains_key(&next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }

    vec![start, start]
}

/// The frozen descriptor graph for one root package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGraph {
    packages: Vec<Package>,
    targets: Vec<Target>,
    by_name: BTreeMap<String, PackageId>,
    root: PackageId,
    build_order: Vec<PackageId>,
}

impl PackageGraph {
    /// The package this graph was built for.
    pub fn root(&self) -> PackageId {
        self.root
    }

    pub fn root_package(&self) -> &Package {
        self.package(self.root)
    }

    /// Look up a package. Panics if `id` was issued by a different builder.
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    /// Look up a target. Panics if `id` was issued by a different builder.
    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id.index()]
    }

    pub fn find_package(&self, name: &str) -> Option<PackageId> {
        self.by_name.get(name).copied()
    }

    pub fn main_lib(&self, id: PackageId) -> Option<TargetId> {
        self.package(id).main_lib()
    }

    pub fn unittests(&self, id: PackageId) -> &[TargetId] {
        self.package(id).unittests()
    }

    pub fn sub_packages(&self, id: PackageId) -> &[PackageId] {
        self.package(id).sub_packages()
    }

    pub fn dependencies(&self, id: TargetId) -> &[TargetId] {
        self.target(id).dependencies()
    }

    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, p)| (PackageId::new(i), p))
    }

    pub fn targets(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, t)| (TargetId::new(i), t))
    }

    /// Packages ordered so every package comes after the packages it includes.
    pub fn build_order(&self) -> &[PackageId] {
        &self.build_order
    }

    /// Human-readable `package:target` label.
    pub fn label(&self, id: TargetId) -> String {
        let target = self.target(id);
        format!("{}:{}", self.package(target.package()).name(), target.name())
    }

    fn to_document(&self) -> GraphDocument<'_> {
        GraphDocument {
            root: self.root_package().name(),
            build_order: self
                .build_order
                .iter()
                .map(|&id| self.package(id).name())
                .collect(),
            packages: self
                .packages
                .iter()
                .map(|p| PackageDocument {
                    name: p.name(),
                    namespace: p.namespace().to_string(),
                    sub_packages: p
                        .sub_packages()
                        .iter()
                        .map(|&id| self.package(id).name())
                        .collect(),
                    main_lib: p.main_lib().map(|id| self.label(id)),
                    unittests: p.unittests().iter().map(|&id| self.label(id)).collect(),
                })
                .collect(),
            targets: self
                .targets()
                .map(|(id, t)| TargetDocument {
                    label: self.label(id),
                    name: t.name(),
                    kind: t.kind(),
                    package: self.package(t.package()).name(),
                    namespace: t.namespace().to_string(),
                    output_path: t.namespace().to_path().to_string_lossy().into_owned(),
                    dependencies: t.dependencies().iter().map(|&d| self.label(d)).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    root: &'a str,
    build_order: Vec<&'a str>,
    packages: Vec<PackageDocument<'a>>,
    targets: Vec<TargetDocument<'a>>,
}

#[derive(Serialize)]
struct PackageDocument<'a> {
    name: &'a str,
    namespace: String,
    sub_packages: Vec<&'a str>,
    main_lib: Option<String>,
    unittests: Vec<String>,
}

#[derive(Serialize)]
struct TargetDocument<'a> {
    label: String,
    name: &'a str,
    kind: TargetKind,
    package: &'a str,
    namespace: String,
    output_path: String,
    dependencies: Vec<String>,
}

impl Serialize for PackageGraph {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_document().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(s: &str) -> Namespace {
        Namespace::parse(s).unwrap()
    }

    fn lib_package(b: &mut GraphBuilder, name: &str) -> (PackageId, TargetId) {
        let pkg = b.new_package(name, ns(name)).unwrap();
        let lib = b.setup_lib_project(pkg, name, ns(name)).unwrap();
        b.add_main_lib(pkg, lib).unwrap();
        (pkg, lib)
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("cbase").is_ok());
        assert!(validate_name("c-base_2").is_ok());
        for bad in ["", "c base", "a/b", "a\\b", "a:b"] {
            assert!(matches!(
                validate_name(bad),
                Err(ConfigError::InvalidName { .. })
            ));
        }
    }

    #[test]
    fn test_duplicate_package_name() {
        let mut b = GraphBuilder::new();
        b.new_package("cbase", ns("cbase")).unwrap();
        let err = b.new_package("cbase", ns("other")).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePackage { package } if package == "cbase"));
    }

    #[test]
    fn test_edges_to_test_projects_rejected() {
        let mut b = GraphBuilder::new();
        let (pkg, lib) = lib_package(&mut b, "cbase");
        let test = b.setup_test_project(pkg, "cbase_test", ns("cbase")).unwrap();

        let err = b.add_dependency(lib, test).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnexpectedTargetKind {
                expected: TargetKind::Library,
                found: TargetKind::TestProject,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_edges_tolerated() {
        let mut b = GraphBuilder::new();
        let (_, base) = lib_package(&mut b, "cbase");
        let (_, mem) = lib_package(&mut b, "cvkmem");

        b.add_dependency(mem, base).unwrap();
        b.add_dependency(mem, base).unwrap();
        assert_eq!(b.target(mem).unwrap().dependencies(), [base]);
    }

    #[test]
    fn test_second_main_lib_rejected() {
        let mut b = GraphBuilder::new();
        let (pkg, _) = lib_package(&mut b, "cbase");
        let other = b.setup_lib_project(pkg, "cbase_extra", ns("cbase")).unwrap();

        let err = b.add_main_lib(pkg, other).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateMainLibrary { .. }));
    }

    #[test]
    fn test_main_lib_must_belong_to_package() {
        let mut b = GraphBuilder::new();
        let (_, base_lib) = lib_package(&mut b, "cbase");
        let mem = b.new_package("cvkmem", ns("cvkmem")).unwrap();

        let err = b.add_main_lib(mem, base_lib).unwrap_err();
        assert!(matches!(err, ConfigError::DanglingReference { .. }));
    }

    #[test]
    fn test_foreign_ids_are_dangling() {
        let mut b = GraphBuilder::new();
        let (pkg, _) = lib_package(&mut b, "cbase");

        let err = b.add_package(pkg, PackageId::new(42)).unwrap_err();
        assert!(matches!(err, ConfigError::DanglingReference { .. }));
        let err = b.finish(PackageId::new(9)).unwrap_err();
        assert!(matches!(err, ConfigError::DanglingReference { .. }));
    }

    #[test]
    fn test_sub_package_cycle_detected_on_finish() {
        let mut b = GraphBuilder::new();
        let (a, _) = lib_package(&mut b, "a");
        let (bb, _) = lib_package(&mut b, "b");
        let (c, _) = lib_package(&mut b, "c");
        b.add_package(a, bb).unwrap();
        b.add_package(bb, c).unwrap();
        b.add_package(c, a).unwrap();

        let err = b.finish(a).unwrap_err();
        match err {
            ConfigError::CyclicDependency { cycle } => {
                assert_eq!(cycle.len(), 4);
                assert_eq!(cycle.first(), cycle.last());
                for name in ["a", "b", "c"] {
                    assert!(cycle.iter().any(|n| n == name));
                }
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_include_rejected() {
        let mut b = GraphBuilder::new();
        let (a, _) = lib_package(&mut b, "a");
        let err = b.add_package(a, a).unwrap_err();
        assert!(matches!(err, ConfigError::CyclicDependency { .. }));
    }

    #[test]
    fn test_target_cycle_detected_on_finish() {
        let mut b = GraphBuilder::new();
        let (a, a_lib) = lib_package(&mut b, "a");
        let (_, b_lib) = lib_package(&mut b, "b");
        b.add_dependency(a_lib, b_lib).unwrap();
        b.add_dependency(b_lib, a_lib).unwrap();

        let err = b.finish(a).unwrap_err();
        match err {
            ConfigError::CyclicDependency { cycle } => {
                assert_eq!(cycle.len(), 3);
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"a:a".to_string()));
                assert!(cycle.contains(&"b:b".to_string()));
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_build_order_puts_sub_packages_first() {
        let mut b = GraphBuilder::new();
        let (base, _) = lib_package(&mut b, "cbase");
        let (unit, _) = lib_package(&mut b, "cunittest");
        let (mem, _) = lib_package(&mut b, "cvkmem");
        b.add_package(mem, base).unwrap();
        b.add_package(mem, unit).unwrap();
        b.add_package(unit, base).unwrap();

        let graph = b.finish(mem).unwrap();
        let order: Vec<&str> = graph
            .build_order()
            .iter()
            .map(|&id| graph.package(id).name())
            .collect();
        assert_eq!(order, ["cbase", "cunittest", "cvkmem"]);
    }

    #[test]
    fn test_graph_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PackageGraph>();
    }

    #[test]
    fn test_sub_package_paths() {
        let mut b = GraphBuilder::new();
        let (a, _) = lib_package(&mut b, "a");
        let (bb, _) = lib_package(&mut b, "b");
        let (c, _) = lib_package(&mut b, "c");
        b.add_package(a, bb).unwrap();
        b.add_package(bb, c).unwrap();

        let paths = b.sub_package_paths(a);
        assert_eq!(paths.len(), 3);
        let (_, to_c) = paths.iter().find(|(id, _)| *id == c).unwrap();
        assert_eq!(to_c, &vec![a, bb, c]);
    }
}
