//! Package registry - declared packages and graph composition.
//!
//! A `PackageRegistry` holds package declarations (name, namespace, upstream
//! packages). Asking it for a package composes the full descriptor graph:
//! every reachable declaration is ordered dependencies-first and composed
//! exactly once into a shared arena, so upstream descriptors are complete
//! before anything refers to them.

pub mod compose;
pub mod errors;

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::graph::{cycle_through, validate_name};
use crate::core::{GraphBuilder, Namespace, PackageGraph, PackageId};

pub use compose::build_package_descriptor;
pub use errors::ConfigError;

/// Namespace prefix used by the built-in package catalogue.
pub const BUILTIN_NAMESPACE_ROOT: &str = "github.com\\jurgen-kluft";

/// A declared package: what it is called, where it lives, what it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    name: String,
    namespace: Namespace,
    dependencies: Vec<String>,
    test_dependencies: Vec<String>,
}

impl PackageDecl {
    pub fn new(name: impl Into<String>, namespace: Namespace) -> Self {
        PackageDecl {
            name: name.into(),
            namespace,
            dependencies: Vec::new(),
            test_dependencies: Vec::new(),
        }
    }

    /// Add a package linked by both the library and the tests.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Add a package linked only by the tests.
    pub fn with_test_dependency(mut self, name: impl Into<String>) -> Self {
        self.test_dependencies.push(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn test_dependencies(&self) -> &[String] {
        &self.test_dependencies
    }

    fn upstream(&self) -> impl Iterator<Item = &String> {
        self.dependencies.iter().chain(&self.test_dependencies)
    }
}

/// The set of packages known to one invocation.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    decls: BTreeMap<String, PackageDecl>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in catalogue: `cbase`, `cunittest`, and
    /// `cvkmem` (library on `cbase`, tested with `cunittest`).
    pub fn builtin() -> Result<Self, ConfigError> {
        let ns = |name: &str| Namespace::parse(&format!("{}\\{}", BUILTIN_NAMESPACE_ROOT, name));

        let mut registry = Self::new();
        registry.register(PackageDecl::new("cbase", ns("cbase")?))?;
        registry.register(PackageDecl::new("cunittest", ns("cunittest")?))?;
        registry.register(
            PackageDecl::new("cvkmem", ns("cvkmem")?)
                .with_dependency("cbase")
                .with_test_dependency("cunittest"),
        )?;
        Ok(registry)
    }

    /// Add a declaration. Names must be unique.
    ///
    /// Upstream names are not checked here; they only have to resolve when a
    /// graph that reaches them is built.
    pub fn register(&mut self, decl: PackageDecl) -> Result<(), ConfigError> {
        validate_name(&decl.name)?;
        for upstream in decl.upstream() {
            validate_name(upstream)?;
        }
        if self.decls.contains_key(&decl.name) {
            return Err(ConfigError::DuplicatePackage {
                package: decl.name,
            });
        }

        tracing::trace!("registered package {}", decl.name);
        self.decls.insert(decl.name.clone(), decl);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PackageDecl> {
        self.decls.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    /// Declared packages, sorted by name.
    pub fn packages(&self) -> impl Iterator<Item = &PackageDecl> {
        self.decls.values()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Declared packages that no other declaration depends on.
    pub fn roots(&self) -> Vec<&str> {
        let used: HashSet<&str> = self
            .decls
            .values()
            .flat_map(|d| d.upstream())
            .map(String::as_str)
            .collect();

        self.decls
            .keys()
            .map(String::as_str)
            .filter(|name| !used.contains(name))
            .collect()
    }

    /// Build the descriptor graph of a declared package.
    pub fn get_package(&self, name: &str) -> Result<PackageGraph, ConfigError> {
        let decl = self.lookup(name)?;
        self.build_package_descriptor(name, &decl.namespace)
    }

    /// Build the descriptor graph of a declared package, placing the root
    /// package in `namespace` instead of its declared namespace.
    pub fn build_package_descriptor(
        &self,
        name: &str,
        namespace: &Namespace,
    ) -> Result<PackageGraph, ConfigError> {
        let order = self.composition_order(name)?;
        tracing::info!("composing `{}` from {} packages", name, order.len());

        let mut builder = GraphBuilder::new();
        let mut built: HashMap<&str, PackageId> = HashMap::new();

        for decl in order {
            let resolve = |deps: &[String]| -> Result<Vec<PackageId>, ConfigError> {
                deps.iter()
                    .map(|dep| {
                        built.get(dep.as_str()).copied().ok_or_else(|| {
                            ConfigError::UnresolvedDependency {
                                package: decl.name.clone(),
                                dependency: dep.clone(),
                            }
                        })
                    })
                    .collect()
            };
            let deps = resolve(&decl.dependencies)?;
            let test_deps = resolve(&decl.test_dependencies)?;

            let ns = if decl.name == name {
                namespace
            } else {
                &decl.namespace
            };
            let id = build_package_descriptor(&mut builder, &decl.name, ns, &deps, &test_deps)?;
            built.insert(&decl.name, id);
        }

        let root = built
            .get(name)
            .copied()
            .ok_or_else(|| self.unknown_package(name))?;
        builder.finish(root)
    }

    /// Declarations reachable from `root`, dependencies before dependents.
    fn composition_order(&self, root: &str) -> Result<Vec<&PackageDecl>, ConfigError> {
        let root = self.lookup(root)?;

        let mut graph = DiGraph::<&PackageDecl, ()>::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        let mut worklist = vec![root];
        nodes.insert(&root.name, graph.add_node(root));

        while let Some(decl) = worklist.pop() {
            let from = nodes[decl.name.as_str()];
            for upstream in decl.upstream() {
                let to = match nodes.get(upstream.as_str()) {
                    Some(&n) => n,
                    None => {
                        let dep = self.decls.get(upstream).ok_or_else(|| {
                            ConfigError::UnresolvedDependency {
                                package: decl.name.clone(),
                                dependency: upstream.clone(),
                            }
                        })?;
                        let n = graph.add_node(dep);
                        nodes.insert(&dep.name, n);
                        worklist.push(dep);
                        n
                    }
                };
                if !graph.contains_edge(from, to) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        match toposort(&graph, None) {
            // edges point at dependencies; reverse so they come first
            Ok(order) => Ok(order.into_iter().rev().map(|n| graph[n]).collect()),
            Err(cycle) => Err(ConfigError::CyclicDependency {
                cycle: cycle_through(&graph, cycle.node_id())
                    .into_iter()
                    .map(|n| graph[n].name.clone())
                    .collect(),
            }),
        }
    }

    fn lookup(&self, name: &str) -> Result<&PackageDecl, ConfigError> {
        self.decls
            .get(name)
            .ok_or_else(|| self.unknown_package(name))
    }

    fn unknown_package(&self, name: &str) -> ConfigError {
        let suggestions = self
            .decls
            .keys()
            .filter(|known| edit_distance(known, name) <= 2)
            .cloned()
            .collect();

        ConfigError::UnknownPackage {
            package: name.to_string(),
            suggestions,
        }
    }
}

/// Levenshtein distance, used for "did you mean" hints.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }

    prev[b.len()]
}
