//! Target definitions - what gets built.
//!
//! A Target is a buildable unit owned by exactly one package: either the
//! package's library or one of its unit-test projects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Namespace, PackageId, TargetId};

/// Suffix appended to a package name to form its test project name.
pub const TEST_PROJECT_SUFFIX: &str = "_test";

/// The kind of target being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Linkable library
    #[serde(alias = "lib")]
    Library,

    /// Unit-test executable
    #[serde(alias = "test")]
    TestProject,
}

impl TargetKind {
    /// Only libraries produce artifacts other targets can link against.
    pub fn is_linkable(&self) -> bool {
        matches!(self, TargetKind::Library)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Library => "library",
            TargetKind::TestProject => "test project",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the test project belonging to `package`.
pub fn test_project_name(package: &str) -> String {
    format!("{}{}", package, TEST_PROJECT_SUFFIX)
}

/// A build target and its dependency edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    kind: TargetKind,
    package: PackageId,
    namespace: Namespace,
    /// Edges to library targets, in insertion order
    dependencies: Vec<TargetId>,
}

impl Target {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: TargetKind,
        package: PackageId,
        namespace: Namespace,
    ) -> Self {
        Target {
            name: name.into(),
            kind,
            package,
            namespace,
            dependencies: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// The package that owns this target.
    pub fn package(&self) -> PackageId {
        self.package
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Direct dependency edges, in the order they were added.
    pub fn dependencies(&self) -> &[TargetId] {
        &self.dependencies
    }

    /// Add an edge unless it is already present.
    ///
    /// Returns `false` when the edge already existed.
    pub(crate) fn push_dependency(&mut self, dep: TargetId) -> bool {
        if self.dependencies.contains(&dep) {
            return false;
        }
        self.dependencies.push(dep);
        true
    }
}
