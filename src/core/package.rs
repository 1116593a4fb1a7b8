//! Package - a named unit owning a library, its tests, and the packages it
//! includes.

use crate::core::{Namespace, PackageId, TargetId};

/// A package descriptor.
///
/// Packages are created and wired through a `GraphBuilder`; once the builder
/// is finished the descriptor can no longer be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    namespace: Namespace,
    sub_packages: Vec<PackageId>,
    main_lib: Option<TargetId>,
    unittests: Vec<TargetId>,
}

impl Package {
    pub(crate) fn new(name: impl Into<String>, namespace: Namespace) -> Self {
        Package {
            name: name.into(),
            namespace,
            sub_packages: Vec::new(),
            main_lib: None,
            unittests: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Packages included by this one, in the order they were added.
    pub fn sub_packages(&self) -> &[PackageId] {
        &self.sub_packages
    }

    /// The package's main library, if one has been registered.
    pub fn main_lib(&self) -> Option<TargetId> {
        self.main_lib
    }

    pub fn unittests(&self) -> &[TargetId] {
        &self.unittests
    }

    pub(crate) fn push_sub_package(&mut self, id: PackageId) -> bool {
        if self.sub_packages.contains(&id) {
            return false;
        }
        self.sub_packages.push(id);
        true
    }

    pub(crate) fn set_main_lib(&mut self, id: TargetId) {
        self.main_lib = Some(id);
    }

    pub(crate) fn push_unittest(&mut self, id: TargetId) -> bool {
        if self.unittests.contains(&id) {
            return false;
        }
        self.unittests.push(id);
        true
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.namespace)
    }
}
