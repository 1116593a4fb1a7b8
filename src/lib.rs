//! pkgraph - package descriptor graphs for native C/C++ library projects
//!
//! A package owns a main library and a unit-test project; both link against
//! the main libraries of upstream packages, which the package includes as
//! sub-packages. This crate composes those descriptors into an immutable,
//! validated graph for a build engine's project-file generator to read.
//!
//! ```
//! use pkgraph::{Namespace, PackageDecl, PackageRegistry};
//!
//! let ns = |s: &str| Namespace::parse(s).unwrap();
//! let mut registry = PackageRegistry::new();
//! registry.register(PackageDecl::new("cbase", ns("github.com/jurgen-kluft/cbase"))).unwrap();
//! registry.register(PackageDecl::new("cunittest", ns("github.com/jurgen-kluft/cunittest"))).unwrap();
//! registry
//!     .register(
//!         PackageDecl::new("cvkmem", ns("github.com/jurgen-kluft/cvkmem"))
//!             .with_dependency("cbase")
//!             .with_test_dependency("cunittest"),
//!     )
//!     .unwrap();
//!
//! let graph = registry.get_package("cvkmem").unwrap();
//! let lib = graph.main_lib(graph.root()).unwrap();
//! assert_eq!(graph.dependencies(lib).len(), 1);
//! ```

pub mod core;
pub mod ops;
pub mod registry;
pub mod util;

pub use core::{
    GraphBuilder, Manifest, Namespace, Package, PackageGraph, PackageId, Target, TargetId,
    TargetKind,
};

pub use registry::{build_package_descriptor, ConfigError, PackageDecl, PackageRegistry};
pub use util::context::GlobalContext;
