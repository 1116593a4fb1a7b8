//! Core data structures for pkgraph.
//!
//! - Arena ids (PackageId, TargetId)
//! - Namespaces, packages and targets
//! - The descriptor graph and its builder
//! - Manifests declaring packages

pub mod graph;
pub mod ids;
pub mod manifest;
pub mod namespace;
pub mod package;
pub mod target;

pub use graph::{GraphBuilder, PackageGraph};
pub use ids::{PackageId, TargetId};
pub use manifest::{find_manifest, Manifest, PackageEntry, MANIFEST_NAME};
pub use namespace::Namespace;
pub use package::Package;
pub use target::{Target, TargetKind};
