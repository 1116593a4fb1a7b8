//! High-level operations.
//!
//! This module contains the implementation of pkgraph commands.

pub mod load;
pub mod render;

pub use load::{describe_package, load_registry};
pub use render::{render_json, render_list, render_targets, render_tree, TreeOptions};
