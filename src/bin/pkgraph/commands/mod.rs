//! Command implementations

pub mod emit;
pub mod list;
pub mod targets;
pub mod tree;
