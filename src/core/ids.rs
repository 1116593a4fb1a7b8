//! Arena identifiers for packages and targets.
//!
//! Ids are plain indices into the arena of the `GraphBuilder` that issued
//! them. They are only meaningful for that builder and the `PackageGraph`
//! it finishes into.

use std::fmt;

/// Stable handle to a package in a descriptor graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

/// Stable handle to a target in a descriptor graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u32);

macro_rules! arena_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            pub(crate) fn new(index: usize) -> Self {
                $ty(index as u32)
            }

            /// Position of the node in its arena.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(PackageId, "package");
arena_id!(TargetId, "target");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        assert_eq!(PackageId::new(7).index(), 7);
        assert_eq!(TargetId::new(0).index(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(PackageId::new(3).to_string(), "package#3");
        assert_eq!(TargetId::new(12).to_string(), "target#12");
    }
}
