//! Error types for octree construction.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OctreeError {
    /// The preallocated node arena cannot hold the tree.
    ///
    /// This indicates a misconfiguration (arena sizing), not a transient data
    /// condition: the builder fails fast rather than silently truncating the
    /// particle set.
    #[error("octree node arena capacity exceeded: needed at least {needed} nodes, capacity is {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, OctreeError>;
