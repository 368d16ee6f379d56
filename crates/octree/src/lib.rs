//! Morton-keyed octree shared between gravitational dynamics and lighting.
//!
//! This crate provides the spatial index at the heart of the solver: particle
//! positions are encoded into 64-bit Morton keys, sorted, and assembled into a
//! layered octree stored in a single contiguous arena. A bottom-up aggregation
//! pass then fills every node with two multipole summaries over the same
//! structure:
//!
//! - **mass** (total mass + center of mass) for Barnes-Hut force evaluation,
//! - **emission** (summed RGBA color + emission-weighted centroid) so distant
//!   emissive clusters can be treated as single point light sources.
//!
//! The tree is rebuilt from scratch every time positions change; during the
//! aggregate/evaluate phases it is immutable and may be read concurrently.

use nalgebra::{Point3, Vector4};

pub mod aggregate;
pub mod bounds;
pub mod builder;
pub mod error;
pub mod morton;
pub mod node;

#[cfg(test)]
mod aggregate_test;

pub use bounds::SceneCube;
pub use builder::Octree;
pub use error::OctreeError;
pub use morton::{MortonEntry, INVALID_MORTON_CODE};
pub use node::{NodeId, OctreeNode};

/// Trait for objects that can be indexed by the octree.
///
/// This is the minimal interface needed to encode a body and aggregate its
/// mass: position and mass. Types implementing this trait must be `Copy` to
/// avoid expensive cloning during tree construction.
pub trait Massive: Copy {
    /// Position of this body in world coordinates.
    fn position(&self) -> Point3<f64>;

    /// Mass of this body in simulation units.
    fn mass(&self) -> f64;
}

/// Trait for objects that may emit light.
///
/// The aggregation pass sums emissions per node so the lighting traversal can
/// treat whole subtrees as single emitters. Non-emitting bodies return zero.
pub trait Emissive {
    /// RGBA emission of this body; all-zero when the body does not emit.
    fn emission(&self) -> Vector4<f64>;
}
