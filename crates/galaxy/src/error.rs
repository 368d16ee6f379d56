//! Error types for the solver.

use octree::OctreeError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimulationError {
    /// The octree arena was sized below what the population needs.
    #[error(transparent)]
    Octree(#[from] OctreeError),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
