//! Gravitational dynamics and approximate lighting for a galaxy-scale
//! particle population.
//!
//! The solver shares one Morton-keyed octree (from the `octree` crate)
//! between two read-only traversals per step: Barnes-Hut gravity
//! ([`forces::TreeGravity`]) and dominant-emitter selection
//! ([`lighting::LightSelector`]), so emissive bodies illuminate nearby
//! non-emissive ones without an O(n²) pass. [`simulation::Simulation`] wires
//! the per-step pipeline: build → aggregate → evaluate/illuminate →
//! integrate.

pub mod error;
pub mod forces;
pub mod frame;
pub mod generation;
pub mod integrator;
pub mod lighting;
pub mod particle;
pub mod sampling;
pub mod simulation;
pub mod state;

#[cfg(test)]
mod lighting_test;
#[cfg(test)]
mod simulation_test;
