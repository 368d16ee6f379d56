//! Force models for the particle population.
//!
//! This module provides the [`ForceModel`] trait and its gravity
//! implementations: the exact [`DirectGravity`] reference and the
//! tree-accelerated [`TreeGravity`].

use nalgebra::Vector3;

use crate::particle::Particle;

pub mod gravity;
pub mod tree_gravity;


pub use gravity::DirectGravity;
pub use tree_gravity::TreeGravity;

/// Gravitational constant in simulation units.
///
/// The population is generated in units where G = 1; masses and distances
/// carry no physical dimension.
pub const G: f64 = 1.0;

/// A source of acceleration on the particle population.
///
/// The interface is batch-oriented (one call produces accelerations for
/// every particle) so tree-based models can build their spatial index once
/// per call instead of once per body.
///
/// # Examples
///
/// ```
/// use nalgebra::{Point3, Vector3, Vector4};
/// use galaxy::forces::{DirectGravity, ForceModel};
/// use galaxy::particle::{Particle, ParticleKind};
///
/// let particles = vec![
///     Particle::new(
///         ParticleKind::Star,
///         1.0,
///         0.1,
///         Point3::origin(),
///         Vector3::zeros(),
///         Vector4::new(1.0, 1.0, 1.0, 1.0),
///     ),
///     Particle::new(
///         ParticleKind::Planet,
///         1e-6,
///         0.01,
///         Point3::new(1.0, 0.0, 0.0),
///         Vector3::new(0.0, 1.0, 0.0),
///         Vector4::new(0.4, 0.5, 0.6, 1.0),
///     ),
/// ];
///
/// let gravity = DirectGravity::new();
/// let accelerations = gravity.accelerations(&particles);
///
/// // The planet is pulled back toward the star.
/// assert!(accelerations[1].x < 0.0);
/// ```
pub trait ForceModel: Send + Sync {
    /// Accelerations for every particle, indices aligned with the input.
    fn accelerations(&self, particles: &[Particle]) -> Vec<Vector3<f64>>;

    /// Potential energy of the configuration (optional).
    ///
    /// Default implementation returns 0.0. Override for models that
    /// contribute potential energy, so integrator tests can track the total.
    fn potential_energy(&self, _particles: &[Particle]) -> f64 {
        0.0
    }
}
