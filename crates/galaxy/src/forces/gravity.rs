//! Direct pairwise gravity (O(N²) implementation)

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::forces::{ForceModel, G};
use crate::particle::Particle;

/// Direct O(N²) gravitational force computation.
///
/// Sums the contribution of every other body exactly. Simple and accurate,
/// but scales poorly for large populations.
///
/// Best for:
/// - Small populations (N < 100)
/// - Testing and validation against the tree approximation
pub struct DirectGravity {
    /// Softening length preventing singularities at close encounters.
    pub softening: f64,
}

impl DirectGravity {
    /// Creates a direct gravity force with no softening.
    pub fn new() -> Self {
        Self { softening: 0.0 }
    }

    /// Creates a direct gravity force with the given softening length.
    pub fn with_softening(softening: f64) -> Self {
        Self { softening }
    }
}

impl Default for DirectGravity {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceModel for DirectGravity {
    fn accelerations(&self, particles: &[Particle]) -> Vec<Vector3<f64>> {
        let eps2 = self.softening * self.softening;
        particles
            .par_iter()
            .enumerate()
            .map(|(index, body)| {
                particles
                    .iter()
                    .enumerate()
                    .filter(|(other_index, _)| *other_index != index)
                    .map(|(_, other)| {
                        let dr = other.position - body.position;
                        let r2 = dr.norm_squared() + eps2;
                        let r = r2.sqrt();
                        dr * (G * other.mass / (r2 * r))
                    })
                    .fold(Vector3::zeros(), |acc, a| acc + a)
            })
            .collect()
    }

    fn potential_energy(&self, particles: &[Particle]) -> f64 {
        // Each pair counted once.
        let eps2 = self.softening * self.softening;
        particles
            .iter()
            .enumerate()
            .flat_map(|(i, a)| {
                particles[i + 1..].iter().map(move |b| {
                    let dr = a.position - b.position;
                    let r = (dr.norm_squared() + eps2).sqrt();
                    -G * a.mass * b.mass / r
                })
            })
            .sum()
    }
}
