//! Tree-accelerated gravity using the Barnes-Hut approximation (O(N log N))

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use octree::{NodeId, Octree, SceneCube};

use crate::forces::{DirectGravity, ForceModel, G};
use crate::particle::Particle;

/// Barnes-Hut gravitational force computation over the shared octree.
///
/// Distant clusters are replaced by their center-of-mass aggregate whenever
/// the ratio of the node's extent s to the distance d satisfies s/d < θ;
/// otherwise the traversal descends into the node's existing children.
///
/// # Opening angle (θ)
///
/// Controls the accuracy/speed tradeoff:
/// - θ = 0.0: exact, never approximate (same result as [`DirectGravity`])
/// - θ = 0.5: high accuracy, fast (default)
/// - θ = 1.0: lower accuracy, faster
///
/// # Examples
///
/// ```
/// use nalgebra::{Point3, Vector3, Vector4};
/// use galaxy::forces::{ForceModel, TreeGravity};
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
///         Point3::new(2.0, 0.0, 0.0),
///         Vector3::zeros(),
///         Vector4::new(0.4, 0.5, 0.6, 1.0),
///     ),
/// ];
///
/// let gravity = TreeGravity::new();
/// let accelerations = gravity.accelerations(&particles);
/// assert!(accelerations[1].x < 0.0);
/// ```
pub struct TreeGravity {
    /// Opening angle θ.
    pub theta: f64,
    /// Softening length preventing singularities at close encounters.
    pub softening: f64,
}

impl TreeGravity {
    /// Creates a tree gravity force with θ = 0.5 and no softening.
    pub fn new() -> Self {
        Self {
            theta: 0.5,
            softening: 0.0,
        }
    }

    /// Creates a tree gravity force with a custom opening angle.
    pub fn with_theta(theta: f64) -> Self {
        Self {
            theta,
            softening: 0.0,
        }
    }

    /// Creates a tree gravity force with opening angle and softening.
    pub fn with_softening(theta: f64, softening: f64) -> Self {
        Self { theta, softening }
    }

    /// Accelerations for every particle against an already aggregated tree
    /// snapshot.
    ///
    /// This is the entry point the step driver uses: the tree is built and
    /// aggregated once per step and shared, read-only, with the lighting
    /// pass. The pass never fails; degenerate configurations are softened,
    /// not reported.
    pub fn accelerations_from(
        &self,
        tree: &Octree,
        particles: &[Particle],
    ) -> Vec<Vector3<f64>> {
        particles
            .par_iter()
            .enumerate()
            .map(|(index, body)| self.acceleration_at(tree, particles, index as u32, &body.position))
            .collect()
    }

    fn acceleration_at(
        &self,
        tree: &Octree,
        particles: &[Particle],
        index: u32,
        position: &Point3<f64>,
    ) -> Vector3<f64> {
        if tree.root().is_empty() {
            return Vector3::zeros();
        }
        self.node_acceleration(tree, particles, tree.root(), index, position)
    }

    fn node_acceleration(
        &self,
        tree: &Octree,
        particles: &[Particle],
        id: NodeId,
        index: u32,
        position: &Point3<f64>,
    ) -> Vector3<f64> {
        let node = tree.node(id);
        let eps2 = self.softening * self.softening;

        if node.is_leaf() {
            // Self-interaction is excluded by particle index, never by
            // distance, so coincident distinct bodies still attract.
            return tree
                .entries_of(node)
                .iter()
                .filter(|entry| entry.particle != index)
                .map(|entry| {
                    let other = &particles[entry.particle as usize];
                    point_mass_acceleration(position, &other.position, other.mass, eps2)
                })
                .fold(Vector3::zeros(), |acc, a| acc + a);
        }

        // A zero-mass subtree exerts no force; its center is undefined.
        if node.total_mass <= 0.0 {
            return Vector3::zeros();
        }

        let extent = tree.node_extent(node);
        let distance = (node.center_of_mass - position).norm();
        if extent < self.theta * distance {
            return point_mass_acceleration(position, &node.center_of_mass, node.total_mass, eps2);
        }

        node.children
            .iter()
            .filter(|child| !child.is_empty())
            .map(|&child| self.node_acceleration(tree, particles, child, index, position))
            .fold(Vector3::zeros(), |acc, a| acc + a)
    }
}

impl Default for TreeGravity {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceModel for TreeGravity {
    fn accelerations(&self, particles: &[Particle]) -> Vec<Vector3<f64>> {
        if particles.is_empty() {
            return Vec::new();
        }
        let cube = SceneCube::from_particles(particles);
        let mut tree = Octree::build(particles, cube);
        tree.aggregate(particles);
        self.accelerations_from(&tree, particles)
    }

    fn potential_energy(&self, particles: &[Particle]) -> f64 {
        // Potential energy uses the direct pairwise sum: tree approximation
        // errors would show up as spurious energy drift.
        DirectGravity::with_softening(self.softening).potential_energy(particles)
    }
}

/// Acceleration toward a point mass with a softened denominator.
#[inline]
fn point_mass_acceleration(
    from: &Point3<f64>,
    toward: &Point3<f64>,
    mass: f64,
    eps2: f64,
) -> Vector3<f64> {
    let dr = toward - from;
    let r2 = dr.norm_squared() + eps2;
    let r = r2.sqrt();
    dr * (G * mass / (r2 * r))
}
