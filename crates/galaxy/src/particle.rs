use nalgebra::{Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Classification of a simulated body. Stars are the only emitters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum ParticleKind {
    Star = 0,
    Planet = 1,
    Dust = 2,
}

impl ParticleKind {
    /// Whether bodies of this kind contribute light.
    pub fn is_emissive(self) -> bool {
        matches!(self, ParticleKind::Star)
    }
}

/// A single simulated body.
///
/// Position and velocity are mutated every step; mass, radius, color and
/// kind are fixed after creation. A particle's identity is its index in the
/// population, which is fixed at initialization.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Particle {
    pub position: Point3<f64>,
    pub velocity: Vector3<f64>,
    pub mass: f64,
    /// Physical radius, consumed by the renderer for sprite sizing.
    pub radius: f64,
    /// RGBA base color; doubles as the emission color for stars.
    pub color: Vector4<f64>,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn new(
        kind: ParticleKind,
        mass: f64,
        radius: f64,
        position: Point3<f64>,
        velocity: Vector3<f64>,
        color: Vector4<f64>,
    ) -> Self {
        Self {
            position,
            velocity,
            mass,
            radius,
            color,
            kind,
        }
    }

    pub fn momentum(&self) -> Vector3<f64> {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    /// RGBA emission of this body; zero for non-emitting kinds.
    pub fn emission(&self) -> Vector4<f64> {
        if self.kind.is_emissive() {
            self.color
        } else {
            Vector4::zeros()
        }
    }
}

// Implement the octree participation traits so the shared spatial index can
// aggregate mass and emission straight from the population.
impl octree::Massive for Particle {
    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn mass(&self) -> f64 {
        self.mass
    }
}

impl octree::Emissive for Particle {
    fn emission(&self) -> Vector4<f64> {
        Particle::emission(self)
    }
}
