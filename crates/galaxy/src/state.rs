use nalgebra::Vector3;

use crate::particle::Particle;

/// Complete state of the simulated population at a given time.
///
/// The population is assembled once (via [`GalaxyState::push`] or
/// [`GalaxyState::from_particles`]) and its size stays fixed through the
/// stepped phase; particles are addressed by index.
#[derive(Debug, Clone, Default)]
pub struct GalaxyState {
    /// Current simulation time.
    pub time: f64,
    /// The particle population.
    pub particles: Vec<Particle>,
}

impl GalaxyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self {
            time: 0.0,
            particles,
        }
    }

    /// Appends a particle during population setup and returns its index.
    pub fn push(&mut self, particle: Particle) -> usize {
        self.particles.push(particle);
        self.particles.len() - 1
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Total mass of the population.
    pub fn total_mass(&self) -> f64 {
        self.particles.iter().map(|p| p.mass).sum()
    }

    /// Total momentum of the population.
    ///
    /// Approximately conserved for an isolated system; useful for checking
    /// numerical drift across steps.
    pub fn total_momentum(&self) -> Vector3<f64> {
        self.particles
            .iter()
            .map(|p| p.momentum())
            .fold(Vector3::zeros(), |acc, p| acc + p)
    }

    /// Total kinetic energy of the population.
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Whether any position or velocity component has gone non-finite.
    ///
    /// NaN/Inf is never silently zeroed by the solver; this probe lets
    /// callers detect a diverged simulation explicitly.
    pub fn has_diverged(&self) -> bool {
        self.particles.iter().any(|p| {
            !(p.position.coords.iter().all(|c| c.is_finite())
                && p.velocity.iter().all(|c| c.is_finite()))
        })
    }
}
