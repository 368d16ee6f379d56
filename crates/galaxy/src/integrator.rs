//! Time integration for the particle population.
//!
//! All provided integrators are explicit and share the step contract: within
//! one step, velocities are updated from accelerations before positions are
//! updated from velocities, using the same Δt.

use nalgebra::Vector3;

use crate::forces::ForceModel;
use crate::particle::Particle;

/// A time integrator for the particle population.
pub trait Integrator: Send + Sync {
    /// Advance the population by one timestep.
    fn step(&self, particles: &mut [Particle], dt: f64, force: &dyn ForceModel);

    /// Advance the population by multiple timesteps.
    fn integrate(
        &self,
        particles: &mut [Particle],
        dt: f64,
        n_steps: usize,
        force: &dyn ForceModel,
    ) {
        for _ in 0..n_steps {
            self.step(particles, dt, force);
        }
    }
}

/// Semi-implicit (symplectic) Euler: kick, then drift, with the same Δt.
///
/// One force evaluation per step makes this the step driver's default: the
/// tree is built once, read once. First order, but symplectic, so energy
/// errors stay bounded instead of accumulating secularly.
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn step(&self, particles: &mut [Particle], dt: f64, force: &dyn ForceModel) {
        let accelerations = force.accelerations(particles);
        kick(particles, &accelerations, dt);
        drift(particles, dt);
    }
}

/// Symplectic leapfrog integrator (2nd order, kick-drift-kick form).
///
/// The standard choice when accuracy matters more than the cost of two force
/// evaluations per step:
///
/// 1. Kick: v(t + dt/2) = v(t) + a(t) · dt/2
/// 2. Drift: x(t + dt) = x(t) + v(t + dt/2) · dt
/// 3. Kick: v(t + dt) = v(t + dt/2) + a(t + dt) · dt/2
pub struct Leapfrog;

impl Integrator for Leapfrog {
    fn step(&self, particles: &mut [Particle], dt: f64, force: &dyn ForceModel) {
        let accelerations = force.accelerations(particles);
        kick(particles, &accelerations, dt / 2.0);
        drift(particles, dt);
        let accelerations = force.accelerations(particles);
        kick(particles, &accelerations, dt / 2.0);
    }
}

/// Velocity update: v += a · dt for every particle.
pub fn kick(particles: &mut [Particle], accelerations: &[Vector3<f64>], dt: f64) {
    particles
        .iter_mut()
        .zip(accelerations.iter())
        .for_each(|(particle, acceleration)| {
            particle.velocity += acceleration * dt;
        });
}

/// Position update: x += v · dt for every particle.
pub fn drift(particles: &mut [Particle], dt: f64) {
    particles.iter_mut().for_each(|particle| {
        particle.position += particle.velocity * dt;
    });
}
