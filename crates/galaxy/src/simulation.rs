//! The per-step pipeline driver.
//!
//! One step is a strict phase sequence over a shared tree snapshot:
//!
//! 1. **Build**: encode positions, sort, assemble a fresh node arena.
//! 2. **Aggregate**: bottom-up mass/emission summaries, one layer at a
//!    time.
//! 3. **Evaluate + illuminate**: Barnes-Hut gravity and lighting influence
//!    selection run concurrently; both are pure readers of the finished
//!    tree and write disjoint outputs.
//! 4. **Integrate**: kick (velocities), then drift (positions), with the
//!    same Δt.
//!
//! The tree from step n is never reused for step n+1: continuous motion
//! invalidates locality, so the arena is rebuilt every step.

use octree::{Octree, SceneCube};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::forces::TreeGravity;
use crate::frame::FrameState;
use crate::integrator;
use crate::lighting::{LightSelector, LightingInfluences};
use crate::particle::Particle;
use crate::state::GalaxyState;

/// Tuning constants for one simulation, passed in explicitly rather than
/// read from process-wide state so parallel runs can vary them freely.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Barnes-Hut opening angle θ, shared by the force and lighting
    /// traversals.
    pub opening_angle: f64,
    /// Softening length for close encounters.
    pub softening: f64,
    /// Hard cutoff beyond which emitters contribute no light.
    pub attenuation_distance: f64,
    /// The fixed scene cube positions are quantized against. Bodies that
    /// wander outside are clamped (and counted), not lost.
    pub scene: SceneCube,
    /// Node arena capacity. A step fails fast with a capacity error when
    /// the tree would outgrow this; that is an arena-sizing
    /// misconfiguration, not a data condition.
    pub node_capacity: usize,
}

impl SimulationConfig {
    /// Reasonable defaults for a population of `particles` bodies inside
    /// `scene`: θ = 0.5, softening 10⁻⁴ of the scene edge, attenuation at
    /// 50 length units, arena sized at the structural upper bound.
    pub fn for_scene(scene: SceneCube, particles: usize) -> Self {
        Self {
            opening_angle: 0.5,
            softening: scene.edge() * 1e-4,
            attenuation_distance: 50.0,
            scene,
            node_capacity: Octree::capacity_for(particles),
        }
    }
}

/// Owns the population and drives the per-step pipeline.
///
/// # Examples
///
/// ```
/// use nalgebra::{Point3, Vector3, Vector4};
/// use octree::SceneCube;
/// use galaxy::particle::{Particle, ParticleKind};
/// use galaxy::simulation::{Simulation, SimulationConfig};
///
/// let particles = vec![
///     Particle::new(
///         ParticleKind::Star,
///         1.0,
///         0.1,
///         Point3::new(-1.0, 0.0, 0.0),
///         Vector3::zeros(),
///         Vector4::new(1.0, 0.9, 0.8, 1.0),
///     ),
///     Particle::new(
///         ParticleKind::Planet,
///         1e-6,
///         0.01,
///         Point3::new(1.0, 0.0, 0.0),
///         Vector3::new(0.0, 0.7, 0.0),
///         Vector4::new(0.4, 0.5, 0.6, 1.0),
///     ),
/// ];
///
/// let scene = SceneCube::centered(Point3::origin(), 64.0);
/// let config = SimulationConfig::for_scene(scene, particles.len());
/// let mut simulation = Simulation::new(config, particles);
///
/// simulation.step(0.01)?;
///
/// assert!(simulation.state().time > 0.0);
/// assert_eq!(simulation.lighting().len(), 2);
/// # Ok::<(), galaxy::error::SimulationError>(())
/// ```
pub struct Simulation {
    config: SimulationConfig,
    state: GalaxyState,
    lighting: Vec<LightingInfluences>,
    frame: FrameState,
}

impl Simulation {
    pub fn new(config: SimulationConfig, particles: Vec<Particle>) -> Self {
        Self {
            config,
            state: GalaxyState::from_particles(particles),
            lighting: Vec::new(),
            frame: FrameState::default(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &GalaxyState {
        &self.state
    }

    /// Per-particle lighting packets from the most recent step, indices
    /// aligned with the population. Empty before the first step.
    pub fn lighting(&self) -> &[LightingInfluences] {
        &self.lighting
    }

    /// Latest camera state supplied by the renderer. The dynamics ignores
    /// it; it is retained for view-dependent decisions and read-back.
    pub fn set_frame(&mut self, frame: FrameState) {
        self.frame = frame;
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    /// Advances the simulation by `dt`.
    ///
    /// Zero particles is a no-op (time still advances); the only error is
    /// the configured node arena overflowing, which indicates a sizing
    /// misconfiguration and aborts the step before any state was mutated.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        if self.state.is_empty() {
            self.lighting.clear();
            self.state.time += dt;
            return Ok(());
        }

        let mut tree = Octree::build_bounded(
            &self.state.particles,
            self.config.scene,
            self.config.node_capacity,
        )?;
        tree.aggregate(&self.state.particles);

        let gravity = TreeGravity::with_softening(self.config.opening_angle, self.config.softening);
        let selector = LightSelector::with_parameters(
            self.config.opening_angle,
            self.config.attenuation_distance,
            self.config.softening,
        );

        let particles = &self.state.particles;
        let (accelerations, lighting) = rayon::join(
            || gravity.accelerations_from(&tree, particles),
            || selector.influences_from(&tree, particles),
        );
        self.lighting = lighting;

        integrator::kick(&mut self.state.particles, &accelerations, dt);
        integrator::drift(&mut self.state.particles, dt);
        self.state.time += dt;

        if self.state.has_diverged() {
            warn!(time = self.state.time, "non-finite particle state; simulation has diverged");
        }
        debug!(
            time = self.state.time,
            nodes = tree.node_count(),
            clamped = tree.clamped_positions(),
            "step complete"
        );
        Ok(())
    }
}
