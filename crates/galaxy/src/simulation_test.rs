use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3, Vector4};

use octree::{OctreeError, SceneCube};

use crate::error::SimulationError;
use crate::particle::{Particle, ParticleKind};
use crate::simulation::{Simulation, SimulationConfig};

fn star(position: Point3<f64>, velocity: Vector3<f64>) -> Particle {
    Particle::new(
        ParticleKind::Star,
        1.0,
        0.1,
        position,
        velocity,
        Vector4::new(1.0, 0.9, 0.8, 1.0),
    )
}

fn planet(position: Point3<f64>, velocity: Vector3<f64>) -> Particle {
    Particle::new(
        ParticleKind::Planet,
        1e-6,
        0.01,
        position,
        velocity,
        Vector4::new(0.4, 0.5, 0.6, 1.0),
    )
}

fn test_scene() -> SceneCube {
    SceneCube::centered(Point3::origin(), 64.0)
}

#[test]
fn test_step_advances_time_and_fills_lighting() {
    let particles = vec![
        star(Point3::new(-1.0, 0.0, 0.0), Vector3::zeros()),
        planet(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.7, 0.0)),
    ];
    let config = SimulationConfig::for_scene(test_scene(), particles.len());
    let mut simulation = Simulation::new(config, particles);

    assert!(simulation.lighting().is_empty());
    simulation.step(0.01).unwrap();

    assert_relative_eq!(simulation.state().time, 0.01);
    assert_eq!(simulation.lighting().len(), 2);
    // The planet is lit by the star; the star sees nothing.
    assert_eq!(simulation.lighting()[1].lit_count(), 1);
    assert_eq!(simulation.lighting()[0].lit_count(), 0);
}

#[test]
fn test_step_moves_the_planet_toward_the_star() {
    let particles = vec![
        star(Point3::origin(), Vector3::zeros()),
        planet(Point3::new(2.0, 0.0, 0.0), Vector3::zeros()),
    ];
    let config = SimulationConfig::for_scene(test_scene(), particles.len());
    let mut simulation = Simulation::new(config, particles);

    simulation.step(0.1).unwrap();

    assert!(simulation.state().particles[1].position.x < 2.0);
    assert!(simulation.state().particles[1].velocity.x < 0.0);
}

#[test]
fn test_empty_population_steps_without_error() {
    let config = SimulationConfig::for_scene(test_scene(), 0);
    let mut simulation = Simulation::new(config, Vec::new());

    simulation.step(0.5).unwrap();

    assert_relative_eq!(simulation.state().time, 0.5);
    assert!(simulation.lighting().is_empty());
}

#[test]
fn test_undersized_arena_fails_fast() {
    let particles = vec![
        star(Point3::new(-8.0, -8.0, -8.0), Vector3::zeros()),
        star(Point3::new(8.0, 8.0, 8.0), Vector3::zeros()),
        star(Point3::new(8.0, -8.0, 8.0), Vector3::zeros()),
    ];
    let mut config = SimulationConfig::for_scene(test_scene(), particles.len());
    config.node_capacity = 2;
    let mut simulation = Simulation::new(config, particles);

    match simulation.step(0.01) {
        Err(SimulationError::Octree(OctreeError::CapacityExceeded { capacity, .. })) => {
            assert_eq!(capacity, 2);
        }
        other => panic!("expected capacity error, got {other:?}"),
    }
    // The failed step mutated nothing.
    assert_relative_eq!(simulation.state().time, 0.0);
}

#[test]
fn test_momentum_is_conserved_with_exact_traversal() {
    // With θ = 0 the tree force is exact and pairwise-antisymmetric, so the
    // total momentum of an isolated system must not drift.
    let particles = vec![
        star(Point3::new(-1.5, 0.3, 0.0), Vector3::new(0.0, 0.4, 0.0)),
        star(Point3::new(1.5, -0.3, 0.0), Vector3::new(0.0, -0.4, 0.0)),
        star(Point3::new(0.0, 2.0, 0.5), Vector3::new(0.3, 0.0, 0.0)),
        star(Point3::new(0.0, -2.0, -0.5), Vector3::new(-0.3, 0.0, 0.0)),
    ];
    let mut config = SimulationConfig::for_scene(test_scene(), particles.len());
    config.opening_angle = 0.0;

    let before = particles
        .iter()
        .map(|p| p.momentum())
        .fold(Vector3::zeros(), |acc, p| acc + p);

    let mut simulation = Simulation::new(config, particles);
    for _ in 0..50 {
        simulation.step(0.01).unwrap();
    }

    let after = simulation.state().total_momentum();
    assert_relative_eq!((after - before).norm(), 0.0, epsilon = 1e-10);
}

#[test]
fn test_out_of_scene_bodies_are_clamped_not_lost() {
    // One body far outside the configured cube: the step succeeds and both
    // bodies still gravitate.
    let particles = vec![
        star(Point3::origin(), Vector3::zeros()),
        star(Point3::new(500.0, 0.0, 0.0), Vector3::zeros()),
    ];
    let config = SimulationConfig::for_scene(test_scene(), particles.len());
    let mut simulation = Simulation::new(config, particles);

    simulation.step(0.01).unwrap();

    assert!(simulation.state().particles[0].velocity.x > 0.0);
    assert!(!simulation.state().has_diverged());
}
