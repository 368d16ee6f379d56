use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3, Vector4};

use octree::{Octree, SceneCube};

use crate::lighting::{LightSelector, LightingInfluences, MAX_INFLUENCES};
use crate::particle::{Particle, ParticleKind};

fn star(position: Point3<f64>, color: Vector4<f64>) -> Particle {
    Particle::new(ParticleKind::Star, 1.0, 0.1, position, Vector3::zeros(), color)
}

fn planet(position: Point3<f64>) -> Particle {
    Particle::new(
        ParticleKind::Planet,
        1e-6,
        0.01,
        position,
        Vector3::zeros(),
        Vector4::new(0.4, 0.5, 0.6, 1.0),
    )
}

fn white() -> Vector4<f64> {
    Vector4::new(1.0, 1.0, 1.0, 1.0)
}

fn aggregated_tree(particles: &[Particle], edge: f64) -> Octree {
    let cube = SceneCube::centered(Point3::origin(), edge);
    let mut tree = Octree::build(particles, cube);
    tree.aggregate(particles);
    tree
}

#[test]
fn test_planet_sees_single_star() {
    let particles = vec![star(Point3::new(-3.0, 0.0, 0.0), white()), planet(Point3::new(3.0, 0.0, 0.0))];
    let tree = aggregated_tree(&particles, 32.0);

    let influences = LightSelector::new(50.0).influences_from(&tree, &particles);

    assert_eq!(influences[1].lit_count(), 1);
    let slot = &influences[1].slots[0];
    assert_eq!(slot.color, white());
    assert_relative_eq!(slot.position.x, -3.0);
}

#[test]
fn test_star_does_not_light_itself() {
    let particles = vec![star(Point3::new(1.0, 1.0, 1.0), white())];
    let tree = aggregated_tree(&particles, 32.0);

    let influences = LightSelector::new(50.0).influences_from(&tree, &particles);

    assert_eq!(influences[0].lit_count(), 0);
    assert_eq!(influences[0], LightingInfluences::default());
}

#[test]
fn test_never_more_than_eight_slots() {
    // A ring of 16 nearby stars around one planet: only the 8 strongest fit.
    let mut particles = vec![planet(Point3::origin())];
    for i in 0..16 {
        let angle = i as f64 * std::f64::consts::PI / 8.0;
        let distance = 2.0 + (i % 4) as f64;
        particles.push(star(
            Point3::new(distance * angle.cos(), distance * angle.sin(), 0.0),
            white(),
        ));
    }
    let tree = aggregated_tree(&particles, 64.0);

    // θ = 0 keeps every star an individual candidate.
    let selector = LightSelector::with_parameters(0.0, 100.0, 0.0);
    let influences = selector.influences_from(&tree, &particles);

    assert_eq!(influences[0].lit_count(), MAX_INFLUENCES);
}

#[test]
fn test_slots_are_ordered_by_contribution() {
    let particles = vec![
        planet(Point3::origin()),
        star(Point3::new(8.0, 0.0, 0.0), white()),
        star(Point3::new(2.0, 0.0, 0.0), white()),
        star(Point3::new(4.0, 0.0, 0.0), white()),
    ];
    let tree = aggregated_tree(&particles, 64.0);

    let selector = LightSelector::with_parameters(0.0, 100.0, 0.0);
    let influences = selector.influences_from(&tree, &particles);
    let packet = &influences[0];

    assert_eq!(packet.lit_count(), 3);
    // Equal colors, so closer means stronger: 2.0, then 4.0, then 8.0.
    assert_relative_eq!(packet.slots[0].position.x, 2.0);
    assert_relative_eq!(packet.slots[1].position.x, 4.0);
    assert_relative_eq!(packet.slots[2].position.x, 8.0);
}

#[test]
fn test_attenuation_distance_is_a_hard_cutoff() {
    let particles = vec![
        planet(Point3::origin()),
        star(Point3::new(5.0, 0.0, 0.0), white()),
        star(Point3::new(30.0, 0.0, 0.0), white()),
    ];
    let tree = aggregated_tree(&particles, 128.0);

    let selector = LightSelector::with_parameters(0.0, 10.0, 0.0);
    let influences = selector.influences_from(&tree, &particles);

    // Only the star inside the 10-unit cutoff contributes.
    assert_eq!(influences[0].lit_count(), 1);
    assert_relative_eq!(influences[0].slots[0].position.x, 5.0);

    for slot in influences[0].slots.iter().filter(|slot| slot.is_lit()) {
        assert!((slot.position - particles[0].position).norm() <= 10.0);
    }
}

#[test]
fn test_distant_cluster_collapses_to_one_source() {
    // A tight clump of stars far away: with a permissive opening angle the
    // whole clump arrives as a single aggregated source.
    let mut particles = vec![planet(Point3::new(-30.0, 0.0, 0.0))];
    for i in 0..8 {
        particles.push(star(
            Point3::new(30.0 + (i % 2) as f64 * 0.5, (i / 2) as f64 * 0.5, 0.0),
            Vector4::new(1.0, 0.8, 0.6, 1.0),
        ));
    }
    let tree = aggregated_tree(&particles, 128.0);

    let selector = LightSelector::with_parameters(0.8, 100.0, 0.0);
    let influences = selector.influences_from(&tree, &particles);
    let packet = &influences[0];

    assert_eq!(packet.lit_count(), 1);
    // The aggregated color sums the clump.
    assert_relative_eq!(packet.slots[0].color.x, 8.0);
    assert!((packet.slots[0].position.x - 30.25).abs() < 0.5);
}

#[test]
fn test_sample_point_query_has_no_exclusion() {
    let particles = vec![star(Point3::new(2.0, 0.0, 0.0), white())];
    let tree = aggregated_tree(&particles, 32.0);

    let selector = LightSelector::new(50.0);
    let influences = selector.influences_at(&tree, &particles, &Point3::origin());

    assert_eq!(influences.lit_count(), 1);
}

#[test]
fn test_empty_tree_yields_zero_packets() {
    let particles: Vec<Particle> = Vec::new();
    let tree = aggregated_tree(&particles, 32.0);

    let selector = LightSelector::new(50.0);
    assert!(selector.influences_from(&tree, &particles).is_empty());
    assert_eq!(
        selector.influences_at(&tree, &particles, &Point3::origin()),
        LightingInfluences::default()
    );
}
