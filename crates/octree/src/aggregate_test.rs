use approx::assert_relative_eq;
use nalgebra::{Point3, Vector4};

use crate::aggregate::emission_intensity;
use crate::bounds::SceneCube;
use crate::builder::Octree;
use crate::{Emissive, Massive};

#[derive(Clone, Copy)]
struct TestBody {
    position: Point3<f64>,
    mass: f64,
    emission: Vector4<f64>,
}

impl TestBody {
    fn dark(x: f64, y: f64, z: f64, mass: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            mass,
            emission: Vector4::zeros(),
        }
    }

    fn glowing(x: f64, y: f64, z: f64, mass: f64, emission: Vector4<f64>) -> Self {
        Self {
            position: Point3::new(x, y, z),
            mass,
            emission,
        }
    }
}

impl Massive for TestBody {
    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn mass(&self) -> f64 {
        self.mass
    }
}

impl Emissive for TestBody {
    fn emission(&self) -> Vector4<f64> {
        self.emission
    }
}

fn test_cube() -> SceneCube {
    SceneCube::centered(Point3::origin(), 16.0)
}

fn build_aggregated(bodies: &[TestBody]) -> Octree {
    let mut tree = Octree::build(bodies, test_cube());
    tree.aggregate(bodies);
    tree
}

#[test]
fn test_root_mass_equals_population_mass() {
    let bodies: Vec<TestBody> = (0..100)
        .map(|i| {
            TestBody::dark(
                ((i * 13) % 16) as f64 - 8.0,
                ((i * 29) % 16) as f64 - 8.0,
                ((i * 43) % 16) as f64 - 8.0,
                0.5 + (i % 10) as f64,
            )
        })
        .collect();
    let tree = build_aggregated(&bodies);

    let expected: f64 = bodies.iter().map(|b| b.mass).sum();
    let root = tree.node(tree.root());
    assert_relative_eq!(root.total_mass, expected, epsilon = 1e-9 * expected);
}

#[test]
fn test_single_body_at_origin_is_exact() {
    let bodies = vec![TestBody::dark(0.0, 0.0, 0.0, 3.5)];
    let tree = build_aggregated(&bodies);

    let root = tree.node(tree.root());
    assert_eq!(root.total_mass, 3.5);
    assert_eq!(root.center_of_mass, Point3::origin());
}

#[test]
fn test_symmetric_pair_centers_on_origin() {
    let bodies = vec![
        TestBody::dark(-3.0, 2.0, -1.0, 7.0),
        TestBody::dark(3.0, -2.0, 1.0, 7.0),
    ];
    let tree = build_aggregated(&bodies);

    let root = tree.node(tree.root());
    assert_relative_eq!(root.total_mass, 14.0);
    assert_relative_eq!(root.center_of_mass.coords.norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_leaf_aggregates_equal_their_particle() {
    let emission = Vector4::new(1.0, 0.8, 0.6, 1.0);
    let bodies = vec![
        TestBody::glowing(-4.0, -4.0, -4.0, 2.0, emission),
        TestBody::dark(4.0, 4.0, 4.0, 1.0),
    ];
    let tree = build_aggregated(&bodies);

    let root = tree.node(tree.root());
    for child in root.children.iter().filter(|c| !c.is_empty()) {
        let child = tree.node(*child);
        let body = &bodies[tree.entries_of(child)[0].particle as usize];
        assert_eq!(child.total_mass, body.mass);
        assert_eq!(child.center_of_mass, body.position);
        assert_eq!(child.emitted_color, body.emission);
    }
}

#[test]
fn test_emission_weighted_centroid() {
    // Two equal emitters: the emission centroid sits midway between them,
    // and the aggregated color is their sum.
    let emission = Vector4::new(0.0, 0.0, 2.0, 1.0);
    let bodies = vec![
        TestBody::glowing(-4.0, 0.0, 0.0, 1.0, emission),
        TestBody::glowing(4.0, 2.0, 0.0, 1.0, emission),
        TestBody::dark(0.0, -6.0, 0.0, 50.0),
    ];
    let tree = build_aggregated(&bodies);

    let root = tree.node(tree.root());
    assert_relative_eq!(root.emitted_color.z, 4.0);
    assert_relative_eq!(root.emitted_color_center.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(root.emitted_color_center.y, 1.0, epsilon = 1e-12);

    // The heavy dark body moves the center of mass but not the emission
    // centroid.
    assert!(root.center_of_mass.y < -5.0);
}

#[test]
fn test_dark_population_has_zero_emission() {
    let bodies = vec![
        TestBody::dark(-2.0, 0.0, 0.0, 1.0),
        TestBody::dark(2.0, 0.0, 0.0, 1.0),
    ];
    let tree = build_aggregated(&bodies);

    let root = tree.node(tree.root());
    assert_eq!(root.emitted_color, Vector4::zeros());
    assert_eq!(root.emitted_color_center, Point3::origin());
}

#[test]
fn test_zero_mass_population_keeps_zero_center() {
    let bodies = vec![
        TestBody::dark(-2.0, 3.0, 0.0, 0.0),
        TestBody::dark(2.0, -1.0, 0.0, 0.0),
    ];
    let tree = build_aggregated(&bodies);

    let root = tree.node(tree.root());
    assert_eq!(root.total_mass, 0.0);
    assert_eq!(root.center_of_mass, Point3::origin());
}

#[test]
fn test_emission_intensity_clamps_non_finite() {
    assert_relative_eq!(
        emission_intensity(&Vector4::new(3.0, 0.0, 4.0, 1.0)),
        5.0
    );
    assert_eq!(emission_intensity(&Vector4::new(f64::NAN, 1.0, 0.0, 1.0)), 0.0);
    assert_eq!(
        emission_intensity(&Vector4::new(f64::INFINITY, 0.0, 0.0, 1.0)),
        0.0
    );
    // Alpha does not contribute to intensity.
    assert_eq!(emission_intensity(&Vector4::new(0.0, 0.0, 0.0, 1.0)), 0.0);
}
