//! Bottom-up mass and emission aggregation.
//!
//! Aggregation runs as a layered pass: all nodes at depth k are finished
//! before any node at depth k−1 starts, because a parent's aggregates read
//! its fully-resolved children. Within one layer nodes are independent and
//! computed in parallel into a scratch buffer, then written back, so the
//! arena is never mutated while it is being read.
//!
//! Children are always combined in ascending child-slot order. Floating-point
//! accumulation is not associative, so a canonical order is what makes
//! repeated aggregation of the same tree bitwise-reproducible.

use nalgebra::{Point3, Vector3, Vector4};
use rayon::prelude::*;

use crate::builder::Octree;
use crate::node::OctreeNode;
use crate::{Emissive, Massive};

/// Emission intensity of an RGBA emission sample: the magnitude of the RGB
/// channels, clamped to a finite, non-negative weight.
///
/// The clamp keeps a corrupt color from poisoning the emission centroids of
/// every ancestor node; masses are deliberately not clamped the same way, so
/// a genuinely divergent simulation stays visible.
pub fn emission_intensity(color: &Vector4<f64>) -> f64 {
    let intensity = color.xyz().norm();
    if intensity.is_finite() {
        intensity
    } else {
        0.0
    }
}

/// Resolved aggregates for one node.
#[derive(Clone, Copy)]
struct Aggregate {
    total_mass: f64,
    center_of_mass: Point3<f64>,
    emitted_color: Vector4<f64>,
    emitted_color_center: Point3<f64>,
}

/// Running weighted sums; `finish` divides out the weights.
#[derive(Clone, Copy)]
struct Accumulator {
    mass: f64,
    mass_weighted: Vector3<f64>,
    color: Vector4<f64>,
    intensity: f64,
    emission_weighted: Vector3<f64>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            mass: 0.0,
            mass_weighted: Vector3::zeros(),
            color: Vector4::zeros(),
            intensity: 0.0,
            emission_weighted: Vector3::zeros(),
        }
    }

    fn add_particle(&mut self, mass: f64, position: &Point3<f64>, emission: &Vector4<f64>) {
        self.mass += mass;
        self.mass_weighted += position.coords * mass;
        let weight = emission_intensity(emission);
        if weight > 0.0 {
            self.color += emission;
            self.intensity += weight;
            self.emission_weighted += position.coords * weight;
        }
    }

    fn add_child(&mut self, child: &OctreeNode) {
        self.mass += child.total_mass;
        self.mass_weighted += child.center_of_mass.coords * child.total_mass;
        let weight = emission_intensity(&child.emitted_color);
        if weight > 0.0 {
            self.color += child.emitted_color;
            self.intensity += weight;
            self.emission_weighted += child.emitted_color_center.coords * weight;
        }
    }

    fn finish(&self) -> Aggregate {
        Aggregate {
            total_mass: self.mass,
            // Zero-mass nodes keep a zero center; the force traversal skips
            // them rather than dividing by zero.
            center_of_mass: if self.mass > 0.0 {
                Point3::from(self.mass_weighted / self.mass)
            } else {
                Point3::origin()
            },
            emitted_color: self.color,
            emitted_color_center: if self.intensity > 0.0 {
                Point3::from(self.emission_weighted / self.intensity)
            } else {
                Point3::origin()
            },
        }
    }
}

impl Octree {
    /// Fills every node's mass and emission aggregates from the particles the
    /// tree was built over.
    ///
    /// Leaves take their aggregates straight from their particle(s); internal
    /// nodes combine their existing children, mass-weighted for the center of
    /// mass and emission-weighted for the emission centroid. Layers complete
    /// strictly deepest-first.
    pub fn aggregate<P: Massive + Emissive + Sync>(&mut self, particles: &[P]) {
        if self.root.is_empty() {
            return;
        }

        let max_layer = self.nodes.iter().map(|n| n.layer).max().unwrap_or(0);
        let mut by_layer: Vec<Vec<u32>> = vec![Vec::new(); max_layer as usize + 1];
        for (index, node) in self.nodes.iter().enumerate() {
            by_layer[node.layer as usize].push(index as u32);
        }

        for layer_nodes in by_layer.iter().rev() {
            let snapshot: &Octree = self;
            let resolved: Vec<(u32, Aggregate)> = layer_nodes
                .par_iter()
                .map(|&index| {
                    let node = &snapshot.nodes[index as usize];
                    (index, snapshot.aggregate_node(node, particles))
                })
                .collect();
            for (index, aggregate) in resolved {
                let node = &mut self.nodes[index as usize];
                node.total_mass = aggregate.total_mass;
                node.center_of_mass = aggregate.center_of_mass;
                node.emitted_color = aggregate.emitted_color;
                node.emitted_color_center = aggregate.emitted_color_center;
            }
        }
    }

    fn aggregate_node<P: Massive + Emissive>(
        &self,
        node: &OctreeNode,
        particles: &[P],
    ) -> Aggregate {
        let mut accumulator = Accumulator::new();
        if node.is_leaf() {
            for entry in self.entries_of(node) {
                let particle = &particles[entry.particle as usize];
                accumulator.add_particle(
                    particle.mass(),
                    &particle.position(),
                    &particle.emission(),
                );
            }
        } else {
            // Ascending slot order: the canonical combination order that
            // keeps aggregation reproducible.
            for child in node.children.iter().filter(|c| !c.is_empty()) {
                accumulator.add_child(&self.nodes[child.index()]);
            }
        }
        accumulator.finish()
    }
}
