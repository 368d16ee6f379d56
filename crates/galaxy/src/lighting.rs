//! Lighting influence selection over the shared octree snapshot.
//!
//! For each query point the selector walks the same aggregated tree the
//! force evaluator reads, ranking emitters by expected illumination
//! contribution (emission intensity attenuated by squared distance). The
//! opening-angle rule collapses distant emissive clusters into single point
//! sources, exactly as Barnes-Hut collapses them into point masses. The
//! result is a fixed 8-slot packet of (color, position) pairs per query
//! point, ready for shading.
//!
//! The pass is read-only with respect to the tree and runs concurrently with
//! force evaluation over the same immutable snapshot.

use nalgebra::{Point3, Vector4};
use rayon::prelude::*;

use octree::aggregate::emission_intensity;
use octree::{NodeId, Octree};

use crate::particle::Particle;

/// Number of light slots packaged per query point.
pub const MAX_INFLUENCES: usize = 8;

/// Diagonal-to-edge ratio of a cube (√3), used when pruning by distance: no
/// emitter inside a cell can be farther from the cell's emission centroid
/// than the full cell diagonal, edge · √3.
const CELL_DIAGONAL: f64 = 1.732_050_807_568_877_2;

/// One selected emitter: RGBA color and world position.
///
/// Unused slots carry a zero color, which shaders treat as "no light".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSlot {
    pub color: Vector4<f64>,
    pub position: Point3<f64>,
}

impl LightSlot {
    fn zero() -> Self {
        Self {
            color: Vector4::zeros(),
            position: Point3::origin(),
        }
    }

    /// Whether this slot carries an actual emitter.
    pub fn is_lit(&self) -> bool {
        self.color != Vector4::zeros()
    }
}

impl Default for LightSlot {
    fn default() -> Self {
        Self::zero()
    }
}

/// The up-to-8 dominant emitters for one query point, strongest first.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightingInfluences {
    pub slots: [LightSlot; MAX_INFLUENCES],
}

impl LightingInfluences {
    /// Number of occupied slots.
    pub fn lit_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_lit()).count()
    }
}

/// One ranked candidate during selection.
#[derive(Clone, Copy)]
struct Candidate {
    contribution: f64,
    distance: f64,
    slot: LightSlot,
}

/// Bounded top-8 structure: descending contribution, ties broken by smaller
/// distance. Insertion shifts weaker candidates down and drops the weakest
/// once full.
struct TopInfluences {
    len: usize,
    candidates: [Candidate; MAX_INFLUENCES],
}

impl TopInfluences {
    fn new() -> Self {
        Self {
            len: 0,
            candidates: [Candidate {
                contribution: 0.0,
                distance: 0.0,
                slot: LightSlot::zero(),
            }; MAX_INFLUENCES],
        }
    }

    fn offer(&mut self, candidate: Candidate) {
        let mut position = self.len.min(MAX_INFLUENCES);
        while position > 0 && ranks_before(&candidate, &self.candidates[position - 1]) {
            position -= 1;
        }
        if position >= MAX_INFLUENCES {
            return;
        }
        let last = if self.len == MAX_INFLUENCES {
            MAX_INFLUENCES - 1
        } else {
            self.len
        };
        for slot in (position..last).rev() {
            self.candidates[slot + 1] = self.candidates[slot];
        }
        self.candidates[position] = candidate;
        if self.len < MAX_INFLUENCES {
            self.len += 1;
        }
    }

    fn finish(self) -> LightingInfluences {
        let mut influences = LightingInfluences::default();
        for (slot, candidate) in influences.slots.iter_mut().zip(self.candidates.iter()).take(self.len) {
            *slot = candidate.slot;
        }
        influences
    }
}

fn ranks_before(a: &Candidate, b: &Candidate) -> bool {
    a.contribution > b.contribution
        || (a.contribution == b.contribution && a.distance < b.distance)
}

/// Selects the dominant emitters for each query point.
///
/// # Examples
///
/// ```
/// use nalgebra::{Point3, Vector3, Vector4};
/// use octree::{Octree, SceneCube};
/// use galaxy::lighting::LightSelector;
/// use galaxy::particle::{Particle, ParticleKind};
///
/// let particles = vec![
///     Particle::new(
///         ParticleKind::Star,
///         1.0,
///         0.1,
///         Point3::new(-2.0, 0.0, 0.0),
///         Vector3::zeros(),
///         Vector4::new(1.0, 0.9, 0.8, 1.0),
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
/// let cube = SceneCube::centered(Point3::origin(), 16.0);
/// let mut tree = Octree::build(&particles, cube);
/// tree.aggregate(&particles);
///
/// let selector = LightSelector::new(50.0);
/// let influences = selector.influences_from(&tree, &particles);
///
/// // The planet sees the star; the star does not light itself.
/// assert_eq!(influences[1].lit_count(), 1);
/// assert_eq!(influences[0].lit_count(), 0);
/// ```
pub struct LightSelector {
    /// Opening angle θ shared with the force traversal: clusters whose
    /// extent-to-distance ratio falls below it become single point sources.
    pub theta: f64,
    /// Hard cutoff: emitters farther than this are excluded outright, not
    /// merely down-weighted.
    pub attenuation_distance: f64,
    /// Softening length applied to the contribution denominator.
    pub softening: f64,
}

impl LightSelector {
    /// Creates a selector with θ = 0.5 and no softening.
    pub fn new(attenuation_distance: f64) -> Self {
        Self {
            theta: 0.5,
            attenuation_distance,
            softening: 0.0,
        }
    }

    /// Creates a selector with explicit θ and softening.
    pub fn with_parameters(theta: f64, attenuation_distance: f64, softening: f64) -> Self {
        Self {
            theta,
            attenuation_distance,
            softening,
        }
    }

    /// Influence packets for every particle, indices aligned with the input.
    ///
    /// A particle never illuminates itself: excluded by index, symmetric
    /// with the force pass, since its own emission at distance zero would
    /// otherwise dominate every slot.
    pub fn influences_from(
        &self,
        tree: &Octree,
        particles: &[Particle],
    ) -> Vec<LightingInfluences> {
        particles
            .par_iter()
            .enumerate()
            .map(|(index, body)| {
                self.select(tree, particles, Some(index as u32), &body.position)
            })
            .collect()
    }

    /// Influences for an arbitrary sample location (no self-exclusion).
    pub fn influences_at(
        &self,
        tree: &Octree,
        particles: &[Particle],
        point: &Point3<f64>,
    ) -> LightingInfluences {
        self.select(tree, particles, None, point)
    }

    fn select(
        &self,
        tree: &Octree,
        particles: &[Particle],
        exclude: Option<u32>,
        point: &Point3<f64>,
    ) -> LightingInfluences {
        let mut top = TopInfluences::new();
        if !tree.root().is_empty() {
            self.visit(tree, particles, tree.root(), exclude, point, &mut top);
        }
        top.finish()
    }

    fn visit(
        &self,
        tree: &Octree,
        particles: &[Particle],
        id: NodeId,
        exclude: Option<u32>,
        point: &Point3<f64>,
        top: &mut TopInfluences,
    ) {
        let node = tree.node(id);
        let intensity = emission_intensity(&node.emitted_color);
        if intensity <= 0.0 {
            // No emitters anywhere below this node.
            return;
        }

        let eps2 = self.softening * self.softening;
        let extent = tree.node_extent(node);
        let centroid_distance = (node.emitted_color_center - point).norm();

        // Every emitter below this node lies inside its cell, so none can be
        // closer than the centroid distance minus the cell diagonal. Beyond
        // the cutoff the whole subtree is excluded.
        if centroid_distance - extent * CELL_DIAGONAL > self.attenuation_distance {
            return;
        }

        if node.is_leaf() {
            for entry in tree.entries_of(node) {
                if Some(entry.particle) == exclude {
                    continue;
                }
                let body = &particles[entry.particle as usize];
                let emission = body.emission();
                let weight = emission_intensity(&emission);
                if weight <= 0.0 {
                    continue;
                }
                let distance = (body.position - point).norm();
                if distance > self.attenuation_distance {
                    continue;
                }
                top.offer(Candidate {
                    contribution: weight / (distance * distance + eps2),
                    distance,
                    slot: LightSlot {
                        color: emission,
                        position: body.position,
                    },
                });
            }
            return;
        }

        if extent < self.theta * centroid_distance {
            // Distant emissive cluster: one point source at the emission
            // centroid, subject to the same hard cutoff.
            if centroid_distance > self.attenuation_distance {
                return;
            }
            top.offer(Candidate {
                contribution: intensity / (centroid_distance * centroid_distance + eps2),
                distance: centroid_distance,
                slot: LightSlot {
                    color: node.emitted_color,
                    position: node.emitted_color_center,
                },
            });
            return;
        }

        for child in node.children.iter().filter(|child| !child.is_empty()) {
            self.visit(tree, particles, *child, exclude, point, top);
        }
    }
}
