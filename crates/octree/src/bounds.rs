//! The axis-aligned scene cube the Morton encoder quantizes against.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::Massive;

/// Fraction added to each side when fitting a cube around a particle set, so
/// bodies sitting exactly on the boundary do not quantize into the last cell.
const FIT_PADDING: f64 = 0.01;

/// An axis-aligned cube in world space.
///
/// The cube is the root cell of the octree: a node at `layer` L covers a
/// sub-cube with edge `edge / 2^L`, so a node's spatial extent is derivable
/// from its layer alone. Using a cube (rather than the tight bounding box)
/// keeps cells cubical at every depth, which the opening-angle criterion
/// relies on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneCube {
    min: Point3<f64>,
    edge: f64,
}

impl SceneCube {
    /// Creates a cube from its minimum corner and edge length.
    pub fn new(min: Point3<f64>, edge: f64) -> Self {
        debug_assert!(edge > 0.0, "scene cube edge must be positive");
        Self { min, edge }
    }

    /// Creates a cube centered on `center`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::Point3;
    /// use octree::bounds::SceneCube;
    ///
    /// let cube = SceneCube::centered(Point3::origin(), 10.0);
    /// assert_eq!(cube.min(), Point3::new(-5.0, -5.0, -5.0));
    /// assert_eq!(cube.edge(), 10.0);
    /// ```
    pub fn centered(center: Point3<f64>, edge: f64) -> Self {
        Self::new(center - Vector3::repeat(edge / 2.0), edge)
    }

    /// Fits a slightly padded cube around all the given bodies.
    ///
    /// The cube is centered on the tight bounding box and its edge is the
    /// box's largest extent. An empty slice yields a unit cube at the origin
    /// so downstream passes stay well-defined.
    pub fn from_particles<P: Massive>(particles: &[P]) -> Self {
        let (min, max) = particles.iter().fold(
            (
                Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
                Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(lo, hi), body| {
                let p = body.position();
                (
                    Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                    Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
                )
            },
        );
        if !min.x.is_finite() {
            return Self::centered(Point3::origin(), 1.0);
        }
        let extent = max - min;
        let edge = extent.x.max(extent.y).max(extent.z);
        // A single body (or coincident set) has zero extent; give it a unit
        // cell so quantization stays well-defined.
        let edge = if edge > 0.0 { edge } else { 1.0 };
        let center = Point3::from((min.coords + max.coords) / 2.0);
        Self::centered(center, edge * (1.0 + FIT_PADDING))
    }

    /// Minimum corner of the cube.
    pub fn min(&self) -> Point3<f64> {
        self.min
    }

    /// Maximum corner of the cube.
    pub fn max(&self) -> Point3<f64> {
        self.min + Vector3::repeat(self.edge)
    }

    /// Center of the cube.
    pub fn center(&self) -> Point3<f64> {
        self.min + Vector3::repeat(self.edge / 2.0)
    }

    /// Edge length of the cube.
    pub fn edge(&self) -> f64 {
        self.edge
    }

    /// Edge length of a cell at the given octree layer (root = 0).
    pub fn extent_at_layer(&self, layer: u32) -> f64 {
        self.edge / (1u64 << layer) as f64
    }

    /// Whether the point lies inside the cube (inclusive).
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let max = self.max();
        (self.min.x..=max.x).contains(&point.x)
            && (self.min.y..=max.y).contains(&point.y)
            && (self.min.z..=max.z).contains(&point.z)
    }

    /// Maps a point into normalized [0, 1]³ cube coordinates, clamping
    /// out-of-bounds coordinates first. The flag reports whether any
    /// component was clamped.
    pub fn normalize_clamped(&self, point: &Point3<f64>) -> (Point3<f64>, bool) {
        let rel = (point - self.min) / self.edge;
        let inside = Point3::new(
            rel.x.clamp(0.0, 1.0),
            rel.y.clamp(0.0, 1.0),
            rel.z.clamp(0.0, 1.0),
        );
        let was_clamped = inside.coords != rel;
        (inside, was_clamped)
    }
}
