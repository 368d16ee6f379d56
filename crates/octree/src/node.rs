//! Arena node storage for the octree.

use std::ops::Range;

use nalgebra::{Point3, Vector4};

/// Index into the node arena.
///
/// Uses `u32` instead of `usize` to halve the size of each node's 8-slot
/// child array on 64-bit targets. The all-ones value is reserved as the
/// "absent child" sentinel, mirroring the key sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel representing an absent child or an empty tree.
    pub const EMPTY: NodeId = NodeId(u32::MAX);

    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "node id overflow");
        NodeId(index as u32)
    }

    /// The index into the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this is the absent-child sentinel.
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// One cell of the spatial hierarchy.
///
/// Nodes reference each other by arena index through the fixed-width
/// `children` array; absent octants hold [`NodeId::EMPTY`]. The fixed array
/// (rather than a dynamic collection) keeps traversal a uniform-stride walk
/// over contiguous memory.
///
/// A node with all-sentinel children is a leaf: its aggregates equal those of
/// the particle(s) in its entry range. A non-leaf node's aggregates combine
/// its existing children only. Aggregates are zero until
/// [`Octree::aggregate`](crate::Octree::aggregate) has run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeNode {
    /// Morton prefix identifying this cell: the key bits resolved at this
    /// node's layer, with the undecided low bits zeroed.
    pub morton_code: u64,
    /// Depth below the root (root = 0). A cell at layer L has edge
    /// `cube.edge / 2^L`.
    pub layer: u32,
    /// Child octants, indexed by the 3-bit Morton digit of the next layer.
    pub children: [NodeId; 8],
    /// Mass-weighted centroid of all particles below this node.
    pub center_of_mass: Point3<f64>,
    /// Total mass below this node.
    pub total_mass: f64,
    /// Summed RGBA emission of all emitting particles below this node.
    pub emitted_color: Vector4<f64>,
    /// Emission-intensity-weighted centroid of the emitters below this node.
    pub emitted_color_center: Point3<f64>,
    /// Start of this node's run in the sorted entry array.
    pub(crate) first_entry: u32,
    /// Length of this node's run in the sorted entry array.
    pub(crate) entry_count: u32,
}

impl OctreeNode {
    pub(crate) fn new(morton_code: u64, layer: u32, first_entry: usize, entry_count: usize) -> Self {
        Self {
            morton_code,
            layer,
            children: [NodeId::EMPTY; 8],
            center_of_mass: Point3::origin(),
            total_mass: 0.0,
            emitted_color: Vector4::zeros(),
            emitted_color_center: Point3::origin(),
            first_entry: first_entry as u32,
            entry_count: entry_count as u32,
        }
    }

    /// Whether this node has no children at all.
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_empty())
    }

    /// Number of particles covered by this node.
    pub fn particle_count(&self) -> usize {
        self.entry_count as usize
    }

    pub(crate) fn entry_range(&self) -> Range<usize> {
        let first = self.first_entry as usize;
        first..first + self.entry_count as usize
    }
}
