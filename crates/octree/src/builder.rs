//! Construction of the Morton-keyed octree.
//!
//! Particles are encoded into Morton keys, sorted (stably with respect to
//! particle index via the composite sort key), and partitioned recursively:
//! each sorted range splits on the 3-bit digit of the next layer into up to 8
//! child ranges, one node per non-empty group, down to single-entry ranges or
//! the maximum quantization depth. All nodes land in one contiguous arena;
//! each `build` produces a fresh arena, so readers of the previous tree are
//! never invalidated mid-step.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::bounds::SceneCube;
use crate::error::{OctreeError, Result};
use crate::morton::{self, MortonEntry, INVALID_MORTON_CODE, MAX_LAYER};
use crate::node::{NodeId, OctreeNode};
use crate::Massive;

/// A layered octree over a fixed particle population, stored in a contiguous
/// node arena.
///
/// Children are pushed before their parent, so every node's arena index is
/// greater than the indices of its whole subtree and the root is the last
/// node. The tree borrows nothing: it holds the sorted `(key, particle)`
/// entries and refers to particles by index, so the original slice can be
/// read concurrently by any number of traversals.
///
/// # Examples
///
/// ```
/// use nalgebra::{Point3, Vector4};
/// use octree::{Massive, Emissive, Octree, SceneCube};
///
/// #[derive(Clone, Copy)]
/// struct Body {
///     position: Point3<f64>,
///     mass: f64,
/// }
///
/// impl Massive for Body {
///     fn position(&self) -> Point3<f64> {
///         self.position
///     }
///
///     fn mass(&self) -> f64 {
///         self.mass
///     }
/// }
///
/// impl Emissive for Body {
///     fn emission(&self) -> Vector4<f64> {
///         Vector4::zeros()
///     }
/// }
///
/// let bodies = vec![
///     Body { position: Point3::new(-1.0, 0.0, 0.0), mass: 2.0 },
///     Body { position: Point3::new(1.0, 0.0, 0.0), mass: 2.0 },
/// ];
///
/// let cube = SceneCube::centered(Point3::origin(), 8.0);
/// let mut tree = Octree::build(&bodies, cube);
/// tree.aggregate(&bodies);
///
/// let root = tree.node(tree.root());
/// assert_eq!(root.total_mass, 4.0);
/// ```
pub struct Octree {
    pub(crate) nodes: Vec<OctreeNode>,
    pub(crate) entries: Vec<MortonEntry>,
    pub(crate) root: NodeId,
    pub(crate) cube: SceneCube,
    pub(crate) clamped: usize,
}

impl Octree {
    /// Builds a tree sized by [`Octree::capacity_for`], which is a structural
    /// upper bound on the node count and therefore cannot be exceeded.
    pub fn build<P: Massive>(particles: &[P], cube: SceneCube) -> Self {
        match Self::build_bounded(particles, cube, Self::capacity_for(particles.len())) {
            Ok(tree) => tree,
            Err(_) => unreachable!("node arena sized below the structural upper bound"),
        }
    }

    /// Builds a tree within a caller-configured arena capacity.
    ///
    /// Zero particles yield an empty tree (root = [`NodeId::EMPTY`]); all
    /// downstream passes over it are no-ops, not errors. Exceeding `capacity`
    /// fails fast with [`OctreeError::CapacityExceeded`].
    pub fn build_bounded<P: Massive>(
        particles: &[P],
        cube: SceneCube,
        capacity: usize,
    ) -> Result<Self> {
        let mut clamped = 0usize;
        let mut entries: Vec<MortonEntry> = particles
            .iter()
            .enumerate()
            .map(|(index, body)| {
                let (code, was_clamped) = morton::encode_clamped(&body.position(), &cube);
                if was_clamped {
                    clamped += 1;
                }
                MortonEntry {
                    code,
                    particle: index as u32,
                }
            })
            .collect();
        entries.par_sort_unstable_by_key(MortonEntry::sort_key);

        let mut tree = Octree {
            nodes: Vec::with_capacity(capacity.min(Self::capacity_for(particles.len()))),
            entries,
            root: NodeId::EMPTY,
            cube,
            clamped,
        };
        if !tree.entries.is_empty() {
            tree.root = tree.build_range(0, tree.entries.len(), 0, capacity)?;
        }

        if clamped > 0 {
            warn!(clamped, "positions outside the scene cube were clamped before encoding");
        }
        debug!(
            nodes = tree.nodes.len(),
            entries = tree.entries.len(),
            "octree build complete"
        );
        Ok(tree)
    }

    /// Builds the subtree covering the sorted entry range `lo..hi`.
    fn build_range(&mut self, lo: usize, hi: usize, layer: u32, capacity: usize) -> Result<NodeId> {
        debug_assert!(lo < hi);
        let code = morton::prefix(self.entries[lo].code, layer);

        // Single entry, or coincident keys at the deepest layer: a leaf
        // covering the whole range.
        if hi - lo == 1 || layer == MAX_LAYER {
            return self.push_node(OctreeNode::new(code, layer, lo, hi - lo), capacity);
        }

        // Split the sorted range on this layer's 3-bit digit. Runs appear in
        // ascending digit order because the entries are sorted.
        let mut children = [NodeId::EMPTY; 8];
        let mut start = lo;
        while start < hi {
            let digit = morton::child_digit(self.entries[start].code, layer);
            let mut end = start + 1;
            while end < hi && morton::child_digit(self.entries[end].code, layer) == digit {
                end += 1;
            }
            children[digit] = self.build_range(start, end, layer + 1, capacity)?;
            start = end;
        }

        let mut node = OctreeNode::new(code, layer, lo, hi - lo);
        node.children = children;
        self.push_node(node, capacity)
    }

    fn push_node(&mut self, node: OctreeNode, capacity: usize) -> Result<NodeId> {
        if self.nodes.len() >= capacity {
            return Err(OctreeError::CapacityExceeded {
                needed: self.nodes.len() + 1,
                capacity,
            });
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Arena capacity sufficient for any distribution of `particles` bodies:
    /// every (entry, layer) pair maps to at most one node, so the node count
    /// never exceeds `(MAX_LAYER + 1) * n`, plus one for the degenerate root.
    pub fn capacity_for(particles: usize) -> usize {
        (MAX_LAYER as usize + 1) * particles + 1
    }

    /// Root node id, or [`NodeId::EMPTY`] for a tree built over zero
    /// particles.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Morton code of the root cell, or [`INVALID_MORTON_CODE`] for an empty
    /// tree.
    pub fn root_code(&self) -> u64 {
        if self.root.is_empty() {
            INVALID_MORTON_CODE
        } else {
            self.nodes[self.root.index()].morton_code
        }
    }

    /// The node behind `id`.
    pub fn node(&self, id: NodeId) -> &OctreeNode {
        &self.nodes[id.index()]
    }

    /// All nodes, in arena (post-) order.
    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    /// The sorted `(key, particle)` entries the tree was built from.
    pub fn entries(&self) -> &[MortonEntry] {
        &self.entries
    }

    /// The sorted entries covered by `node`. For a leaf these resolve its
    /// particle(s); coincident particles share a deepest-layer leaf.
    pub fn entries_of(&self, node: &OctreeNode) -> &[MortonEntry] {
        &self.entries[node.entry_range()]
    }

    /// The scene cube this tree was quantized against.
    pub fn cube(&self) -> &SceneCube {
        &self.cube
    }

    /// Edge length of the cell covered by `node`.
    pub fn node_extent(&self, node: &OctreeNode) -> f64 {
        self.cube.extent_at_layer(node.layer)
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree covers no particles.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// How many positions fell outside the scene cube and were clamped
    /// during encoding. Reported as a metric; never an error.
    pub fn clamped_positions(&self) -> usize {
        self.clamped
    }
}
