use log::{debug, trace};

use crate::{math::AABB, Error, Mesh, Result};

use super::{Axis, BIHNode, BIHTree, TriangleStore};

/// The options for building a BIH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BIHOptions {
    /// Ranges whose size minus one is below this value become leaves.
    pub max_tris_per_leaf: usize,

    /// The recursion depth after which a leaf is created in any case.
    pub max_depth: usize,
}

impl Default for BIHOptions {
    fn default() -> Self {
        Self {
            max_tris_per_leaf: 21,
            max_depth: 100,
        }
    }
}

impl BIHOptions {
    /// Returns the default options with the given maximal number of triangles per leaf.
    pub fn with_max_tris_per_leaf(max_tris_per_leaf: usize) -> Self {
        Self {
            max_tris_per_leaf,
            ..Default::default()
        }
    }
}

pub struct Builder {
    nodes: Vec<BIHNode>,
    store: TriangleStore,
    options: BIHOptions,
}

impl Builder {
    /// Creates a new BIH builder with the provided options.
    ///
    /// # Arguments
    /// * `options` - The options for the BIH.
    pub fn new(options: BIHOptions) -> Result<Self> {
        if options.max_tris_per_leaf < 1 {
            return Err(Error::InvalidArgument(format!(
                "max_tris_per_leaf must be at least 1, got {}",
                options.max_tris_per_leaf
            )));
        }

        Ok(Self {
            options,
            nodes: Vec::new(),
            store: TriangleStore::default(),
        })
    }

    /// Builds the BIH from the triangles of the provided mesh.
    ///
    /// # Arguments
    /// * `mesh` - The mesh to build the BIH from.
    pub fn build(self, mesh: &Mesh) -> Result<BIHTree> {
        let store = TriangleStore::from_mesh(mesh)?;
        Ok(self.build_from_store(store))
    }

    /// Builds the BIH over the given store. The slots of the store get permuted.
    ///
    /// # Arguments
    /// * `store` - The triangles to build the BIH from.
    pub fn build_from_store(mut self, store: TriangleStore) -> BIHTree {
        self.store = store;

        if !self.store.is_empty() {
            let r = self.store.len() - 1;
            let scene_box = self.store.bounds(0, r);
            self.create_node(0, r, scene_box, 0, 0);
        }

        let tree = BIHTree::from_parts(self.nodes, self.store, self.options.max_tris_per_leaf);

        debug!(
            "Built BIH over {} triangles: {} nodes, depth {}",
            tree.store().len(),
            tree.nodes().len(),
            tree.depth()
        );

        tree
    }

    /// Chooses the axis along which the node box has the most space left around its content.
    /// Ties are resolved towards the lower axis.
    fn choose_axis(node_box: &AABB, current_box: &AABB) -> usize {
        let slack = node_box.get_size() - current_box.get_size();

        let mut axis = 0;
        for a in 1..3 {
            if slack[a] > slack[axis] {
                axis = a;
            }
        }

        axis
    }

    /// Recursively creates the node for the slots l..=r and returns its index.
    ///
    /// # Arguments
    /// * `l` - The first slot.
    /// * `r` - The last slot (inclusive).
    /// * `node_box` - The box enclosing the node.
    /// * `depth` - The recursion depth.
    /// * `degenerated` - Bit mask of the axes along which the same range already failed to split.
    fn create_node(
        &mut self,
        l: usize,
        r: usize,
        node_box: AABB,
        depth: usize,
        degenerated: u8,
    ) -> u32 {
        if (r - l) < self.options.max_tris_per_leaf || depth > self.options.max_depth {
            return self.push_leaf(l, r);
        }

        let current_box = self.store.bounds(l, r);
        let axis = Self::choose_axis(&node_box, &current_box);

        // Splitting the same range along the same axis again ends up in the same state as
        // before, so no split will ever be found.
        if degenerated & (1 << axis) != 0 {
            trace!("No split found for slots {}..={}, creating leaf", l, r);
            return self.push_leaf(l, r);
        }

        let split = current_box.get_center()[axis];
        let mut pivot = self.store.partition(l, r, split, axis);

        // If one of the partitions is empty, continue with the same range but a tighter box.
        if pivot == l {
            trace!("Slots {}..={} all right of {} on axis {}", l, r, split, axis);
            let rbox = current_box.with_min_at(axis, split);
            return self.create_node(l, r, rbox, depth + 1, degenerated | (1 << axis));
        } else if pivot > r {
            trace!("Slots {}..={} all left of {} on axis {}", l, r, split, axis);
            let lbox = current_box.with_max_at(axis, split);
            return self.create_node(l, r, lbox, depth + 1, degenerated | (1 << axis));
        }

        if pivot == r {
            pivot = ((l + r) / 2).max(l + 1);
        }

        // reserve the node, the children are appended behind it
        let index = self.nodes.len();
        self.nodes.push(BIHNode::Leaf { left: 0, right: 0 });

        let left_plane = self.store.bounds(l, pivot - 1).max[axis];
        let right_plane = self.store.bounds(pivot, r).min[axis];

        let lbox = current_box.with_max_at(axis, split);
        let left = self.create_node(l, pivot - 1, lbox, depth + 1, 0);

        let rbox = current_box.with_min_at(axis, split);
        let right = self.create_node(pivot, r, rbox, depth + 1, 0);

        self.nodes[index] = BIHNode::Internal {
            axis: Axis::from_index(axis),
            left_plane,
            right_plane,
            left,
            right,
        };

        index as u32
    }

    fn push_leaf(&mut self, l: usize, r: usize) -> u32 {
        let index = self.nodes.len();
        self.nodes.push(BIHNode::Leaf {
            left: l as u32,
            right: r as u32,
        });

        index as u32
    }
}
