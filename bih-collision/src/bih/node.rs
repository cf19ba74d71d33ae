use serde::{Deserialize, Serialize};

/// One of the three spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the index of the axis, i.e., 0 for x, 1 for y and 2 for z.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline]
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i]
    }
}

/// A node of the bounding interval hierarchy. Children are referenced by their position in the
/// flat node array of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BIHNode {
    /// The triangles in the slots left..=right.
    Leaf { left: u32, right: u32 },

    Internal {
        axis: Axis,

        /// The maximal extent of the left child's triangles along the axis.
        left_plane: f32,

        /// The minimal extent of the right child's triangles along the axis.
        right_plane: f32,

        left: u32,
        right: u32,
    },
}

impl BIHNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, BIHNode::Leaf { .. })
    }

    /// Returns the slot range of a leaf and None for internal nodes.
    #[inline]
    pub fn slots(&self) -> Option<std::ops::RangeInclusive<usize>> {
        match *self {
            BIHNode::Leaf { left, right } => Some(left as usize..=right as usize),
            BIHNode::Internal { .. } => None,
        }
    }

    /// Returns the indices of both children of an internal node.
    #[inline]
    pub fn children(&self) -> Option<[usize; 2]> {
        match *self {
            BIHNode::Leaf { .. } => None,
            BIHNode::Internal { left, right, .. } => Some([left as usize, right as usize]),
        }
    }
}
