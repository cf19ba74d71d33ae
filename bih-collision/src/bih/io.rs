use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

use super::{BIHNode, BIHTree, TriangleStore, FLOATS_PER_TRIANGLE};

/// The persisted form of a [`BIHTree`]. The arrays are stored in their permuted order, so a
/// loaded tree is identical to the written one without rebuilding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTree {
    /// The flat triangle positions, 9 floats per slot.
    pub points: Vec<f32>,

    /// The original triangle index of every slot.
    pub indices: Vec<u32>,

    /// The nodes in pre-order.
    pub nodes: Vec<BIHNode>,

    /// The maximal number of triangles per leaf the tree was built with.
    pub tris_per_node: u32,
}

impl BIHTree {
    /// Returns the persisted form of the tree.
    pub fn to_persisted(&self) -> PersistedTree {
        PersistedTree {
            points: self.store().positions().to_vec(),
            indices: self.store().original_indices().to_vec(),
            nodes: self.nodes().to_vec(),
            tris_per_node: self.max_tris_per_leaf() as u32,
        }
    }

    /// Restores the tree from its persisted form.
    ///
    /// # Arguments
    /// * `data` - The persisted tree data.
    pub fn from_persisted(data: PersistedTree) -> Result<Self> {
        validate(&data)?;

        let PersistedTree {
            points,
            indices,
            nodes,
            tris_per_node,
        } = data;

        let store = TriangleStore::from_raw(points, indices);
        Ok(BIHTree::from_parts(nodes, store, tris_per_node as usize))
    }

    /// Writes the tree to the given writer.
    ///
    /// # Arguments
    /// * `writer` - The writer to write the tree to.
    pub fn write<W: std::io::Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, &self.to_persisted())
            .map_err(|e| Error::SerializationError(Box::new(e)))
    }

    /// Reads a tree that has been written with [`BIHTree::write`].
    ///
    /// # Arguments
    /// * `reader` - The reader to read the tree from.
    pub fn read_from<R: std::io::Read>(reader: R) -> Result<Self> {
        let data: PersistedTree = bincode::deserialize_from(reader)
            .map_err(|e| Error::DeserializationError(Box::new(e)))?;

        debug!(
            "Read BIH with {} nodes over {} triangles",
            data.nodes.len(),
            data.indices.len()
        );

        Self::from_persisted(data)
    }
}

fn corrupted<T>(msg: String) -> Result<T> {
    Err(Error::CorruptedTree(msg))
}

/// Checks the structural consistency of the persisted data.
fn validate(data: &PersistedTree) -> Result<()> {
    let num_triangles = data.indices.len();
    let num_nodes = data.nodes.len();

    if data.points.len() != num_triangles * FLOATS_PER_TRIANGLE {
        return corrupted(format!(
            "{} floats for {} triangles",
            data.points.len(),
            num_triangles
        ));
    }

    if data.tris_per_node < 1 {
        return corrupted("triangles per node must be at least 1".to_owned());
    }

    if let Some(i) = data.indices.iter().find(|i| **i as usize >= num_triangles) {
        return corrupted(format!("triangle index {} out of range", i));
    }

    if num_triangles > 0 && num_nodes == 0 {
        return corrupted(format!("no nodes for {} triangles", num_triangles));
    }

    for (index, node) in data.nodes.iter().enumerate() {
        match *node {
            BIHNode::Leaf { left, right } => {
                if left > right || right as usize >= num_triangles {
                    return corrupted(format!(
                        "leaf {} covers invalid slots {}..={}",
                        index, left, right
                    ));
                }
            }
            BIHNode::Internal {
                left,
                right,
                left_plane,
                right_plane,
                ..
            } => {
                for child in [left as usize, right as usize] {
                    if child <= index || child >= num_nodes {
                        return corrupted(format!(
                            "node {} references invalid child {}",
                            index, child
                        ));
                    }
                }

                if left_plane.is_nan() || right_plane.is_nan() {
                    return corrupted(format!("node {} has an invalid plane", index));
                }
            }
        }
    }

    validate_coverage(data)
}

/// Walks the tree from the root and checks that every node is reached exactly once and that the
/// leaves cover every slot exactly once.
fn validate_coverage(data: &PersistedTree) -> Result<()> {
    if data.nodes.is_empty() {
        return Ok(());
    }

    let mut reached = vec![false; data.nodes.len()];
    let mut covered = vec![false; data.indices.len()];
    let mut stack = vec![0usize];

    while let Some(index) = stack.pop() {
        if std::mem::replace(&mut reached[index], true) {
            return corrupted(format!("node {} has more than one parent", index));
        }

        if let Some(slots) = data.nodes[index].slots() {
            for slot in slots {
                if std::mem::replace(&mut covered[slot], true) {
                    return corrupted(format!("slot {} is covered by more than one leaf", slot));
                }
            }
        }

        if let Some(children) = data.nodes[index].children() {
            stack.extend(children);
        }
    }

    if let Some(index) = reached.iter().position(|r| !r) {
        return corrupted(format!("node {} is not reachable from the root", index));
    }

    if let Some(slot) = covered.iter().position(|c| !c) {
        return corrupted(format!("slot {} is not covered by any leaf", slot));
    }

    Ok(())
}
