mod generate;

pub use generate::*;

use crate::{Error, Result};
use nalgebra_glm::Vec3;
use serde::{Deserialize, Serialize};

/// A simple tessellated mesh, i.e., a vertex buffer and a flat triangle index buffer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,

    /// Three consecutive indices define one triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates a new mesh from the given vertex and index buffer.
    ///
    /// # Arguments
    /// * `vertices` - The vertex positions.
    /// * `indices` - The triangle index buffer.
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Returns the number of triangles of the mesh.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns an iterator over the index triples of all triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Returns `true` if all indices are valid and false otherwise.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks that every index references an existing vertex.
    pub fn validate(&self) -> Result<()> {
        let num_vertices = self.vertices.len();

        for (triangle, t) in self.triangles().enumerate() {
            if let Some(index) = t.iter().find(|i| **i as usize >= num_vertices) {
                return Err(Error::InvalidMeshIndex {
                    triangle,
                    index: *index,
                    num_vertices,
                });
            }
        }

        Ok(())
    }

    /// Appends the given mesh to this mesh. The triangles of other are numbered after the
    /// existing triangles.
    ///
    /// # Arguments
    /// * `other` - The mesh to append.
    pub fn append(&mut self, other: &Mesh) {
        let index_offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|i| i + index_offset));
    }

    /// Writes the mesh to the given writer.
    ///
    /// # Arguments
    /// * `writer` - The writer to write the mesh to.
    pub fn write<W: std::io::Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, self).map_err(|e| Error::SerializationError(Box::new(e)))
    }

    /// Reads the mesh from the given reader.
    ///
    /// # Arguments
    /// * `reader` - The reader to read the mesh from.
    pub fn read_from<R: std::io::Read>(reader: R) -> Result<Self> {
        bincode::deserialize_from(reader).map_err(|e| Error::DeserializationError(Box::new(e)))
    }
}
