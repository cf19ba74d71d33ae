use nalgebra_glm::Vec3;

use crate::{math::AABB, Mesh, Result};

/// Number of floats stored per triangle, i.e., 3 vertices with 3 coordinates each.
pub const FLOATS_PER_TRIANGLE: usize = 9;

/// Flat storage of the triangle positions together with the original triangle indices.
/// Slot i holds the floats 9 * i .. 9 * i + 9 and the original index of the triangle that is
/// currently stored there. Both arrays are only permuted together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangleStore {
    positions: Vec<f32>,
    original_index: Vec<u32>,
}

impl TriangleStore {
    /// Creates the store by copying the vertex positions of every triangle of the mesh.
    ///
    /// # Arguments
    /// * `mesh` - The mesh to copy the triangles from.
    pub fn from_mesh(mesh: &Mesh) -> Result<Self> {
        mesh.validate()?;

        let num_triangles = mesh.triangle_count();
        let mut positions = Vec::with_capacity(num_triangles * FLOATS_PER_TRIANGLE);

        for t in mesh.triangles() {
            for i in t {
                let p = &mesh.vertices[i as usize];
                positions.extend_from_slice(&[p[0], p[1], p[2]]);
            }
        }

        Ok(Self {
            positions,
            original_index: (0..num_triangles as u32).collect(),
        })
    }

    /// Creates the store from already permuted raw data. The caller must make sure that the
    /// lengths of both arrays match.
    pub(crate) fn from_raw(positions: Vec<f32>, original_index: Vec<u32>) -> Self {
        debug_assert_eq!(positions.len(), original_index.len() * FLOATS_PER_TRIANGLE);

        Self {
            positions,
            original_index,
        }
    }

    /// Returns the number of stored triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.original_index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.original_index.is_empty()
    }

    /// Returns the flat position array.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Returns the original triangle indices of all slots.
    #[inline]
    pub fn original_indices(&self) -> &[u32] {
        &self.original_index
    }

    /// Returns the index of the triangle in the source mesh that is stored in the given slot.
    #[inline]
    pub fn original_index(&self, slot: usize) -> usize {
        self.original_index[slot] as usize
    }

    /// Returns the three vertices of the triangle in the given slot.
    ///
    /// # Panics
    /// Panics if the slot is out of range.
    #[inline]
    pub fn get_triangle(&self, slot: usize) -> [Vec3; 3] {
        let p = &self.positions[slot * FLOATS_PER_TRIANGLE..(slot + 1) * FLOATS_PER_TRIANGLE];

        [
            Vec3::new(p[0], p[1], p[2]),
            Vec3::new(p[3], p[4], p[5]),
            Vec3::new(p[6], p[7], p[8]),
        ]
    }

    /// Returns an iterator over the original index and the vertices of every slot.
    pub fn triangles(&self) -> impl Iterator<Item = (usize, [Vec3; 3])> + '_ {
        (0..self.len()).map(|slot| (self.original_index(slot), self.get_triangle(slot)))
    }

    /// Returns the coordinate of the triangle centroid along the given axis.
    #[inline]
    fn centroid(&self, slot: usize, axis: usize) -> f32 {
        let p = slot * FLOATS_PER_TRIANGLE + axis;
        (self.positions[p] + self.positions[p + 3] + self.positions[p + 6]) / 3f32
    }

    /// Swaps the triangles in both slots.
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }

        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.positions.split_at_mut(hi * FLOATS_PER_TRIANGLE);
        head[lo * FLOATS_PER_TRIANGLE..(lo + 1) * FLOATS_PER_TRIANGLE]
            .swap_with_slice(&mut tail[..FLOATS_PER_TRIANGLE]);

        self.original_index.swap(a, b);
    }

    /// Computes the bounding volume of all vertices of the triangles in the slots l..=r.
    ///
    /// # Arguments
    /// * `l` - The first slot.
    /// * `r` - The last slot (inclusive).
    pub fn bounds(&self, l: usize, r: usize) -> AABB {
        let mut aabb = AABB::new();

        for slot in l..=r {
            for p in self.get_triangle(slot).iter() {
                aabb.extend_pos(p);
            }
        }

        aabb
    }

    /// Reorders the slots l..=r such that all triangles whose centroid lies on or below the
    /// split value along the axis come first. Returns the first slot of the upper part, i.e.,
    /// l if every triangle is above the split and r + 1 if none is. The order inside both parts
    /// is unspecified.
    ///
    /// # Arguments
    /// * `l` - The first slot.
    /// * `r` - The last slot (inclusive).
    /// * `split` - The split value.
    /// * `axis` - The axis along which the centroids are compared.
    pub(crate) fn partition(&mut self, l: usize, r: usize, split: f32, axis: usize) -> usize {
        let mut pivot = l;
        let mut end = r + 1;

        while pivot < end {
            if self.centroid(pivot, axis) > split {
                end -= 1;
                self.swap(pivot, end);
            } else {
                pivot += 1;
            }
        }

        pivot
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::cube_grid;

    fn strip(n: usize) -> Mesh {
        // one triangle per unit along the x-axis, in reverse order
        let mut vertices = Vec::new();
        for i in (0..n).rev() {
            let x = i as f32;
            vertices.push(Vec3::new(x, 0.0, 0.0));
            vertices.push(Vec3::new(x + 0.5, 1.0, 0.0));
            vertices.push(Vec3::new(x + 1.0, 0.0, 0.0));
        }

        let indices = (0..vertices.len() as u32).collect();
        Mesh::new(vertices, indices)
    }

    #[test]
    fn test_from_mesh() {
        let mesh = cube_grid(2, 3.0);
        let store = TriangleStore::from_mesh(&mesh).unwrap();

        assert_eq!(store.len(), 24);
        assert_eq!(store.positions().len(), 24 * FLOATS_PER_TRIANGLE);
        assert_eq!(store.original_index(5), 5);

        for (t, indices) in mesh.triangles().enumerate() {
            let expected = indices.map(|i| mesh.vertices[i as usize]);
            assert_eq!(store.get_triangle(t), expected);
        }
    }

    #[test]
    fn test_from_invalid_mesh() {
        let mesh = Mesh::new(vec![Vec3::zeros(); 2], vec![0, 1, 2]);
        assert!(TriangleStore::from_mesh(&mesh).is_err());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_slot() {
        let store = TriangleStore::from_mesh(&strip(2)).unwrap();
        store.get_triangle(2);
    }

    #[test]
    fn test_swap_moves_positions_and_indices_together() {
        let store0 = TriangleStore::from_mesh(&strip(4)).unwrap();
        let mut store = store0.clone();

        store.swap(3, 1);
        assert_eq!(store.get_triangle(1), store0.get_triangle(3));
        assert_eq!(store.get_triangle(3), store0.get_triangle(1));
        assert_eq!(store.original_index(1), 3);
        assert_eq!(store.original_index(3), 1);
        assert_eq!(store.get_triangle(0), store0.get_triangle(0));

        store.swap(2, 2);
        assert_eq!(store.get_triangle(2), store0.get_triangle(2));
    }

    #[test]
    fn test_bounds() {
        let store = TriangleStore::from_mesh(&strip(4)).unwrap();

        // slots are in reverse order, slot 0 holds the triangle at x=3
        let aabb = store.bounds(0, 1);
        assert_eq!(aabb.min, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 1.0, 0.0));
    }

    #[test]
    fn test_partition() {
        let mut store = TriangleStore::from_mesh(&strip(6)).unwrap();

        // centroids are at x = i + 0.5
        let pivot = store.partition(0, 5, 2.9, 0);
        assert_eq!(pivot, 3);
        for slot in 0..pivot {
            assert!(store.centroid(slot, 0) <= 2.9);
        }
        for slot in pivot..6 {
            assert!(store.centroid(slot, 0) > 2.9);
        }

        // every original index is still present exactly once
        let mut indices = store.original_indices().to_vec();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);

        // all triangles above and below the split
        assert_eq!(store.partition(1, 4, -1.0, 0), 1);
        assert_eq!(store.partition(1, 4, 100.0, 0), 5);
    }
}
