//! The collision query objects and the collector for collision results.

use nalgebra_glm::Vec3;

use crate::math::{aabb_ray_interval, Ray, SweepSphere, AABB};

/// An object that can be tested for collisions.
#[derive(Debug, Clone, Copy)]
pub enum Collidable {
    Ray(Ray),
    SweepSphere(SweepSphere),

    /// A bounding volume. Part of the collision model, but not supported by triangle indices.
    Volume(AABB),
}

impl Collidable {
    /// Returns a human readable name of the collidable type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Collidable::Ray(_) => "ray",
            Collidable::SweepSphere(_) => "swept sphere",
            Collidable::Volume(_) => "bounding volume",
        }
    }
}

impl From<Ray> for Collidable {
    fn from(ray: Ray) -> Self {
        Collidable::Ray(ray)
    }
}

impl From<SweepSphere> for Collidable {
    fn from(sphere: SweepSphere) -> Self {
        Collidable::SweepSphere(sphere)
    }
}

/// A bounding volume in world space enclosing a whole mesh. Used to reject queries before the
/// spatial index is touched.
pub trait BoundingVolume {
    /// Returns the parametric interval (t_near, t_far) in which the ray is inside the volume.
    /// t_near is negative if the ray starts inside the volume.
    fn ray_interval(&self, ray: &Ray) -> Option<(f32, f32)>;

    /// Returns true if the volume overlaps the given box.
    fn intersects_aabb(&self, aabb: &AABB) -> bool;
}

impl BoundingVolume for AABB {
    #[inline]
    fn ray_interval(&self, ray: &Ray) -> Option<(f32, f32)> {
        aabb_ray_interval(self, ray)
    }

    #[inline]
    fn intersects_aabb(&self, aabb: &AABB) -> bool {
        AABB::intersects_aabb(self, aabb)
    }
}

/// A single contact between a collidable and a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// The distance in world space, i.e., the distance along the ray or the distance travelled by
    /// the swept sphere until the contact.
    pub distance: f32,

    /// The contact point in world space.
    pub contact_point: Vec3,

    /// The contact normal in world space.
    pub contact_normal: Vec3,

    /// The index of the triangle within the source mesh.
    pub triangle_index: usize,
}

/// Collects collision results. Results are kept in the order in which they were added.
#[derive(Debug, Clone, Default)]
pub struct CollisionResults {
    results: Vec<CollisionResult>,
}

impl CollisionResults {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, result: CollisionResult) {
        self.results.push(result);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, CollisionResult> {
        self.results.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[CollisionResult] {
        &self.results
    }

    /// Returns the result with the smallest distance.
    pub fn closest(&self) -> Option<&CollisionResult> {
        self.results
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Returns the result with the largest distance.
    pub fn farthest(&self) -> Option<&CollisionResult> {
        self.results
            .iter()
            .max_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Sorts the results by increasing distance.
    pub fn sort_by_distance(&mut self) {
        self.results
            .sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }

    /// Returns the sorted and deduplicated triangle indices of all results.
    pub fn triangle_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.results.iter().map(|r| r.triangle_index).collect();
        indices.sort_unstable();
        indices.dedup();

        indices
    }
}

impl<'a> IntoIterator for &'a CollisionResults {
    type Item = &'a CollisionResult;
    type IntoIter = std::slice::Iter<'a, CollisionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn result(distance: f32, triangle_index: usize) -> CollisionResult {
        CollisionResult {
            distance,
            contact_point: Vec3::zeros(),
            contact_normal: Vec3::new(0.0, 1.0, 0.0),
            triangle_index,
        }
    }

    #[test]
    fn test_results_keep_insertion_order() {
        let mut results = CollisionResults::new();
        assert!(results.closest().is_none());

        results.add(result(3.0, 7));
        results.add(result(1.0, 2));
        results.add(result(2.0, 7));

        assert_eq!(results.len(), 3);
        assert_eq!(results.as_slice()[0].distance, 3.0);
        assert_eq!(results.closest().unwrap().triangle_index, 2);
        assert_eq!(results.farthest().unwrap().distance, 3.0);
        assert_eq!(results.triangle_indices(), vec![2, 7]);

        results.sort_by_distance();
        let distances: Vec<f32> = results.iter().map(|r| r.distance).collect();
        assert_eq!(distances, vec![1.0, 2.0, 3.0]);

        results.clear();
        assert!(results.is_empty());
    }

    #[test]
    fn test_aabb_as_bounding_volume() {
        let aabb = AABB::new_cube(&Vec3::zeros(), 2.0);
        let ray = Ray::new(&Vec3::new(0.0, 0.0, -3.0), &Vec3::new(0.0, 0.0, 1.0));

        assert_eq!(BoundingVolume::ray_interval(&aabb, &ray), Some((2.0, 4.0)));
        assert!(BoundingVolume::intersects_aabb(
            &aabb,
            &AABB::new_cube(&Vec3::new(1.5, 0.0, 0.0), 1.0)
        ));
    }
}
