use nalgebra_glm::Mat4;

use crate::{
    bih::{ray_triangle_contact, sweep_triangle_contact, TriangleStore},
    collision::{BoundingVolume, Collidable, CollisionResults},
    math::transform_vec3,
    Collider, Error, Result,
};

/// A very simple collider without any acceleration structures. Every triangle is tested against
/// the collidable.
pub struct NaiveCollider<'a> {
    store: &'a TriangleStore,
}

impl<'a> NaiveCollider<'a> {
    /// Creates a new naive collider over the given triangles.
    ///
    /// # Arguments
    /// * `store` - The triangles to test.
    pub fn new(store: &'a TriangleStore) -> Self {
        Self { store }
    }
}

impl Collider for NaiveCollider<'_> {
    fn get_name() -> &'static str {
        "naive"
    }

    fn collide_with(
        &self,
        collidable: &Collidable,
        world_matrix: &Mat4,
        _world_bound: &dyn BoundingVolume,
        results: &mut CollisionResults,
    ) -> Result<usize> {
        let mut count = 0;

        for (triangle_index, triangle) in self.store.triangles() {
            let triangle = triangle.map(|p| transform_vec3(world_matrix, &p));

            let result = match collidable {
                Collidable::Ray(ray) => ray_triangle_contact(ray, &triangle, triangle_index),
                Collidable::SweepSphere(sphere) => {
                    sweep_triangle_contact(sphere, &triangle, triangle_index)
                }
                Collidable::Volume(_) => {
                    return Err(Error::UnsupportedCollision(collidable.type_name()))
                }
            };

            if let Some(result) = result {
                results.add(result);
                count += 1;
            }
        }

        Ok(count)
    }
}
