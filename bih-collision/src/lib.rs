pub mod bih;
mod collision;
mod config;
mod error;
mod executor;
pub mod math;
mod naive;
mod scene;
mod stats;

pub use bih::{BIHNode, BIHOptions, BIHTree, PersistedTree, QueryScratch, QueryStats};
pub use collision::*;
pub use config::*;
pub use error::*;
pub use executor::*;
pub use naive::*;
pub use scene::*;
pub use stats::*;

use nalgebra_glm::Mat4;

/// Something that can be tested for collisions against a collidable.
pub trait Collider {
    /// Returns the name of the collider.
    fn get_name() -> &'static str
    where
        Self: Sized;

    /// Tests the collidable against the triangles of the collider and appends all contacts to
    /// the results. Returns the number of added contacts.
    ///
    /// # Arguments
    /// * `collidable` - The ray or swept sphere in world space.
    /// * `world_matrix` - The transformation of the triangles from model into world space.
    /// * `world_bound` - The world space bounding volume of the triangles.
    /// * `results` - The collector for the contacts.
    fn collide_with(
        &self,
        collidable: &Collidable,
        world_matrix: &Mat4,
        world_bound: &dyn BoundingVolume,
        results: &mut CollisionResults,
    ) -> Result<usize>;
}
