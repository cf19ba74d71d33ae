//! Bounding interval hierarchy over a triangle soup.
//!
//! The tree partitions the triangle slots of a [`TriangleStore`] into a binary hierarchy. Every
//! internal node stores two planes along its split axis: the maximal extent of the left child and
//! the minimal extent of the right child. The planes may overlap. Queries shrink their search
//! interval with these planes instead of testing full bounding boxes.

mod builder;
mod io;
mod node;
mod store;
mod traversal;

pub use builder::*;
pub use io::*;
pub use node::*;
pub use store::*;
pub use traversal::*;

use nalgebra_glm::Mat4;

use crate::{
    collision::{BoundingVolume, Collidable, CollisionResults},
    math::{Ray, SweepSphere, AABB},
    Collider, Error, Mesh, Result,
};

/// Bounding Interval Hierarchy
#[derive(Debug, Clone)]
pub struct BIHTree {
    /// The nodes in pre-order. The first node is the root node.
    nodes: Vec<BIHNode>,

    /// The triangles, permuted such that every leaf covers a contiguous range of slots.
    store: TriangleStore,

    max_tris_per_leaf: usize,

    /// The model space bounding volume of all triangles.
    bound: AABB,
}

impl BIHTree {
    /// Builds the tree over the given mesh with the default options.
    ///
    /// # Arguments
    /// * `mesh` - The mesh to build the tree from.
    pub fn new(mesh: &Mesh) -> Result<Self> {
        Self::with_options(mesh, BIHOptions::default())
    }

    /// Builds the tree over the given mesh.
    ///
    /// # Arguments
    /// * `mesh` - The mesh to build the tree from.
    /// * `options` - The build options.
    pub fn with_options(mesh: &Mesh, options: BIHOptions) -> Result<Self> {
        Builder::new(options)?.build(mesh)
    }

    pub(crate) fn from_parts(
        nodes: Vec<BIHNode>,
        store: TriangleStore,
        max_tris_per_leaf: usize,
    ) -> Self {
        let bound = if store.is_empty() {
            AABB::new()
        } else {
            store.bounds(0, store.len() - 1)
        };

        Self {
            nodes,
            store,
            max_tris_per_leaf,
            bound,
        }
    }

    #[inline]
    pub fn nodes(&self) -> &[BIHNode] {
        &self.nodes
    }

    #[inline]
    pub fn store(&self) -> &TriangleStore {
        &self.store
    }

    #[inline]
    pub fn max_tris_per_leaf(&self) -> usize {
        self.max_tris_per_leaf
    }

    /// Returns the bounding volume of all triangles in model space.
    #[inline]
    pub fn model_bound(&self) -> &AABB {
        &self.bound
    }

    /// Returns the bounding volume of all triangles after transforming them into world space.
    ///
    /// # Arguments
    /// * `world_matrix` - The transformation from model into world space.
    pub fn world_bound(&self, world_matrix: &Mat4) -> AABB {
        self.bound.transformed(world_matrix)
    }

    /// Returns the number of levels of the tree. An empty tree has depth 0.
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        let mut depth = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((index, level)) = stack.pop() {
            depth = depth.max(level);

            if let Some(children) = self.nodes[index].children() {
                stack.extend(children.iter().map(|c| (*c, level + 1)));
            }
        }

        depth
    }

    /// Returns the slot ranges of all leaves.
    pub fn leaves(&self) -> impl Iterator<Item = std::ops::RangeInclusive<usize>> + '_ {
        self.nodes.iter().filter_map(|n| n.slots())
    }

    /// Tests the collidable against all triangles of the tree and appends the contacts to the
    /// results. Returns the number of contacts that were added.
    ///
    /// # Arguments
    /// * `collidable` - The ray or swept sphere in world space.
    /// * `world_matrix` - The transformation of the triangles from model into world space.
    /// * `world_bound` - The world space bounding volume of the triangles.
    /// * `results` - The collector for the contacts.
    pub fn collide_with<B: BoundingVolume + ?Sized>(
        &self,
        collidable: &Collidable,
        world_matrix: &Mat4,
        world_bound: &B,
        results: &mut CollisionResults,
    ) -> Result<usize> {
        let mut scratch = QueryScratch::new();
        self.collide_with_scratch(collidable, world_matrix, world_bound, results, &mut scratch)
    }

    /// Same as [`BIHTree::collide_with`], but reuses the given scratch memory and accumulates
    /// the traversal stats in it.
    pub fn collide_with_scratch<B: BoundingVolume + ?Sized>(
        &self,
        collidable: &Collidable,
        world_matrix: &Mat4,
        world_bound: &B,
        results: &mut CollisionResults,
        scratch: &mut QueryScratch,
    ) -> Result<usize> {
        match collidable {
            Collidable::Ray(ray) => {
                self.collide_with_ray(ray, world_matrix, world_bound, results, scratch)
            }
            Collidable::SweepSphere(sphere) => {
                self.collide_with_sweep_sphere(sphere, world_matrix, world_bound, results, scratch)
            }
            Collidable::Volume(_) => Err(Error::UnsupportedCollision(collidable.type_name())),
        }
    }

    fn collide_with_ray<B: BoundingVolume + ?Sized>(
        &self,
        ray: &Ray,
        world_matrix: &Mat4,
        world_bound: &B,
        results: &mut CollisionResults,
        scratch: &mut QueryScratch,
    ) -> Result<usize> {
        let (mut t_min, mut t_max) = match world_bound.ray_interval(ray) {
            Some(interval) => interval,
            None => return Ok(0),
        };

        if t_max <= 0f32 {
            t_max = f32::INFINITY;
        } else if t_min == t_max {
            t_min = 0f32;
        }

        if t_min < 0f32 {
            t_min = 0f32;
        }

        let inv_world_matrix = invert(world_matrix)?;

        Ok(intersect_ray(
            self,
            ray,
            world_matrix,
            &inv_world_matrix,
            t_min,
            t_max,
            results,
            scratch,
        ))
    }

    fn collide_with_sweep_sphere<B: BoundingVolume + ?Sized>(
        &self,
        sphere: &SweepSphere,
        world_matrix: &Mat4,
        world_bound: &B,
        results: &mut CollisionResults,
        scratch: &mut QueryScratch,
    ) -> Result<usize> {
        let motion_box = sphere.motion_box();
        if !world_bound.intersects_aabb(&motion_box) {
            return Ok(0);
        }

        let inv_world_matrix = invert(world_matrix)?;
        let model_box = motion_box.transformed(&inv_world_matrix);

        Ok(intersect_sweep(
            self,
            sphere,
            &model_box,
            world_matrix,
            results,
            scratch,
        ))
    }
}

fn invert(world_matrix: &Mat4) -> Result<Mat4> {
    world_matrix
        .try_inverse()
        .ok_or_else(|| Error::InvalidArgument("The world matrix is not invertible".to_owned()))
}

impl Collider for BIHTree {
    fn get_name() -> &'static str {
        "bih"
    }

    fn collide_with(
        &self,
        collidable: &Collidable,
        world_matrix: &Mat4,
        world_bound: &dyn BoundingVolume,
        results: &mut CollisionResults,
    ) -> Result<usize> {
        BIHTree::collide_with(self, collidable, world_matrix, world_bound, results)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use nalgebra_glm::{rotate, scale, translate, Vec3};
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::{
        math::transform_vec3,
        naive::NaiveCollider,
        scene::{cube_grid, cube_grid_cell, random_soup},
    };

    fn single_triangle() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    fn hit_set(results: &CollisionResults) -> HashSet<usize> {
        results.iter().map(|r| r.triangle_index).collect()
    }

    /// Returns a random ray that starts somewhere around the given volume and points to a random
    /// position inside of it.
    fn gen_random_ray(rng: &mut ChaCha8Rng, aabb: &AABB) -> Ray {
        let center = aabb.get_center();
        let size = aabb.get_size();

        let target = Vec3::new(
            rng.random_range(aabb.min.x..aabb.max.x),
            rng.random_range(aabb.min.y..aabb.max.y),
            rng.random_range(aabb.min.z..aabb.max.z),
        );

        let start = center
            + Vec3::new(
                rng.random_range(-1.5f32..1.5) * size.x,
                rng.random_range(-1.5f32..1.5) * size.y,
                rng.random_range(-1.5f32..1.5) * size.z,
            );

        Ray::from_pos(&start, &target)
    }

    #[test]
    fn test_single_triangle_ray() {
        let tree = BIHTree::with_options(&single_triangle(), BIHOptions::with_max_tris_per_leaf(21))
            .unwrap();
        let world = Mat4::identity();
        let bound = tree.world_bound(&world);

        assert_eq!(tree.nodes(), &[BIHNode::Leaf { left: 0, right: 0 }]);

        let mut results = CollisionResults::new();
        let ray = Ray::new(&Vec3::new(0.25, 0.25, 1.0), &Vec3::new(0.0, 0.0, -1.0));
        let n = tree
            .collide_with(&Collidable::Ray(ray), &world, &bound, &mut results)
            .unwrap();

        assert_eq!(n, 1);
        let hit = results.closest().unwrap();
        assert_eq!(hit.triangle_index, 0);
        assert!((hit.distance - 1.0).abs() < 1e-6);
        assert!((hit.contact_point - Vec3::new(0.25, 0.25, 0.0)).norm() < 1e-6);
        assert!((hit.contact_normal - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-6);

        let mut results = CollisionResults::new();
        let ray = Ray::new(&Vec3::new(2.0, 2.0, 1.0), &Vec3::new(0.0, 0.0, -1.0));
        let n = tree
            .collide_with(&Collidable::Ray(ray), &world, &bound, &mut results)
            .unwrap();

        assert_eq!(n, 0);
        assert!(results.is_empty());
    }

    #[test]
    fn test_ray_starting_inside_bound() {
        let tree = BIHTree::new(&cube_grid(1, 1.0)).unwrap();
        let world = Mat4::identity();
        let bound = tree.world_bound(&world);

        // starts in the center of the cube, only the face in front is hit
        let mut results = CollisionResults::new();
        let ray = Ray::new(&Vec3::new(0.5, 0.5, 0.3), &Vec3::new(1.0, 0.0, 0.0));
        let n = tree
            .collide_with(&Collidable::Ray(ray), &world, &bound, &mut results)
            .unwrap();

        assert_eq!(n, 1);
        assert!((results.closest().unwrap().distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ray_through_one_cube() {
        let count = 100;
        let spacing = 3.0;
        let mesh = cube_grid(count, spacing);
        let tree = BIHTree::with_options(&mesh, BIHOptions::with_max_tris_per_leaf(21)).unwrap();
        assert!(tree.depth() > 1);

        let world = Mat4::identity();
        let bound = tree.world_bound(&world);

        let target = 47;
        let cell = cube_grid_cell(count, spacing, target);
        let ray = Ray::new(
            &(cell + Vec3::new(0.3, 5.0, 0.2)),
            &Vec3::new(0.0, -1.0, 0.0),
        );

        let mut results = CollisionResults::new();
        let mut scratch = QueryScratch::new();
        let n = tree
            .collide_with_scratch(&Collidable::Ray(ray), &world, &bound, &mut results, &mut scratch)
            .unwrap();

        // the top and the bottom face of the target cube
        assert_eq!(n, 2);
        assert!(results
            .iter()
            .all(|r| r.triangle_index / 12 == target));
        assert!((results.closest().unwrap().distance - 4.0).abs() < 1e-5);
        assert!((results.farthest().unwrap().distance - 5.0).abs() < 1e-5);

        // only a fraction of the triangles had to be tested
        assert!(scratch.stats().triangle_tests < mesh.triangle_count() / 4);
    }

    #[test]
    fn test_unsupported_collidable() {
        let tree = BIHTree::new(&single_triangle()).unwrap();
        let world = Mat4::identity();
        let bound = tree.world_bound(&world);

        let mut results = CollisionResults::new();
        let volume = Collidable::Volume(AABB::new_cube(&Vec3::zeros(), 1.0));
        match tree.collide_with(&volume, &world, &bound, &mut results) {
            Err(Error::UnsupportedCollision(_)) => {}
            _ => panic!("expected an unsupported collision"),
        }
    }

    #[test]
    fn test_singular_world_matrix() {
        let tree = BIHTree::new(&single_triangle()).unwrap();
        let world = scale(&Mat4::identity(), &Vec3::new(1.0, 1.0, 0.0));
        let bound = AABB::new_cube(&Vec3::zeros(), 10.0);

        let mut results = CollisionResults::new();
        let ray = Ray::new(&Vec3::new(0.25, 0.25, 1.0), &Vec3::new(0.0, 0.0, -1.0));
        assert!(tree
            .collide_with(&Collidable::Ray(ray), &world, &bound, &mut results)
            .is_err());
    }

    #[test]
    fn test_ray_missing_world_bound() {
        let tree = BIHTree::new(&cube_grid(4, 3.0)).unwrap();
        let world = Mat4::identity();
        let bound = tree.world_bound(&world);

        let mut results = CollisionResults::new();
        let mut scratch = QueryScratch::new();
        let ray = Ray::new(&Vec3::new(-5.0, 10.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        let n = tree
            .collide_with_scratch(&Collidable::Ray(ray), &world, &bound, &mut results, &mut scratch)
            .unwrap();

        assert_eq!(n, 0);
        assert_eq!(scratch.stats().nodes_visited, 0);
    }

    #[test]
    fn test_ray_matches_naive() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut num_hits = 0;

        for (num_triangles, max_tris_per_leaf) in [(50, 1), (400, 4), (2000, 21)] {
            let mesh = random_soup(&mut rng, num_triangles, -20.0..20.0, 3.0);
            let tree =
                BIHTree::with_options(&mesh, BIHOptions::with_max_tris_per_leaf(max_tris_per_leaf))
                    .unwrap();
            let naive_store = TriangleStore::from_mesh(&mesh).unwrap();
            let naive = NaiveCollider::new(&naive_store);

            let world = Mat4::identity();
            let bound = tree.world_bound(&world);

            for _ in 0..200 {
                let ray = Collidable::Ray(gen_random_ray(&mut rng, &bound));

                let mut r0 = CollisionResults::new();
                let mut r1 = CollisionResults::new();
                let n0 = tree.collide_with(&ray, &world, &bound, &mut r0).unwrap();
                let n1 = Collider::collide_with(&naive, &ray, &world, &bound, &mut r1).unwrap();

                assert_eq!(n0, n1);
                assert_eq!(hit_set(&r0), hit_set(&r1));
                num_hits += n0;
            }
        }

        assert!(num_hits > 0);
    }

    #[test]
    fn test_ray_matches_naive_with_transform() {
        let mut rng = ChaCha8Rng::seed_from_u64(43);

        let mesh = random_soup(&mut rng, 1000, -10.0..10.0, 2.0);
        let tree = BIHTree::with_options(&mesh, BIHOptions::with_max_tris_per_leaf(8)).unwrap();
        let naive_store = TriangleStore::from_mesh(&mesh).unwrap();
        let naive = NaiveCollider::new(&naive_store);

        let world = translate(&Mat4::identity(), &Vec3::new(5.0, -3.0, 2.0));
        let world = rotate(&world, 0.7, &Vec3::new(1.0, 2.0, 0.5).normalize());
        let world = scale(&world, &Vec3::new(2.0, 0.5, 1.5));
        let bound = tree.world_bound(&world);

        let mut num_hits = 0;
        for _ in 0..300 {
            let ray = Collidable::Ray(gen_random_ray(&mut rng, &bound));

            let mut r0 = CollisionResults::new();
            let mut r1 = CollisionResults::new();
            tree.collide_with(&ray, &world, &bound, &mut r0).unwrap();
            Collider::collide_with(&naive, &ray, &world, &bound, &mut r1).unwrap();

            assert_eq!(hit_set(&r0), hit_set(&r1));
            num_hits += r0.len();
        }

        assert!(num_hits > 0);
    }

    #[test]
    fn test_axis_aligned_rays_match_naive() {
        let mesh = cube_grid(64, 2.0);
        let tree = BIHTree::with_options(&mesh, BIHOptions::with_max_tris_per_leaf(4)).unwrap();
        let naive_store = TriangleStore::from_mesh(&mesh).unwrap();
        let naive = NaiveCollider::new(&naive_store);

        let world = Mat4::identity();
        let bound = tree.world_bound(&world);

        let dirs = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ];

        let mut num_hits = 0;
        for i in 0..16 {
            let offset = 0.1 + i as f32 * 0.93;
            for dir in dirs.iter() {
                let start = Vec3::new(8.0, 0.37, 8.0) - dir * 20.0
                    + Vec3::new(dir.z.abs() * offset, 0.0, dir.x.abs() * offset)
                    - Vec3::new(dir.z.abs() * 8.0, 0.0, dir.x.abs() * 8.0);
                let ray = Collidable::Ray(Ray::new(&start, dir));

                let mut r0 = CollisionResults::new();
                let mut r1 = CollisionResults::new();
                tree.collide_with(&ray, &world, &bound, &mut r0).unwrap();
                Collider::collide_with(&naive, &ray, &world, &bound, &mut r1).unwrap();

                assert_eq!(hit_set(&r0), hit_set(&r1));
                num_hits += r0.len();
            }
        }

        assert!(num_hits > 0);
    }

    #[test]
    fn test_sweep_sphere_matches_naive() {
        let mut rng = ChaCha8Rng::seed_from_u64(44);

        let mesh = random_soup(&mut rng, 1500, -15.0..15.0, 2.0);
        let tree = BIHTree::with_options(&mesh, BIHOptions::with_max_tris_per_leaf(6)).unwrap();
        let naive_store = TriangleStore::from_mesh(&mesh).unwrap();
        let naive = NaiveCollider::new(&naive_store);

        let world = translate(&Mat4::identity(), &Vec3::new(-2.0, 1.0, 4.0));
        let world = rotate(&world, 1.1, &Vec3::new(0.0, 1.0, 0.0));
        let bound = tree.world_bound(&world);

        let mut num_hits = 0;
        let mut scratch = QueryScratch::new();
        for _ in 0..200 {
            let center = Vec3::new(
                rng.random_range(bound.min.x..bound.max.x),
                rng.random_range(bound.min.y..bound.max.y),
                rng.random_range(bound.min.z..bound.max.z),
            );
            let velocity = Vec3::new(
                rng.random_range(-4.0..4.0),
                rng.random_range(-4.0..4.0),
                rng.random_range(-4.0..4.0),
            );
            let radius = rng.random_range(0.1..1.5);
            let sphere = SweepSphere::new(center, radius, velocity).unwrap();
            let collidable = Collidable::SweepSphere(sphere);

            let mut r0 = CollisionResults::new();
            let mut r1 = CollisionResults::new();
            tree.collide_with_scratch(&collidable, &world, &bound, &mut r0, &mut scratch)
                .unwrap();
            Collider::collide_with(&naive, &collidable, &world, &bound, &mut r1).unwrap();

            assert_eq!(hit_set(&r0), hit_set(&r1));
            num_hits += r0.len();
        }

        assert!(num_hits > 0);
        assert!(scratch.stats().triangle_tests < 200 * mesh.triangle_count());
    }

    #[test]
    fn test_sweep_sphere_against_cube() {
        let tree = BIHTree::new(&cube_grid(9, 3.0)).unwrap();
        let world = Mat4::identity();
        let bound = tree.world_bound(&world);

        // dropping a sphere onto the center cube at (3, 0, 3)
        let sphere = SweepSphere::new(
            Vec3::new(3.4, 3.0, 3.6),
            0.5,
            Vec3::new(0.0, -4.0, 0.0),
        )
        .unwrap();

        let mut results = CollisionResults::new();
        let n = tree
            .collide_with(&Collidable::SweepSphere(sphere), &world, &bound, &mut results)
            .unwrap();

        assert!(n > 0);
        assert!(results.iter().all(|r| r.triangle_index / 12 == 4));

        // the sphere touches the top face after travelling 1.5 units
        let closest = results.closest().unwrap();
        assert!((closest.distance - 1.5).abs() < 1e-4);
        assert!((closest.contact_normal - Vec3::new(0.0, 1.0, 0.0)).norm() < 1e-4);

        // moving away from the cubes
        let sphere = SweepSphere::new(
            Vec3::new(3.5, 3.0, 3.5),
            0.5,
            Vec3::new(0.0, 4.0, 0.0),
        )
        .unwrap();

        let mut results = CollisionResults::new();
        let n = tree
            .collide_with(&Collidable::SweepSphere(sphere), &world, &bound, &mut results)
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_empty_tree_queries() {
        let tree = BIHTree::new(&Mesh::default()).unwrap();
        let world = Mat4::identity();
        let bound = AABB::new_cube(&Vec3::zeros(), 10.0);

        let mut results = CollisionResults::new();
        let ray = Ray::new(&Vec3::new(0.0, 0.0, -20.0), &Vec3::new(0.0, 0.0, 1.0));
        let n = tree
            .collide_with(&Collidable::Ray(ray), &world, &bound, &mut results)
            .unwrap();

        assert_eq!(n, 0);
        assert!(tree.world_bound(&world).is_empty());
    }

    /// Compares the tree against the naive collider for rays aimed at the given targets.
    fn assert_rays_match_naive(
        mesh: &Mesh,
        max_tris_per_leaf: usize,
        world: &Mat4,
        rays: impl Iterator<Item = Ray>,
    ) -> usize {
        let tree =
            BIHTree::with_options(mesh, BIHOptions::with_max_tris_per_leaf(max_tris_per_leaf))
                .unwrap();
        let naive_store = TriangleStore::from_mesh(mesh).unwrap();
        let naive = NaiveCollider::new(&naive_store);
        let bound = tree.world_bound(world);

        let mut num_hits = 0;
        for ray in rays {
            let ray = Collidable::Ray(ray);

            let mut r0 = CollisionResults::new();
            let mut r1 = CollisionResults::new();
            tree.collide_with(&ray, world, &bound, &mut r0).unwrap();
            Collider::collide_with(&naive, &ray, world, &bound, &mut r1).unwrap();

            assert_eq!(hit_set(&r0), hit_set(&r1));
            num_hits += r0.len();
        }

        num_hits
    }

    #[test]
    fn test_wall_on_bound_face_matches_naive() {
        let mut rng = ChaCha8Rng::seed_from_u64(45);

        // a few small triangles near the origin and a large wall that defines the max x face
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for i in 0..4 {
            let o = Vec3::new(i as f32 * 0.25, i as f32 * 0.5 - 1.0, 0.3 * i as f32);
            let base = vertices.len() as u32;
            vertices.extend([o, o + Vec3::new(0.5, 0.0, 0.0), o + Vec3::new(0.0, 0.5, 0.5)]);
            indices.extend([base, base + 1, base + 2]);
        }

        let base = vertices.len() as u32;
        vertices.extend([
            Vec3::new(10.0, -50.0, -50.0),
            Vec3::new(10.0, 50.0, -50.0),
            Vec3::new(10.0, 50.0, 50.0),
            Vec3::new(10.0, -50.0, 50.0),
        ]);
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        let mesh = Mesh::new(vertices, indices);

        let rays = (0..2000)
            .map(|_| {
                let start = Vec3::new(
                    rng.random_range(-7f32..-1.0),
                    rng.random_range(-20f32..20.0),
                    rng.random_range(-20f32..20.0),
                );
                let target = Vec3::new(
                    10.0,
                    rng.random_range(-40f32..40.0),
                    rng.random_range(-40f32..40.0),
                );
                Ray::from_pos(&start, &target)
            })
            .collect::<Vec<Ray>>();

        let num_hits = assert_rays_match_naive(&mesh, 1, &Mat4::identity(), rays.into_iter());

        // every ray is aimed at the wall
        assert!(num_hits > 1900);
    }

    #[test]
    fn test_oblique_rays_at_cube_faces_match_naive() {
        let mut rng = ChaCha8Rng::seed_from_u64(46);

        let count = 36;
        let mesh = cube_grid(count, 2.0);

        let world = translate(&Mat4::identity(), &Vec3::new(3.0, -7.0, 1.5));
        let world = rotate(&world, 0.9, &Vec3::new(0.3, 1.0, -0.4).normalize());
        let world = scale(&world, &Vec3::new(1.7, 0.6, 2.3));

        let world_bound = BIHTree::new(&mesh).unwrap().world_bound(&world);
        let center = world_bound.get_center();
        let size = world_bound.get_size().norm();

        let rays = (0..1500)
            .map(|_| {
                // a point on a face of a random cube, the faces lie on the split planes
                let min = cube_grid_cell(count, 2.0, rng.random_range(0..count));
                let axis = rng.random_range(0..3);
                let mut target = min
                    + Vec3::new(
                        rng.random_range(0f32..1.0),
                        rng.random_range(0f32..1.0),
                        rng.random_range(0f32..1.0),
                    );
                target[axis] = min[axis] + if rng.random_bool(0.5) { 1.0 } else { 0.0 };
                let target = transform_vec3(&world, &target);

                let dir = Vec3::new(
                    rng.random_range(-1f32..1.0),
                    rng.random_range(-1f32..1.0),
                    rng.random_range(-1f32..1.0),
                );
                let start = center + dir.normalize() * size;
                Ray::from_pos(&start, &target)
            })
            .collect::<Vec<Ray>>();

        let num_hits = assert_rays_match_naive(&mesh, 2, &world, rays.into_iter());
        assert!(num_hits > 1000);
    }
}
