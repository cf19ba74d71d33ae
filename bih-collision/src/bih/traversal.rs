use nalgebra_glm::{Mat4, Vec3};

use crate::{
    collision::{CollisionResult, CollisionResults},
    math::{
        sweep_sphere_triangle, transform_dir, transform_vec3, triangle_ray, Plane, Ray,
        SweepSphere, AABB,
    },
};

use super::{BIHNode, BIHTree};

/// Counters collected while traversing the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// The number of visited nodes.
    pub nodes_visited: usize,

    /// The number of exact triangle tests, i.e., triangles that could not be avoided.
    pub triangle_tests: usize,
}

impl std::ops::AddAssign<Self> for QueryStats {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes_visited += rhs.nodes_visited;
        self.triangle_tests += rhs.triangle_tests;
    }
}

#[derive(Debug, Clone, Copy)]
struct StackEntry {
    node: usize,
    t_min: f32,
    t_max: f32,
}

/// Scratch memory for tree traversals. Owned by the caller, so a tree can be queried from
/// several threads at once with one scratch per thread.
#[derive(Debug, Default)]
pub struct QueryScratch {
    stack: Vec<StackEntry>,
    stats: QueryStats,
}

impl QueryScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accumulated stats of all queries run with this scratch.
    #[inline]
    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }
}

/// Tests the world space ray against the world space triangle.
pub(crate) fn ray_triangle_contact(
    ray: &Ray,
    triangle: &[Vec3; 3],
    triangle_index: usize,
) -> Option<CollisionResult> {
    let [p0, p1, p2] = triangle;
    let t = triangle_ray(p0, p1, p2, ray, None)?;

    Some(CollisionResult {
        distance: t,
        contact_point: ray.point_at(t),
        contact_normal: Plane::from_triangle(p0, p1, p2).n,
        triangle_index,
    })
}

/// Tests the world space swept sphere against the world space triangle.
pub(crate) fn sweep_triangle_contact(
    sphere: &SweepSphere,
    triangle: &[Vec3; 3],
    triangle_index: usize,
) -> Option<CollisionResult> {
    let [p0, p1, p2] = triangle;
    let contact = sweep_sphere_triangle(sphere, p0, p1, p2)?;

    Some(CollisionResult {
        distance: contact.t * sphere.velocity.norm(),
        contact_point: contact.point,
        contact_normal: contact.normal,
        triangle_index,
    })
}

/// Returns the triangle in the given slot transformed into world space.
#[inline]
fn world_triangle(tree: &BIHTree, slot: usize, world_matrix: &Mat4) -> [Vec3; 3] {
    tree.store()
        .get_triangle(slot)
        .map(|p| transform_vec3(world_matrix, &p))
}

/// Relative tolerance of the plane tests. Split distances are computed in model space while the
/// hits are computed in world space, so both may differ by a few ulps for triangles lying on a
/// split plane or on a face of the world bound.
const PLANE_EPSILON: f32 = 1e-5;

/// Returns the rounding slack of a coordinate compared against the given plane.
#[inline]
fn plane_slack(plane: f32, coordinate: f32) -> f32 {
    PLANE_EPSILON * (plane.abs() + coordinate.abs() + 1f32)
}

/// Returns which children of a node are overlapped by the closed interval [min, max] along the
/// node axis.
#[inline]
fn overlapped_children(min: f32, max: f32, left_plane: f32, right_plane: f32) -> (bool, bool) {
    (min <= left_plane, max >= right_plane)
}

/// Intersects the ray with the tree and appends all hits to the results. Returns the number of
/// hits.
///
/// # Arguments
/// * `tree` - The tree to traverse.
/// * `ray` - The ray in world space.
/// * `world_matrix` - The transformation from model into world space.
/// * `inv_world_matrix` - The inverse of the world matrix.
/// * `t_min` - The start of the ray interval to search in.
/// * `t_max` - The end of the ray interval to search in.
/// * `results` - The collector for the hits.
/// * `scratch` - The traversal scratch memory.
#[allow(clippy::too_many_arguments)]
pub(crate) fn intersect_ray(
    tree: &BIHTree,
    ray: &Ray,
    world_matrix: &Mat4,
    inv_world_matrix: &Mat4,
    t_min: f32,
    t_max: f32,
    results: &mut CollisionResults,
    scratch: &mut QueryScratch,
) -> usize {
    let nodes = tree.nodes();
    if nodes.is_empty() {
        return 0;
    }

    // The direction is not normalized, so the ray parameter is the same in both spaces.
    let origin = transform_vec3(inv_world_matrix, &ray.pos);
    let dir = transform_dir(inv_world_matrix, &ray.dir);
    let inv_dir = Vec3::new(1f32 / dir.x, 1f32 / dir.y, 1f32 / dir.z);

    let mut count = 0;
    scratch.stack.clear();
    scratch.stack.push(StackEntry {
        node: 0,
        t_min: t_min - plane_slack(t_min, 0f32),
        t_max: t_max + plane_slack(t_max, 0f32),
    });

    'stack: while let Some(entry) = scratch.stack.pop() {
        let mut node = entry.node;
        let mut t_min = entry.t_min;
        let mut t_max = entry.t_max;

        if t_min > t_max {
            continue;
        }

        loop {
            scratch.stats.nodes_visited += 1;

            let (axis, left_plane, right_plane, left, right) = match nodes[node] {
                BIHNode::Leaf { left, right } => {
                    for slot in left as usize..=right as usize {
                        scratch.stats.triangle_tests += 1;

                        let triangle = world_triangle(tree, slot, world_matrix);
                        let triangle_index = tree.store().original_index(slot);
                        if let Some(result) = ray_triangle_contact(ray, &triangle, triangle_index) {
                            results.add(result);
                            count += 1;
                        }
                    }

                    continue 'stack;
                }
                BIHNode::Internal {
                    axis,
                    left_plane,
                    right_plane,
                    left,
                    right,
                } => (axis.index(), left_plane, right_plane, left as usize, right as usize),
            };

            // parallel to the split axis, the interval stays the same
            if !inv_dir[axis].is_finite() {
                let o = origin[axis];
                let slack = plane_slack(left_plane.abs().max(right_plane.abs()), o);
                node = match overlapped_children(o - slack, o + slack, left_plane, right_plane) {
                    (true, true) => {
                        scratch.stack.push(StackEntry {
                            node: right,
                            t_min,
                            t_max,
                        });
                        left
                    }
                    (true, false) => left,
                    (false, true) => right,
                    (false, false) => continue 'stack,
                };

                continue;
            }

            // the near child ends a bit behind its plane and the far child starts a bit before
            let o = origin[axis];
            let inv = inv_dir[axis];
            let left_slack = plane_slack(left_plane, o) * inv.abs();
            let right_slack = plane_slack(right_plane, o) * inv.abs();

            let (t_near_split, t_far_split, near, far) = if inv < 0f32 {
                (
                    (right_plane - o) * inv + right_slack,
                    (left_plane - o) * inv - left_slack,
                    right,
                    left,
                )
            } else {
                (
                    (left_plane - o) * inv + left_slack,
                    (right_plane - o) * inv - right_slack,
                    left,
                    right,
                )
            };

            if t_min > t_near_split && t_max < t_far_split {
                continue 'stack;
            }

            if t_min > t_near_split {
                t_min = t_min.max(t_far_split);
                node = far;
            } else if t_max < t_far_split {
                t_max = t_max.min(t_near_split);
                node = near;
            } else {
                scratch.stack.push(StackEntry {
                    node: far,
                    t_min: t_min.max(t_far_split),
                    t_max,
                });

                t_max = t_max.min(t_near_split);
                node = near;
            }
        }
    }

    count
}

/// Intersects the swept sphere with the tree and appends all contacts to the results. Returns
/// the number of contacts.
///
/// # Arguments
/// * `tree` - The tree to traverse.
/// * `sphere` - The swept sphere in world space.
/// * `model_box` - The volume covered by the sphere movement in model space.
/// * `world_matrix` - The transformation from model into world space.
/// * `results` - The collector for the contacts.
/// * `scratch` - The traversal scratch memory.
pub(crate) fn intersect_sweep(
    tree: &BIHTree,
    sphere: &SweepSphere,
    model_box: &AABB,
    world_matrix: &Mat4,
    results: &mut CollisionResults,
    scratch: &mut QueryScratch,
) -> usize {
    let nodes = tree.nodes();
    if nodes.is_empty() {
        return 0;
    }

    let mut count = 0;
    scratch.stack.clear();
    scratch.stack.push(StackEntry {
        node: 0,
        t_min: 0f32,
        t_max: 0f32,
    });

    'stack: while let Some(entry) = scratch.stack.pop() {
        let mut node = entry.node;

        loop {
            scratch.stats.nodes_visited += 1;

            match nodes[node] {
                BIHNode::Leaf { left, right } => {
                    for slot in left as usize..=right as usize {
                        scratch.stats.triangle_tests += 1;

                        let triangle = world_triangle(tree, slot, world_matrix);
                        let triangle_index = tree.store().original_index(slot);
                        if let Some(result) =
                            sweep_triangle_contact(sphere, &triangle, triangle_index)
                        {
                            results.add(result);
                            count += 1;
                        }
                    }

                    continue 'stack;
                }
                BIHNode::Internal {
                    axis,
                    left_plane,
                    right_plane,
                    left,
                    right,
                } => {
                    let a = axis.index();
                    let (left, right) = (left as usize, right as usize);
                    let (min, max) = (model_box.min[a], model_box.max[a]);

                    node = match overlapped_children(
                        min - plane_slack(left_plane, min),
                        max + plane_slack(right_plane, max),
                        left_plane,
                        right_plane,
                    ) {
                        (true, true) => {
                            scratch.stack.push(StackEntry {
                                node: right,
                                t_min: 0f32,
                                t_max: 0f32,
                            });
                            left
                        }
                        (true, false) => left,
                        (false, true) => right,
                        (false, false) => continue 'stack,
                    };
                }
            }
        }
    }

    count
}
