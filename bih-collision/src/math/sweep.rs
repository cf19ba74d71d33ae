use nalgebra_glm::Vec3;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

use super::{Plane, AABB};

/// A sphere that moves along its velocity during a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSphere {
    /// The center of the sphere at the start of the movement.
    pub center: Vec3,

    /// The radius of the sphere.
    pub radius: f32,

    /// The displacement of the sphere during the movement.
    pub velocity: Vec3,
}

/// The first contact of a swept sphere with some geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepContact {
    /// The time of impact between 0 (start) and 1 (end of the movement).
    pub t: f32,

    /// The point at which the sphere touches the geometry.
    pub point: Vec3,

    /// The normal at the contact point, pointing from the geometry towards the sphere center.
    pub normal: Vec3,
}

impl SweepSphere {
    /// Creates a new swept sphere.
    ///
    /// # Arguments
    /// * `center` - The center of the sphere at the start of the movement.
    /// * `radius` - The radius of the sphere. Must be positive.
    /// * `velocity` - The displacement of the sphere during the movement.
    pub fn new(center: Vec3, radius: f32, velocity: Vec3) -> Result<Self> {
        if !(radius > 0f32 && radius.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "The radius of a swept sphere must be positive and finite, got {}",
                radius
            )));
        }

        Ok(Self {
            center,
            radius,
            velocity,
        })
    }

    /// Returns the center of the sphere at the given time between 0 and 1.
    #[inline]
    pub fn center_at(&self, t: f32) -> Vec3 {
        self.center + self.velocity * t
    }

    /// Returns the volume covered by the sphere during its whole movement.
    pub fn motion_box(&self) -> AABB {
        let mut aabb = AABB::new();
        aabb.extend_pos(&self.center);
        aabb.extend_pos(&self.center_at(1f32));
        aabb.grow(self.radius);

        aabb
    }
}

/// Returns the lowest root of a*x^2 + b*x + c = 0 that lies inside [0, max_root].
fn lowest_root(a: f32, b: f32, c: f32, max_root: f32) -> Option<f32> {
    if a == 0f32 {
        return None;
    }

    let det = b * b - 4f32 * a * c;
    if det < 0f32 || !det.is_finite() {
        return None;
    }

    let sqrt_det = det.sqrt();
    let mut r1 = (-b - sqrt_det) / (2f32 * a);
    let mut r2 = (-b + sqrt_det) / (2f32 * a);
    if r1 > r2 {
        std::mem::swap(&mut r1, &mut r2);
    }

    if r1 >= 0f32 && r1 <= max_root {
        Some(r1)
    } else if r2 >= 0f32 && r2 <= max_root {
        Some(r2)
    } else {
        None
    }
}

/// Returns true if p lies inside the triangle (p0, p1, p2). The point is assumed to lie in the
/// plane of the triangle; points on the border count as inside.
fn point_in_triangle(p: &Vec3, p0: &Vec3, p1: &Vec3, p2: &Vec3) -> bool {
    let n = (p1 - p0).cross(&(p2 - p0));

    n.dot(&(p1 - p0).cross(&(p - p0))) >= 0f32
        && n.dot(&(p2 - p1).cross(&(p - p1))) >= 0f32
        && n.dot(&(p0 - p2).cross(&(p - p2))) >= 0f32
}

/// Returns the point on the segment (a, b) that is closest to p.
fn closest_point_on_segment(p: &Vec3, a: &Vec3, b: &Vec3) -> Vec3 {
    let edge = b - a;
    let edge_sq = edge.norm_squared();
    if edge_sq == 0f32 {
        return *a;
    }

    let f = (edge.dot(&(p - a)) / edge_sq).clamp(0f32, 1f32);
    a + edge * f
}

/// Determines the first contact between the given swept sphere and triangle. The computation is
/// done in the space of the unit sphere, i.e., everything is scaled by the inverse radius.
///
/// # Arguments
/// * `sphere` - The moving sphere.
/// * `p0` - The first vertex of the triangle.
/// * `p1` - The second vertex of the triangle.
/// * `p2` - The third vertex of the triangle.
pub fn sweep_sphere_triangle(
    sphere: &SweepSphere,
    p0: &Vec3,
    p1: &Vec3,
    p2: &Vec3,
) -> Option<SweepContact> {
    let inv_radius = 1f32 / sphere.radius;
    let base = sphere.center * inv_radius;
    let velocity = sphere.velocity * inv_radius;
    let p0 = p0 * inv_radius;
    let p1 = p1 * inv_radius;
    let p2 = p2 * inv_radius;

    let mut plane = Plane::from_triangle(&p0, &p1, &p2);
    if !plane.is_valid() {
        return None;
    }

    // triangles are two-sided, so we always look at the side the sphere starts on
    if plane.signed_distance(&base) < 0f32 {
        plane = plane.flipped();
    }

    let signed_distance = plane.signed_distance(&base);
    let normal_dot_velocity = plane.n.dot(&velocity);

    let mut found: Option<(f32, Vec3)> = None;

    if normal_dot_velocity == 0f32 {
        if signed_distance >= 1f32 {
            return None;
        }

        // moving parallel to the plane while touching it
        let projected = base - plane.n * signed_distance;
        if point_in_triangle(&projected, &p0, &p1, &p2) {
            found = Some((0f32, projected));
        }
    } else {
        let mut t0 = (1f32 - signed_distance) / normal_dot_velocity;
        let mut t1 = (-1f32 - signed_distance) / normal_dot_velocity;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        if t0 > 1f32 || t1 < 0f32 {
            return None;
        }

        let t0 = t0.max(0f32);
        let center = base + velocity * t0;
        let plane_point = center - plane.n * plane.signed_distance(&center);
        if point_in_triangle(&plane_point, &p0, &p1, &p2) {
            found = Some((t0, plane_point));
        }
    }

    // already overlapping an edge or a vertex at the start
    if found.is_none() {
        found = [(&p0, &p1), (&p1, &p2), (&p2, &p0)]
            .into_iter()
            .map(|(a, b)| closest_point_on_segment(&base, a, b))
            .filter(|p| (p - base).norm_squared() <= 1f32)
            .min_by(|p, q| (p - base).norm_squared().total_cmp(&(q - base).norm_squared()))
            .map(|p| (0f32, p));
    }

    let velocity_sq = velocity.norm_squared();
    if found.is_none() && velocity_sq > 0f32 {
        let mut t = 1f32;

        // vertices
        for p in [&p0, &p1, &p2] {
            let b = 2f32 * velocity.dot(&(base - p));
            let c = (p - base).norm_squared() - 1f32;
            if let Some(root) = lowest_root(velocity_sq, b, c, t) {
                t = root;
                found = Some((root, *p));
            }
        }

        // edges
        for (a, b) in [(&p0, &p1), (&p1, &p2), (&p2, &p0)] {
            let edge = b - a;
            let base_to_vertex = a - base;
            let edge_sq = edge.norm_squared();
            let edge_dot_velocity = edge.dot(&velocity);
            let edge_dot_base_to_vertex = edge.dot(&base_to_vertex);

            let qa = edge_sq * -velocity_sq + edge_dot_velocity * edge_dot_velocity;
            let qb = edge_sq * (2f32 * velocity.dot(&base_to_vertex))
                - 2f32 * edge_dot_velocity * edge_dot_base_to_vertex;
            let qc = edge_sq * (1f32 - base_to_vertex.norm_squared())
                + edge_dot_base_to_vertex * edge_dot_base_to_vertex;

            if let Some(root) = lowest_root(qa, qb, qc, t) {
                let f = (edge_dot_velocity * root - edge_dot_base_to_vertex) / edge_sq;
                if (0f32..=1f32).contains(&f) {
                    t = root;
                    found = Some((root, a + edge * f));
                }
            }
        }
    }

    found.map(|(t, point)| {
        let center = base + velocity * t;
        let to_center = center - point;
        let length = to_center.norm();
        let normal = if length > 1e-6 {
            to_center / length
        } else {
            plane.n
        };

        SweepContact {
            t,
            point: point * sphere.radius,
            normal,
        }
    })
}
