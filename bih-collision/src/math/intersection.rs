use nalgebra_glm::Vec3;

use super::{Plane, Ray, AABB};

/// Determines the intersection between the given triangle and ray. If there is an intersection it
/// returned the coefficient f that defines the intersection point along the given ray.
/// That is, ray.pos + f * ray.dir is the intersection point
///
/// # Arguments
/// * `p0` - The first vertex of the triangle.
/// * `p1` - The second vertex of the triangle.
/// * `p2` - The third vertex of the triangle.
/// * `ray` - The ray to compute the intersection with.
/// * `max_f` - Optionally, the maximum value for f. If the intersection point is further away
///             than max_f, None is returned.
pub fn triangle_ray(p0: &Vec3, p1: &Vec3, p2: &Vec3, ray: &Ray, max_f: Option<f32>) -> Option<f32> {
    // compute intersection point with the plane of the triangle and the given ray
    let plane = Plane::from_triangle(p0, p1, p2);
    let lambda = match plane_ray(&plane, ray) {
        Some(lambda) => lambda,
        None => {
            return None;
        }
    };

    if let Some(max_f) = max_f {
        if lambda > max_f {
            return None;
        }
    }

    let pos0: Vec3 = ray.pos + lambda * ray.dir;

    // check if the intersection is located inside the triangle
    // see: https://www.scratchapixel.com/lessons/3d-basic-rendering/ray-tracing-rendering-a-triangle/ray-triangle-intersection-geometric-solution.html
    let edge0: Vec3 = p1 - p0;
    let edge1: Vec3 = p2 - p1;
    let edge2: Vec3 = p0 - p2;
    let c0: Vec3 = pos0 - p0;
    let c1: Vec3 = pos0 - p1;
    let c2: Vec3 = pos0 - p2;

    // check if the intersection point is inside the triangle.
    if plane.n.dot(&edge0.cross(&c0)) > 0f32
        && plane.n.dot(&edge1.cross(&c1)) > 0f32
        && plane.n.dot(&edge2.cross(&c2)) > 0f32
    {
        Some(lambda)
    } else {
        None
    }
}

/// Determines the intersection between the given plane and ray. If there is an intersection it
/// returned the coefficient a that defines the intersection point along the given ray.
/// That is, ray.pos + a * ray.dir is the intersection point
///
/// # Arguments
/// * `plane` - The plane to compute the intersection with.
/// * `ray` - The ray to compute the intersection with.
pub fn plane_ray(plane: &Plane, ray: &Ray) -> Option<f32> {
    let a = plane.n.dot(&ray.dir);
    if a == 0f32 {
        return None;
    }

    let lambda = -(plane.d + plane.n.dot(&ray.pos)) / a;
    if lambda < 0f32 {
        None
    } else {
        Some(lambda)
    }
}

/// Determines the parametric interval in which the given ray is located inside the given AABB.
/// The returned tuple (t_near, t_far) defines the entry and exit point along the ray, i.e.,
/// ray.pos + t_near * ray.dir and ray.pos + t_far * ray.dir. The entry value is negative if the
/// ray starts inside the AABB. Returns None if the ray misses the AABB or the AABB lies behind
/// the ray.
///
/// # Arguments
/// * `aabb` - The AABB to compute the intersection with.
/// * `ray` - The ray to compute the intersection with.
pub fn aabb_ray_interval(aabb: &AABB, ray: &Ray) -> Option<(f32, f32)> {
    if aabb.is_empty() {
        return None;
    }

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    // we iterate over each axis and determine the intersection point with the AABB
    for axis in 0..3 {
        // If the ray is parallel to the plane we check if the ray is inside the AABB.
        // If the ray is not inside the AABB we return None, because the ray does cannot intersect.
        if ray.dir[axis] == 0f32 {
            if ray.pos[axis] < aabb.min[axis] || ray.pos[axis] > aabb.max[axis] {
                return None;
            }

            continue;
        }

        let t0 = (aabb.min[axis] - ray.pos[axis]) / ray.dir[axis];
        let t1 = (aabb.max[axis] - ray.pos[axis]) / ray.dir[axis];

        t_min = t_min.max(t0.min(t1));
        t_max = t_max.min(t0.max(t1));

        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0f32 {
        None
    } else {
        Some((t_min, t_max))
    }
}

/// Determines the intersection between the given AABB and ray. If there is an intersection it
/// returned the coefficient f that defines the intersection point along the given ray.
/// That is, ray.pos + f * ray.dir is the intersection point
///
/// # Arguments
/// * `aabb` - The AABB to compute the intersection with.
/// * `ray` - The ray to compute the intersection with.
/// * `max_f` - Optionally, the maximum value for f. If the intersection point is further away
///             than max_f, None is returned.
pub fn aabb_ray(aabb: &AABB, ray: &Ray, max_f: Option<f32>) -> Option<f32> {
    let (t_near, _) = aabb_ray_interval(aabb, ray)?;
    let t = t_near.max(0f32);

    match max_f {
        Some(max_f) if t > max_f => None,
        _ => Some(t),
    }
}
