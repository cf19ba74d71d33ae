mod aabb;
mod intersection;
mod plane;
mod ray;
mod sweep;

pub use aabb::*;
pub use intersection::*;
pub use plane::*;
pub use ray::*;
pub use sweep::*;

use nalgebra_glm::{vec4_to_vec3, Mat4, Vec3, Vec4};

/// Transforms the given vec3 with the given homogenous transformation matrix and returns the
/// transformed vec3.
///
/// # Arguments
/// * `t` - The 4x4 homogenous transformation matrix.
/// * `p` - The 3D vector to transform.
#[inline]
pub fn transform_vec3(t: &Mat4, p: &Vec3) -> Vec3 {
    let p = t * Vec4::new(p[0], p[1], p[2], 1f32);
    vec4_to_vec3(&p) / p[3]
}

/// Transforms the given direction with the linear part of the given matrix, i.e., the
/// translation is ignored and the result is not normalized.
///
/// # Arguments
/// * `t` - The 4x4 homogenous transformation matrix.
/// * `d` - The direction to transform.
#[inline]
pub fn transform_dir(t: &Mat4, d: &Vec3) -> Vec3 {
    let d = t * Vec4::new(d[0], d[1], d[2], 0f32);
    vec4_to_vec3(&d)
}
