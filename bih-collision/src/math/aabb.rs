use std::fmt;
use std::fmt::Display;

use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

use super::transform_vec3;

/// An AABB bounding volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// the corner with the lower coordinates
    pub min: glm::Vec3,
    /// the corner with the upper coordinates
    pub max: glm::Vec3,
}

impl AABB {
    /// Creates a new empty bounding volume
    pub fn new() -> Self {
        let min = glm::vec3(f32::MAX, f32::MAX, f32::MAX);
        let max = glm::vec3(f32::MIN, f32::MIN, f32::MIN);

        AABB { min, max }
    }

    /// Creates a new bounding volume spanned by the two given corners.
    ///
    /// # Arguments
    /// * `min` - The corner with the lower coordinates.
    /// * `max` - The corner with the upper coordinates.
    pub fn from_min_max(min: glm::Vec3, max: glm::Vec3) -> Self {
        AABB { min, max }
    }

    /// Creates a new bounding volume from the given iterator of vec3 positions.
    ///
    /// # Arguments
    /// * `positions` - The iterator of vec3 positions to create the bounding volume from.
    pub fn from_iter<I>(positions: I) -> Self
    where
        I: Iterator<Item = glm::Vec3>,
    {
        let mut result = AABB::new();

        result.extend_iter(positions);

        result
    }

    /// Creates a new cubic bounding volume with the specified center and size.
    ///
    /// # Arguments
    /// * `center` - The center of the AABB bounding volume.
    /// * `size` - The edge length of the cubic bounding volume.
    pub fn new_cube(center: &glm::Vec3, size: f32) -> Self {
        let half_size = size / 2f32;

        let mut result = AABB::new();
        result.min = *center - glm::vec3(half_size, half_size, half_size);
        result.max = *center + glm::vec3(half_size, half_size, half_size);

        result
    }

    /// Returns true if the bbox is empty and false otherwise.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extends the bounding volume with the given position
    ///
    ///* `p` - The position about which the volume is extended
    pub fn extend_pos(&mut self, p: &glm::Vec3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);

        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Extends the bounding volume from the given iterator of vec3 positions.
    pub fn extend_iter<I>(&mut self, positions: I)
    where
        I: Iterator<Item = glm::Vec3>,
    {
        positions.for_each(|p| self.extend_pos(&p))
    }

    /// Grows the bounding volume by the given amount into every direction.
    pub fn grow(&mut self, amount: f32) {
        let d = glm::vec3(amount, amount, amount);
        self.min -= d;
        self.max += d;
    }

    /// Computes and returns the bounding box center
    #[inline]
    pub fn get_center(&self) -> glm::Vec3 {
        (self.min + self.max) / 2.0
    }

    /// Computes and returns the bounding box size
    #[inline]
    pub fn get_size(&self) -> glm::Vec3 {
        self.max - self.min
    }

    /// Returns a copy of the volume whose minimum along the given axis is replaced by value.
    #[inline]
    pub fn with_min_at(&self, axis: usize, value: f32) -> Self {
        let mut result = *self;
        result.min[axis] = value;
        result
    }

    /// Returns a copy of the volume whose maximum along the given axis is replaced by value.
    #[inline]
    pub fn with_max_at(&self, axis: usize, value: f32) -> Self {
        let mut result = *self;
        result.max[axis] = value;
        result
    }

    /// Returns the i-th of the eight corners of the volume. Bit k of i selects max for axis k.
    ///
    /// # Arguments
    /// * `i` - The index of the corner to return.
    #[inline]
    pub fn corner(&self, i: usize) -> glm::Vec3 {
        assert!(i < 8);

        glm::vec3(
            if i & 1 == 0 { self.min.x } else { self.max.x },
            if i & 2 == 0 { self.min.y } else { self.max.y },
            if i & 4 == 0 { self.min.z } else { self.max.z },
        )
    }

    /// Returns the volume enclosing this volume after transforming it with the given matrix.
    ///
    /// # Arguments
    /// * `t` - The 4x4 homogenous transformation matrix.
    pub fn transformed(&self, t: &glm::Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }

        AABB::from_iter((0..8).map(|i| transform_vec3(t, &self.corner(i))))
    }

    #[inline]
    pub fn contains_point(&self, p: &glm::Vec3) -> bool {
        self.min[0] <= p[0]
            && p[0] <= self.max[0]
            && self.min[1] <= p[1]
            && p[1] <= self.max[1]
            && self.min[2] <= p[2]
            && p[2] <= self.max[2]
    }

    /// Returns true if both volumes overlap. Touching volumes count as overlapping.
    #[inline]
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.min[0] <= aabb.max[0]
            && aabb.min[0] <= self.max[0]
            && self.min[1] <= aabb.max[1]
            && aabb.min[1] <= self.max[1]
            && self.min[2] <= aabb.max[2]
            && aabb.min[2] <= self.max[2]
    }
}

impl Default for AABB {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn vec3_to_string(f: &mut fmt::Formatter<'_>, v: &glm::Vec3) -> fmt::Result {
    write!(f, "({}, {}, {})", v[0], v[1], v[2])
}

impl Display for AABB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        vec3_to_string(f, &self.min)?;
        write!(f, "-")?;
        vec3_to_string(f, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_intersects_aabb() {
        let a = AABB::new_cube(&glm::vec3(0.0, 0.0, 0.0), 2.0);

        assert!(a.intersects_aabb(&AABB::new_cube(&glm::vec3(1.5, 0.0, 0.0), 2.0)));
        assert!(a.intersects_aabb(&AABB::new_cube(&glm::vec3(2.0, 0.0, 0.0), 2.0)));
        assert!(!a.intersects_aabb(&AABB::new_cube(&glm::vec3(2.5, 0.0, 0.0), 2.0)));
        assert!(!a.intersects_aabb(&AABB::new_cube(&glm::vec3(0.0, -3.0, 0.0), 2.0)));
        assert!(!a.intersects_aabb(&AABB::new()));
    }

    #[test]
    fn test_transformed() {
        let a = AABB::from_min_max(glm::vec3(0.0, 0.0, 0.0), glm::vec3(1.0, 2.0, 3.0));

        let t = glm::translate(&glm::Mat4::identity(), &glm::vec3(1.0, 1.0, 1.0));
        let b = a.transformed(&t);
        assert_eq!(b.min, glm::vec3(1.0, 1.0, 1.0));
        assert_eq!(b.max, glm::vec3(2.0, 3.0, 4.0));

        let t = glm::scale(&glm::Mat4::identity(), &glm::vec3(-2.0, 1.0, 1.0));
        let b = a.transformed(&t);
        assert_eq!(b.min, glm::vec3(-2.0, 0.0, 0.0));
        assert_eq!(b.max, glm::vec3(0.0, 2.0, 3.0));

        assert!(AABB::new().transformed(&t).is_empty());
    }

    #[test]
    fn test_with_min_max_at() {
        let a = AABB::new_cube(&glm::vec3(0.0, 0.0, 0.0), 2.0);

        let l = a.with_max_at(1, 0.25);
        assert_eq!(l.max, glm::vec3(1.0, 0.25, 1.0));
        assert_eq!(l.min, a.min);

        let r = a.with_min_at(2, -0.5);
        assert_eq!(r.min, glm::vec3(-1.0, -1.0, -0.5));
        assert_eq!(r.max, a.max);
    }
}
