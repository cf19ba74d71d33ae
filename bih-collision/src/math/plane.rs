use nalgebra_glm::Vec3;

pub struct Plane {
    pub d: f32,
    pub n: Vec3,
}

impl Plane {
    /// Creates a plane spanned by the two given basis vectors and moved to the position.
    ///
    /// # Argument
    /// * `pos` - A position on the plane.
    /// * `b0` - The first basis vector that spans the plane.
    /// * `b1` - The second basis vector that spans the plane.
    pub fn from_basis(pos: &Vec3, b0: &Vec3, b1: &Vec3) -> Self {
        let n = b0.cross(b1).normalize();
        let d = -n.dot(pos);

        Self { d, n }
    }

    /// Creates a plane spanned by the given triangle.
    ///
    /// # Argument
    /// * `p0` - The first vertex of the triangle.
    /// * `p1` - The second vertex of the triangle.
    /// * `p2` - The third vertex of the triangle.
    pub fn from_triangle(p0: &Vec3, p1: &Vec3, p2: &Vec3) -> Self {
        let b0 = p1 - p0;
        let b1 = p2 - p0;
        Self::from_basis(p0, &b0, &b1)
    }

    /// Returns true if the normal is finite, i.e., the plane was not created from a degenerated
    /// triangle.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.n.iter().all(|v| v.is_finite()) && self.d.is_finite()
    }

    /// Returns the same plane with the normal pointing into the opposite direction.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            d: -self.d,
            n: -self.n,
        }
    }

    /// Returns the signed distance, i.e., the distance between the plane and the point that can
    /// be negative or positive.
    ///
    /// # Arguments
    /// * `p` - The point to which the signed distance will be computed.
    #[inline]
    pub fn signed_distance(&self, p: &Vec3) -> f32 {
        self.n.dot(p) + self.d
    }
}
