//! Core constants and shared vector primitives for the shell theorem workspace.

/// Physical constants expressed in SI units.
pub mod constants {
    /// Universal gravitational constant (m³ kg⁻¹ s⁻²).
    pub const G: f64 = 6.674_08e-11;
}

/// Free vectors and positions in 3-space.
///
/// `Vector3` and `Point3` share the same componentwise arithmetic, but the
/// operators only allow combinations that make geometric sense: subtracting
/// two points yields the displacement `Vector3`, and a point can be offset by
/// a vector, while two points cannot be added.
pub mod vector {
    use std::fmt;
    use std::iter::Sum;
    use std::ops::{Add, Mul, Neg, Sub};

    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    /// Raised when a direction is requested from a vector with no usable length.
    #[derive(Debug, Clone, Copy, PartialEq, Error)]
    #[error("cannot normalize vector {vector} with length {length}")]
    pub struct DegenerateVectorError {
        pub vector: Vector3,
        pub length: f64,
    }

    /// A free vector (direction and magnitude, no position).
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Vector3 {
        pub x: f64,
        pub y: f64,
        pub z: f64,
    }

    /// A position in 3-space.
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Point3 {
        pub x: f64,
        pub y: f64,
        pub z: f64,
    }

    impl Vector3 {
        pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

        pub const fn new(x: f64, y: f64, z: f64) -> Self {
            Self { x, y, z }
        }

        /// Euclidean norm.
        #[inline]
        pub fn length(&self) -> f64 {
            self.dot(self).sqrt()
        }

        /// Squared norm, avoiding the square root when only comparisons are needed.
        #[inline]
        pub fn length_squared(&self) -> f64 {
            self.dot(self)
        }

        #[inline]
        pub fn dot(&self, other: &Vector3) -> f64 {
            self.x * other.x + self.y * other.y + self.z * other.z
        }

        /// Unit vector with the same direction.
        ///
        /// Fails for the zero vector and for vectors whose length is not finite,
        /// since neither has a meaningful direction.
        pub fn normalize(&self) -> Result<Vector3, DegenerateVectorError> {
            let length = self.length();
            if length == 0.0 || !length.is_finite() {
                return Err(DegenerateVectorError {
                    vector: *self,
                    length,
                });
            }
            Ok(self.scale(1.0 / length))
        }

        /// Componentwise sum; also available as `+`.
        #[inline]
        pub fn plus(&self, other: &Vector3) -> Vector3 {
            Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
        }

        #[inline]
        pub fn subtract(&self, other: &Vector3) -> Vector3 {
            Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
        }

        #[inline]
        pub fn scale(&self, s: f64) -> Vector3 {
            Vector3::new(self.x * s, self.y * s, self.z * s)
        }

        pub fn is_finite(&self) -> bool {
            self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
        }

        /// Reinterpret as the point reached from the origin.
        pub fn to_point(self) -> Point3 {
            Point3::new(self.x, self.y, self.z)
        }

        pub fn to_array(self) -> [f64; 3] {
            [self.x, self.y, self.z]
        }
    }

    impl Point3 {
        pub const ORIGIN: Point3 = Point3::new(0.0, 0.0, 0.0);

        pub const fn new(x: f64, y: f64, z: f64) -> Self {
            Self { x, y, z }
        }

        /// Vector from the origin to this point.
        pub fn to_vector(self) -> Vector3 {
            Vector3::new(self.x, self.y, self.z)
        }

        /// Distance from the origin.
        #[inline]
        pub fn length(&self) -> f64 {
            self.to_vector().length()
        }

        /// Componentwise scaling about the origin.
        #[inline]
        pub fn scale(&self, s: f64) -> Point3 {
            self.to_vector().scale(s).to_point()
        }

        pub fn is_finite(&self) -> bool {
            self.to_vector().is_finite()
        }

        pub fn to_array(self) -> [f64; 3] {
            [self.x, self.y, self.z]
        }
    }

    impl From<[f64; 3]> for Vector3 {
        fn from(c: [f64; 3]) -> Self {
            Vector3::new(c[0], c[1], c[2])
        }
    }

    impl From<[f64; 3]> for Point3 {
        fn from(c: [f64; 3]) -> Self {
            Point3::new(c[0], c[1], c[2])
        }
    }

    /// Vector pointing from `from` toward `to`.
    #[inline]
    pub fn displacement(from: &Point3, to: &Point3) -> Vector3 {
        to.to_vector().subtract(&from.to_vector())
    }

    impl Add for Vector3 {
        type Output = Vector3;

        fn add(self, rhs: Vector3) -> Vector3 {
            self.plus(&rhs)
        }
    }

    impl Sub for Vector3 {
        type Output = Vector3;

        fn sub(self, rhs: Vector3) -> Vector3 {
            self.subtract(&rhs)
        }
    }

    impl Mul<f64> for Vector3 {
        type Output = Vector3;

        fn mul(self, rhs: f64) -> Vector3 {
            self.scale(rhs)
        }
    }

    impl Neg for Vector3 {
        type Output = Vector3;

        fn neg(self) -> Vector3 {
            self.scale(-1.0)
        }
    }

    impl Sub for Point3 {
        type Output = Vector3;

        fn sub(self, rhs: Point3) -> Vector3 {
            displacement(&rhs, &self)
        }
    }

    impl Add<Vector3> for Point3 {
        type Output = Point3;

        fn add(self, rhs: Vector3) -> Point3 {
            self.to_vector().plus(&rhs).to_point()
        }
    }

    impl Sub<Vector3> for Point3 {
        type Output = Point3;

        fn sub(self, rhs: Vector3) -> Point3 {
            self.to_vector().subtract(&rhs).to_point()
        }
    }

    impl Sum for Vector3 {
        fn sum<I: Iterator<Item = Vector3>>(iter: I) -> Vector3 {
            iter.fold(Vector3::ZERO, |acc, v| acc + v)
        }
    }

    impl<'a> Sum<&'a Vector3> for Vector3 {
        fn sum<I: Iterator<Item = &'a Vector3>>(iter: I) -> Vector3 {
            iter.fold(Vector3::ZERO, |acc, v| acc + *v)
        }
    }

    impl fmt::Display for Vector3 {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}, {}, {})", self.x, self.y, self.z)
        }
    }

    impl fmt::Display for Point3 {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}, {}, {})", self.x, self.y, self.z)
        }
    }
}
