use cgmath::{Quaternion as CgQuaternion, Rad, Vector3};
use std::ops::Mul;

/// Minimal rotation quaternion used for keyframe data.
///
/// Values are immutable: [`Quaternion::multiply`] (and `*`) returns the Hamilton product `self * rhs`
/// without touching either operand. The product is not commutative, so operand order is significant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quaternion { x, y, z, w }
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Rotation of `angle` around `axis`. The axis is expected to be (near-)unit length and is not normalized.
    pub fn from_axis_angle<A: Into<Rad<f64>>>(axis: Vector3<f64>, angle: A) -> Self {
        let Rad(angle) = angle.into();
        let (sin, cos) = (angle * 0.5).sin_cos();
        Quaternion {
            x: axis.x * sin,
            y: axis.y * sin,
            z: axis.z * sin,
            w: cos,
        }
    }

    /// Hamilton product `self * rhs`.
    pub fn multiply(self, rhs: Quaternion) -> Self {
        let (a, b) = (self, rhs);
        Quaternion {
            x: a.x * b.w + a.w * b.x + a.y * b.z - a.z * b.y,
            y: a.y * b.w + a.w * b.y + a.z * b.x - a.x * b.z,
            z: a.z * b.w + a.w * b.z + a.x * b.y - a.y * b.x,
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        }
    }

    /// Components in `[x, y, z, w]` order.
    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn approx_eq(self, other: Quaternion, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
            && (self.w - other.w).abs() <= epsilon
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        self.multiply(rhs)
    }
}

impl From<Quaternion> for CgQuaternion<f64> {
    fn from(q: Quaternion) -> Self {
        // cgmath keeps the scalar part first
        CgQuaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl From<CgQuaternion<f64>> for Quaternion {
    fn from(q: CgQuaternion<f64>) -> Self {
        Quaternion::new(q.v.x, q.v.y, q.v.z, q.s)
    }
}
