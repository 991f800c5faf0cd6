//! Vector and matrix math for the rendering pipeline
//!
//! Matrices use the column-vector convention throughout: a clip-space
//! position is `mvp * v`, and composition reads right to left.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// 2D vector: screen positions and texture coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::splat(0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn dot(self, rhs: Vec2) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Scalar cross product; the sign tells which side of `self` the other
    /// vector lies on
    pub fn cross(self, rhs: Vec2) -> f32 {
        self.x * rhs.y - self.y * rhs.x
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

/// 3D vector: model positions, normals, light directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::splat(0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn normalize(self) -> Vec3 {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    pub fn lerp(self, rhs: Vec3, t: f32) -> Vec3 {
        self + (rhs - self) * t
    }

    /// Extend to homogeneous position (w = 1)
    pub const fn xyz1(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, 1.0)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// 4D vector: homogeneous positions and RGBA colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Self = Self::splat(0.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v, w: v }
    }

    pub fn dot(self, rhs: Vec4) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    pub const fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub const fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Clamp every component to [0, 1]
    pub fn saturate(self) -> Vec4 {
        Vec4::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
            self.w.clamp(0.0, 1.0),
        )
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, rhs: Vec4) -> Vec4 {
        Vec4::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, rhs: Vec4) -> Vec4 {
        Vec4::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    fn mul(self, s: f32) -> Vec4 {
        Vec4::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

/// Component-wise product, useful for color math
impl Mul for Vec4 {
    type Output = Vec4;
    fn mul(self, rhs: Vec4) -> Vec4 {
        Vec4::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z, self.w * rhs.w)
    }
}

// =============================================================================
// 4x4 matrices (column-vector convention: clip = m * v)
// =============================================================================

/// 4x4 transformation matrix, row-major storage
pub type Mat4 = [[f32; 4]; 4];

pub fn mat4_zero() -> Mat4 {
    [[0.0; 4]; 4]
}

pub fn mat4_identity() -> Mat4 {
    let mut m = mat4_zero();
    for i in 0..4 {
        m[i][i] = 1.0;
    }
    m
}

/// Translation by `t`; the offset sits in the fourth column
pub fn mat4_translation(t: Vec3) -> Mat4 {
    let mut m = mat4_identity();
    m[0][3] = t.x;
    m[1][3] = t.y;
    m[2][3] = t.z;
    m
}

/// Per-axis scaling
pub fn mat4_scale(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = mat4_identity();
    m[0][0] = x;
    m[1][1] = y;
    m[2][2] = z;
    m
}

/// Rotation by `theta` radians around an arbitrary axis, built from the
/// equivalent unit quaternion.
pub fn mat4_rotation(axis: Vec3, theta: f32) -> Mat4 {
    let qsin = (theta * 0.5).sin();
    let qcos = (theta * 0.5).cos();
    let n = axis.normalize();
    let (x, y, z, w) = (n.x * qsin, n.y * qsin, n.z * qsin, qcos);
    [
        [
            1.0 - 2.0 * y * y - 2.0 * z * z,
            2.0 * x * y - 2.0 * w * z,
            2.0 * x * z + 2.0 * w * y,
            0.0,
        ],
        [
            2.0 * x * y + 2.0 * w * z,
            1.0 - 2.0 * x * x - 2.0 * z * z,
            2.0 * y * z - 2.0 * w * x,
            0.0,
        ],
        [
            2.0 * x * z - 2.0 * w * y,
            2.0 * y * z + 2.0 * w * x,
            1.0 - 2.0 * x * x - 2.0 * y * y,
            0.0,
        ],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Camera matrix: eye position, look-at target, up vector.
/// Left-handed: +z goes from the eye toward the target.
pub fn mat4_look_at(eye: Vec3, at: Vec3, up: Vec3) -> Mat4 {
    let zaxis = (at - eye).normalize();
    let xaxis = up.cross(zaxis).normalize();
    let yaxis = zaxis.cross(xaxis);
    [
        [xaxis.x, xaxis.y, xaxis.z, -eye.dot(xaxis)],
        [yaxis.x, yaxis.y, yaxis.z, -eye.dot(yaxis)],
        [zaxis.x, zaxis.y, zaxis.z, -eye.dot(zaxis)],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// D3D-style left-handed perspective projection.
/// Depth maps to [0, w] in clip space, [0, 1] after the divide.
pub fn mat4_perspective(fovy: f32, aspect: f32, zn: f32, zf: f32) -> Mat4 {
    let fax = 1.0 / (fovy * 0.5).tan();
    let mut m = mat4_zero();
    m[0][0] = fax / aspect;
    m[1][1] = fax;
    m[2][2] = zf / (zf - zn);
    m[2][3] = -zn * zf / (zf - zn);
    m[3][2] = 1.0;
    m
}

/// Matrix product `a * b`
pub fn mat4_mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = mat4_zero();
    for r in 0..4 {
        for c in 0..4 {
            let mut acc = 0.0;
            for k in 0..4 {
                acc += a[r][k] * b[k][c];
            }
            out[r][c] = acc;
        }
    }
    out
}

pub fn mat4_transpose(m: &Mat4) -> Mat4 {
    let mut out = mat4_zero();
    for r in 0..4 {
        for c in 0..4 {
            out[c][r] = m[r][c];
        }
    }
    out
}

/// 3x3 determinant of the minor obtained by deleting `row` and `col`
fn mat4_minor_det(m: &Mat4, row: usize, col: usize) -> f32 {
    let mut s = [[0.0f32; 3]; 3];
    for r in 0..3 {
        for c in 0..3 {
            s[r][c] = m[if r < row { r } else { r + 1 }][if c < col { c } else { c + 1 }];
        }
    }
    s[0][0] * (s[1][1] * s[2][2] - s[1][2] * s[2][1])
        - s[0][1] * (s[1][0] * s[2][2] - s[1][2] * s[2][0])
        + s[0][2] * (s[1][0] * s[2][1] - s[1][1] * s[2][0])
}

fn mat4_cofactor(m: &Mat4, row: usize, col: usize) -> f32 {
    let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
    mat4_minor_det(m, row, col) * sign
}

/// Inverse via the adjugate divided by the determinant.
/// A singular matrix produces non-finite entries, as the caller's problem.
pub fn mat4_invert(m: &Mat4) -> Mat4 {
    let mut adj = [[0.0f32; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            adj[c][r] = mat4_cofactor(m, r, c);
        }
    }
    let det: f32 = (0..4).map(|c| m[0][c] * adj[c][0]).sum();
    let mut out = [[0.0f32; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            out[r][c] = adj[r][c] / det;
        }
    }
    out
}

/// Transform a point as (x, y, z, 1) and drop the resulting w
pub fn mat4_transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    mat4_transform_vec4(m, p.xyz1()).xyz()
}

/// Full homogeneous transform
pub fn mat4_transform_vec4(m: &Mat4, v: Vec4) -> Vec4 {
    Vec4::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3] * v.w,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3] * v.w,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3] * v.w,
        m[3][0] * v.x + m[3][1] * v.y + m[3][2] * v.z + m[3][3] * v.w,
    )
}
