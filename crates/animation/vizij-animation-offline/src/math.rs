//! Float3 / quaternion helpers on plain arrays:
//! - lerp for translations and scales
//! - quaternion NLERP with shortest-arc correction
//! - distances and angular differences used as decimation error metrics
//!
//! Quaternions are stored as (x, y, z, w).

pub type Float3 = [f32; 3];
pub type Quaternion = [f32; 4];

pub const QUATERNION_IDENTITY: Quaternion = [0.0, 0.0, 0.0, 1.0];

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_float3(a: Float3, b: Float3, t: f32) -> Float3 {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

#[inline]
pub fn length_float3(v: Float3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[inline]
pub fn distance_float3(a: Float3, b: Float3) -> f32 {
    length_float3([a[0] - b[0], a[1] - b[1], a[2] - b[2]])
}

#[inline]
pub fn dot_quat(a: Quaternion, b: Quaternion) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
pub fn normalize_quat(mut q: Quaternion) -> Quaternion {
    let len2 = dot_quat(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        q[0] *= inv_len;
        q[1] *= inv_len;
        q[2] *= inv_len;
        q[3] *= inv_len;
    }
    q
}

#[inline]
pub fn conjugate_quat(q: Quaternion) -> Quaternion {
    [-q[0], -q[1], -q[2], q[3]]
}

/// Hamilton product `a * b`.
#[inline]
pub fn mul_quat(a: Quaternion, b: Quaternion) -> Quaternion {
    [
        a[3] * b[0] + a[0] * b[3] + a[1] * b[2] - a[2] * b[1],
        a[3] * b[1] + a[1] * b[3] + a[2] * b[0] - a[0] * b[2],
        a[3] * b[2] + a[2] * b[3] + a[0] * b[1] - a[1] * b[0],
        a[3] * b[3] - a[0] * b[0] - a[1] * b[1] - a[2] * b[2],
    ]
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
/// Returns a normalized quaternion (x,y,z,w).
#[inline]
pub fn nlerp_quat(a: Quaternion, mut b: Quaternion, t: f32) -> Quaternion {
    if dot_quat(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    normalize_quat([
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ])
}

/// Angle (radians, in [0, pi]) of the rotation taking `a` to `b`.
///
/// Computed from the relative rotation with `atan2` rather than `acos(dot)`,
/// which loses all precision for the tiny angles decimation cares about.
#[inline]
pub fn angle_between_quat(a: Quaternion, b: Quaternion) -> f32 {
    let r = mul_quat(conjugate_quat(normalize_quat(a)), normalize_quat(b));
    let sin_half = length_float3([r[0], r[1], r[2]]);
    2.0 * sin_half.atan2(r[3].abs())
}

/// Compares two rotations against a tolerance expressed as the cosine of half
/// the tolerance angle. `q` and `-q` compare equal.
#[inline]
pub fn compare_quat(a: Quaternion, b: Quaternion, cos_half_tolerance: f32) -> bool {
    dot_quat(normalize_quat(a), normalize_quat(b)).abs() >= cos_half_tolerance
}

/// Values that can be reconstructed between two keyframes.
pub trait Interpolate: Copy {
    fn interpolate(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolate for Float3 {
    #[inline]
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        lerp_float3(a, b, t)
    }
}

impl Interpolate for Quaternion {
    #[inline]
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        nlerp_quat(a, b, t)
    }
}
