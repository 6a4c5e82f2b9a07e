use super::types::JointPose;
use crate::util::compose;
use nalgebra_glm as glm;

/// Above this dot product two rotations are close enough that a normalized
/// linear blend is used instead of the spherical one
pub const SLERP_THRESHOLD: f32 = 0.9995;

/// Interpolation parameter for `current` between two keyframe times. Not
/// clamped: values above 1 mean the keyframe pair needs to advance, and a
/// zero length interval gives a non-finite result.
#[must_use]
pub fn weight(start: f32, end: f32, current: f32) -> f32 {
    (current - start) / (end - start)
}

/// Spherical linear interpolation taking the shortest path
#[must_use]
pub fn slerp(a: &glm::Quat, b: &glm::Quat, t: f32) -> glm::Quat {
    let dot = glm::quat_dot(a, b);

    // q and -q are the same rotation. Flipping one when the dot product is
    // negative keeps the blend on the short arc.
    let (b, dot) = if dot < 0.0f32 { (-*b, -dot) } else { (*b, dot) };

    if dot > SLERP_THRESHOLD {
        // sin(theta) is close to 0 here so dividing by it is unstable
        return glm::quat_normalize(&(*a + (b - *a) * t));
    }

    let theta_0 = dot.clamp(-1.0f32, 1.0f32).acos();
    let theta = theta_0 * t;
    let s1 = theta.sin() / theta_0.sin();
    let s0 = theta.cos() - dot * s1;
    glm::quat_normalize(&(*a * s0 + b * s1))
}

/// Blends two joint poses into a local transform. A non-finite `dt`, which
/// is what a zero length keyframe interval produces, gives the identity.
#[must_use]
pub fn interpolate(
    current: &JointPose,
    next: &JointPose,
    dt: f32,
) -> glm::Mat4 {
    if !dt.is_finite() {
        return glm::Mat4::identity();
    }
    let translation = glm::lerp(&current.translation, &next.translation, dt);
    let scale = glm::lerp(&current.scale, &next.scale, dt);
    let rotation = slerp(&current.rotation, &next.rotation, dt);
    compose(&translation, &rotation, &scale)
}
