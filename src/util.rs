/// A module of utility functions
use nalgebra_glm as glm;

/// Builds a transform that scales, then rotates, then translates
#[must_use]
pub fn compose(
    translation: &glm::Vec3,
    rotation: &glm::Quat,
    scale: &glm::Vec3,
) -> glm::Mat4 {
    glm::translation(translation)
        * glm::quat_to_mat4(rotation)
        * glm::scaling(scale)
}

/// Rotates `v` by the unit quaternion `q` without building a matrix
#[must_use]
pub fn rotate(q: &glm::Quat, v: &glm::Vec3) -> glm::Vec3 {
    let u = glm::vec3(q.coords.x, q.coords.y, q.coords.z);
    let s = q.coords.w;
    u * (glm::dot(&u, v) * 2.0f32)
        + v * (s * s - glm::dot(&u, &u))
        + glm::cross(&u, v) * (s * 2.0f32)
}

/// Translation part of a 4x4 matrix
#[must_use]
pub fn translation_of(matrix: &glm::Mat4) -> glm::Vec3 {
    glm::vec3(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

/// Transforms a 3D position using a 4x4 matrix and return as a `glm::Vec3`
#[must_use]
pub fn transform(position: &glm::Vec3, matrix: &glm::Mat4) -> glm::Vec3 {
    let ws = glm::vec4(position.x, position.y, position.z, 1.0f32);
    let vs = matrix * ws;
    glm::vec3(vs.x, vs.y, vs.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0005_f32;

    fn vec_eq(a: &glm::Vec3, b: &glm::Vec3) {
        let c = glm::equal_eps(a, b, EPSILON);
        assert!(c.x && c.y && c.z, "{a:?} != {b:?}");
    }

    #[test]
    fn compose_order() {
        // Scale then rotate a quarter turn about z then translate
        let m = compose(
            &glm::vec3(10.0, 0.0, 0.0),
            &glm::quat_angle_axis(
                std::f32::consts::FRAC_PI_2,
                &glm::vec3(0.0, 0.0, 1.0),
            ),
            &glm::vec3(2.0, 2.0, 2.0),
        );
        vec_eq(
            &transform(&glm::vec3(1.0, 0.0, 0.0), &m),
            &glm::vec3(10.0, 2.0, 0.0),
        );
        vec_eq(&translation_of(&m), &glm::vec3(10.0, 0.0, 0.0));
    }

    #[test]
    fn rotate_matches_quat_rotate() {
        let q = glm::quat_angle_axis(0.9f32, &glm::vec3(0.267, 0.534, 0.802));
        let v = glm::vec3(0.0, 0.0, 1.0);
        vec_eq(&rotate(&q, &v), &glm::quat_rotate_vec3(&q, &v));
        let v = glm::vec3(-3.0, 0.5, 2.0);
        vec_eq(&rotate(&q, &v), &glm::quat_rotate_vec3(&q, &v));
    }
}
