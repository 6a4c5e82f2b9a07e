use crate::util;
use log::warn;
use nalgebra_glm as glm;

fn front_axis() -> glm::Vec3 {
    glm::vec3(0.0f32, 0.0f32, 1.0f32)
}

fn right_axis() -> glm::Vec3 {
    glm::vec3(1.0f32, 0.0f32, 0.0f32)
}

fn up_axis() -> glm::Vec3 {
    glm::vec3(0.0f32, 1.0f32, 0.0f32)
}

/// Position, rotation and scale of a game object.
///
/// Without a parent, `position`, `rotation` and `scale` are what the caller
/// sets and are copied to the local values on update. With a parent, the
/// local values are what the caller sets and `position` and `rotation` are
/// written by `update` in world space.
///
/// The world matrix and its inverse are only valid after `update`.
#[derive(Debug, Copy, Clone)]
pub struct Transform {
    pub position: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
    pub local_position: glm::Vec3,
    pub local_rotation: glm::Quat,
    pub local_scale: glm::Vec3,
    local_to_world: glm::Mat4,
    world_to_local: glm::Mat4,
    front: glm::Vec3,
    right: glm::Vec3,
    up: glm::Vec3,
    updated: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(
            glm::Vec3::zeros(),
            glm::Quat::identity(),
            glm::vec3(1.0f32, 1.0f32, 1.0f32),
        )
    }
}

impl Transform {
    #[must_use]
    pub fn new(
        position: glm::Vec3,
        rotation: glm::Quat,
        scale: glm::Vec3,
    ) -> Self {
        Self {
            position,
            rotation,
            scale,
            local_position: position,
            local_rotation: rotation,
            local_scale: scale,
            local_to_world: glm::Mat4::identity(),
            world_to_local: glm::Mat4::identity(),
            front: front_axis(),
            right: right_axis(),
            up: up_axis(),
            updated: false,
        }
    }

    /// Recalculates the world matrix, world position and directions. The
    /// parent must already have been updated this frame.
    pub fn update(&mut self, parent: Option<&Self>) {
        if let Some(parent) = parent {
            let local = util::compose(
                &self.local_position,
                &self.local_rotation,
                &self.local_scale,
            );
            self.local_to_world = parent.local_to_world * local;
            self.position = util::translation_of(&self.local_to_world);
            self.rotation = parent.rotation * self.local_rotation;
        } else {
            if self.is_settled() {
                return;
            }
            self.local_position = self.position;
            self.local_rotation = self.rotation;
            self.local_scale = self.scale;
            self.local_to_world =
                util::compose(&self.position, &self.rotation, &self.scale);
        }

        self.front = util::rotate(&self.rotation, &front_axis());
        self.right = util::rotate(&self.rotation, &right_axis());
        self.up = util::rotate(&self.rotation, &up_axis());

        if let Some(inverse) = self.local_to_world.try_inverse() {
            self.world_to_local = inverse;
        } else {
            warn!("world matrix is not invertible, keeping previous inverse");
        }
        self.updated = true;
    }

    /// True when a root transform hasn't moved since its last update
    fn is_settled(&self) -> bool {
        self.updated
            && self.position == self.local_position
            && self.rotation == self.local_rotation
            && self.scale == self.local_scale
    }

    #[must_use]
    pub const fn local_to_world(&self) -> &glm::Mat4 {
        &self.local_to_world
    }

    #[must_use]
    pub const fn world_to_local(&self) -> &glm::Mat4 {
        &self.world_to_local
    }

    #[must_use]
    pub const fn front(&self) -> glm::Vec3 {
        self.front
    }

    #[must_use]
    pub const fn right(&self) -> glm::Vec3 {
        self.right
    }

    #[must_use]
    pub const fn up(&self) -> glm::Vec3 {
        self.up
    }
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
    fn root_copies_to_local() {
        let mut t = Transform::default();
        t.position = glm::vec3(1.0, 2.0, 3.0);
        t.update(None);
        vec_eq(&t.local_position, &glm::vec3(1.0, 2.0, 3.0));
        assert!((t.local_to_world()[(2, 3)] - 3.0).abs() < EPSILON);
        let round = t.world_to_local() * t.local_to_world();
        let c = glm::equal_columns_eps(&round, &glm::Mat4::identity(), EPSILON);
        assert!(c.x && c.y && c.z && c.w);
    }

    #[test]
    fn directions_follow_rotation() {
        let mut t = Transform::default();
        t.rotation =
            glm::quat_angle_axis(std::f32::consts::FRAC_PI_2, &up_axis());
        t.update(None);
        // Quarter turn about up takes front to right
        vec_eq(&t.front(), &right_axis());
        vec_eq(&t.up(), &up_axis());
        vec_eq(&t.right(), &glm::vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn settled_root_skips() {
        let mut t = Transform::default();
        t.position = glm::vec3(1.0, 0.0, 0.0);
        t.update(None);
        // Nothing moved so the stale matrix survives
        t.local_to_world = glm::Mat4::zeros();
        t.update(None);
        assert_eq!(*t.local_to_world(), glm::Mat4::zeros());
        t.position = glm::vec3(5.0, 0.0, 0.0);
        t.update(None);
        assert!((t.local_to_world()[(0, 3)] - 5.0).abs() < EPSILON);
    }

    #[test]
    fn child_in_parent_space() {
        let mut parent = Transform::default();
        parent.position = glm::vec3(10.0, 0.0, 0.0);
        parent.rotation =
            glm::quat_angle_axis(std::f32::consts::FRAC_PI_2, &front_axis());
        parent.update(None);

        let mut child = Transform::default();
        child.local_position = glm::vec3(1.0, 0.0, 0.0);
        child.update(Some(&parent));
        // Local x is turned onto world y by the parent
        vec_eq(&child.position, &glm::vec3(10.0, 1.0, 0.0));
        let c = glm::quat_equal_eps(&child.rotation, &parent.rotation, EPSILON);
        assert!(c.x && c.y && c.z && c.w);
    }
}
