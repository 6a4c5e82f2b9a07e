//! Tests for transforms arranged in a scene graph

use nalgebra_glm as glm;
use recluse::{rc_error::RcError, scene::SceneGraph, transform::Transform};
use std::sync::Once;

const EPSILON: f32 = 0.0001f32; // Small value for float comparisons
static INIT: Once = Once::new();

fn init_tests() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

fn vec_eq(a: &glm::Vec3, b: &glm::Vec3) {
    let c = glm::equal_eps(a, b, EPSILON);
    assert!(c.x && c.y && c.z, "{a:?} != {b:?}");
}

fn at(x: f32, y: f32, z: f32) -> Transform {
    let mut t = Transform::default();
    t.position = glm::vec3(x, y, z);
    t.local_position = t.position;
    t
}

#[test]
fn chain_accumulates() {
    init_tests();
    let mut scene = SceneGraph::new();
    let root = scene.add(at(1.0, 0.0, 0.0), None).unwrap();
    let arm = scene.add(at(0.0, 2.0, 0.0), Some(root)).unwrap();
    let hand = scene.add(at(0.0, 0.0, 3.0), Some(arm)).unwrap();
    scene.update();

    vec_eq(&scene.get(root).unwrap().position, &glm::vec3(1.0, 0.0, 0.0));
    vec_eq(&scene.get(arm).unwrap().position, &glm::vec3(1.0, 2.0, 0.0));
    vec_eq(&scene.get(hand).unwrap().position, &glm::vec3(1.0, 2.0, 3.0));

    assert_eq!(scene.parent(hand), Some(arm));
    assert_eq!(scene.parent(root), None);
    assert_eq!(scene.children(root), Some(&[arm][..]));
    assert_eq!(scene.len(), 3);
}

#[test]
fn moving_root_moves_children() {
    init_tests();
    let mut scene = SceneGraph::new();
    let root = scene.add(Transform::default(), None).unwrap();
    let child = scene.add(at(0.0, 0.0, 1.0), Some(root)).unwrap();
    scene.update();
    vec_eq(&scene.get(child).unwrap().position, &glm::vec3(0.0, 0.0, 1.0));

    // Half turn about up flips the child to the other side
    if let Some(t) = scene.get_mut(root) {
        t.rotation =
            glm::quat_angle_axis(std::f32::consts::PI, &glm::vec3(0.0, 1.0, 0.0));
    }
    scene.update();
    let child = scene.get(child).unwrap();
    vec_eq(&child.position, &glm::vec3(0.0, 0.0, -1.0));
    vec_eq(&child.front(), &glm::vec3(0.0, 0.0, -1.0));
    let round = child.world_to_local() * child.local_to_world();
    let c = glm::equal_columns_eps(&round, &glm::Mat4::identity(), EPSILON);
    assert!(c.x && c.y && c.z && c.w);
}

#[test]
fn unknown_parent() {
    let mut scene = SceneGraph::new();
    assert!(scene.is_empty());
    assert!(matches!(
        scene.add(Transform::default(), Some(4)),
        Err(RcError::NoNode(4))
    ));
    assert!(scene.is_empty());
    assert!(scene.get(0).is_none());
    assert!(scene.children(0).is_none());
}
