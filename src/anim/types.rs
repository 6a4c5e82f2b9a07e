use crate::{
    rc_error::RcError,
    types::{SkeletonId, MAX_JOINTS, NO_PARENT},
    util,
};
use itertools::Itertools;
use log::{error, warn};
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn identity() -> glm::Mat4 {
    glm::Mat4::identity()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Joint {
    #[serde(default)]
    pub name: String,
    /// Index of the parent joint, or `NO_PARENT`
    pub parent: u8,
    #[serde(default = "identity")]
    pub inverse_bind_pose: glm::Mat4,
}

/// Joint hierarchy shared by every clip that animates it. Immutable once
/// built, which is what lets samplers on different threads read it at the
/// same time.
///
/// When `root_in_joints` is false the root is not part of `joints`, so joint
/// `i` corresponds to joint pose `i + 1` of each keyframe.
#[derive(Clone, Debug, Serialize)]
pub struct Skeleton {
    joints: Vec<Joint>,
    root_in_joints: bool,
    root_inverse_transform: glm::Mat4,
}

#[derive(Deserialize)]
struct SkeletonDef {
    joints: Vec<Joint>,
    root_in_joints: bool,
    #[serde(default = "identity")]
    root_inverse_transform: glm::Mat4,
}

impl Skeleton {
    /// Creates a skeleton after checking that every parent comes before its
    /// child
    ///
    /// # Errors
    /// May return `RcError`
    pub fn new(
        joints: Vec<Joint>,
        root_in_joints: bool,
        root_inverse_transform: glm::Mat4,
    ) -> Result<Self, RcError> {
        // Index 0xff is reserved for `NO_PARENT`
        if joints.len() > usize::from(NO_PARENT) {
            error!("skeleton has {} joints", joints.len());
            return Err(RcError::TooManyJoints(joints.len()));
        }
        for (joint, j) in joints.iter().enumerate() {
            if j.parent != NO_PARENT && usize::from(j.parent) >= joint {
                error!("joint {} has parent {}", joint, j.parent);
                return Err(RcError::BadParent {
                    joint,
                    parent: j.parent,
                });
            }
        }
        Ok(Self {
            joints,
            root_in_joints,
            root_inverse_transform,
        })
    }

    /// # Errors
    /// May return `RcError`
    pub fn from_yaml(text: &str) -> Result<Self, RcError> {
        let def: SkeletonDef = serde_yaml::from_str(text)?;
        Self::new(def.joints, def.root_in_joints, def.root_inverse_transform)
    }

    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    #[must_use]
    pub const fn root_in_joints(&self) -> bool {
        self.root_in_joints
    }

    #[must_use]
    pub const fn root_inverse_transform(&self) -> &glm::Mat4 {
        &self.root_inverse_transform
    }

    /// Number of joint poses each keyframe of a clip for this skeleton must
    /// have. One more than the joint count if the root is kept separately.
    #[must_use]
    pub fn pose_joint_count(&self) -> usize {
        if self.root_in_joints {
            self.joints.len()
        } else {
            self.joints.len() + 1
        }
    }
}

/// Local transform of one joint in one keyframe
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointPose {
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Default for JointPose {
    fn default() -> Self {
        Self {
            translation: glm::Vec3::zeros(),
            rotation: glm::Quat::identity(),
            scale: glm::vec3(1.0f32, 1.0f32, 1.0f32),
        }
    }
}

impl JointPose {
    #[must_use]
    pub fn to_mat4(&self) -> glm::Mat4 {
        util::compose(&self.translation, &self.rotation, &self.scale)
    }
}

/// A full skeleton pose at one timestamp
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnimPose {
    pub time: f32,
    pub local_poses: Vec<JointPose>,
}

/// Single instance of an animation clip. This may represent a "walk," "run,"
/// "shoot," etc.
#[derive(Clone, Debug, Serialize)]
pub struct AnimClip {
    name: String,
    skeleton_id: SkeletonId,
    duration: f32,
    poses: Vec<AnimPose>,
    looping: bool,
}

#[derive(Deserialize)]
struct AnimClipDef {
    #[serde(default)]
    name: String,
    skeleton_id: SkeletonId,
    duration: f32,
    poses: Vec<AnimPose>,
    #[serde(default)]
    looping: bool,
}

impl AnimClip {
    /// Creates a clip after checking that there is at least one pose, the
    /// poses are in time order and they all have the same joint count
    ///
    /// # Errors
    /// May return `RcError`
    pub fn new(
        name: &str,
        skeleton_id: SkeletonId,
        duration: f32,
        poses: Vec<AnimPose>,
        looping: bool,
    ) -> Result<Self, RcError> {
        let Some(first) = poses.first() else {
            error!("clip {:?} has no poses", name);
            return Err(RcError::EmptyClip);
        };
        if let Some(i) = poses
            .iter()
            .tuple_windows()
            .position(|(a, b)| b.time < a.time)
        {
            error!("clip {:?} pose {} is out of order", name, i + 1);
            return Err(RcError::UnsortedPoses(i + 1));
        }
        let expected = first.local_poses.len();
        if let Some(p) = poses.iter().find(|p| p.local_poses.len() != expected) {
            error!(
                "clip {:?} pose at {} has a different joint count",
                name, p.time
            );
            return Err(RcError::PoseCountMismatch {
                expected,
                found: p.local_poses.len(),
            });
        }
        if expected == 0 {
            warn!("clip {:?} has no joint poses", name);
        }
        Ok(Self {
            name: name.to_string(),
            skeleton_id,
            duration,
            poses,
            looping,
        })
    }

    /// # Errors
    /// May return `RcError`
    pub fn from_yaml(text: &str) -> Result<Self, RcError> {
        let def: AnimClipDef = serde_yaml::from_str(text)?;
        Self::new(
            &def.name,
            def.skeleton_id,
            def.duration,
            def.poses,
            def.looping,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn skeleton_id(&self) -> SkeletonId {
        self.skeleton_id
    }

    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    #[must_use]
    pub const fn looping(&self) -> bool {
        self.looping
    }

    #[must_use]
    pub fn poses(&self) -> &[AnimPose] {
        &self.poses
    }

    #[must_use]
    pub fn pose_count(&self) -> usize {
        self.poses.len()
    }

    /// Joint poses per keyframe, which is the same for every keyframe
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.poses.first().map_or(0, |p| p.local_poses.len())
    }

    /// Checks this clip can drive the given skeleton
    ///
    /// # Errors
    /// May return `RcError`
    pub fn check_skeleton(&self, skeleton: &Skeleton) -> Result<(), RcError> {
        let expected = skeleton.pose_joint_count();
        let found = self.joint_count();
        if expected == found && found > 0 {
            Ok(())
        } else {
            error!(
                "clip {:?} has {} joint poses, skeleton {} needs {}",
                self.name, found, self.skeleton_id.0, expected
            );
            Err(RcError::JointCountMismatch { expected, found })
        }
    }
}

/// Sampler settings that don't come from the clip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerOptions {
    pub enabled: bool,
    pub playback_rate: f32,
    pub weight: f32,
    pub palette_capacity: usize,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            playback_rate: 1.0f32,
            weight: 1.0f32,
            palette_capacity: MAX_JOINTS,
        }
    }
}

impl SamplerOptions {
    /// # Errors
    /// May return `RcError`
    pub fn from_yaml(text: &str) -> Result<Self, RcError> {
        let options: Self = serde_yaml::from_str(text)?;
        Ok(options.checked())
    }

    /// # Errors
    /// May return `RcError`
    pub fn load(path: &Path) -> Result<Self, RcError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    fn checked(mut self) -> Self {
        if self.palette_capacity < MAX_JOINTS {
            warn!(
                "palette_capacity={} raised to {}",
                self.palette_capacity, MAX_JOINTS
            );
            self.palette_capacity = MAX_JOINTS;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(time: f32, joints: usize) -> AnimPose {
        AnimPose {
            time,
            local_poses: vec![JointPose::default(); joints],
        }
    }

    #[test]
    fn clip_needs_poses() {
        let res = AnimClip::new("empty", SkeletonId(0), 1.0, Vec::new(), false);
        assert!(matches!(res, Err(RcError::EmptyClip)));
    }

    #[test]
    fn clip_poses_in_order() {
        let poses = vec![pose(0.0, 2), pose(0.5, 2), pose(0.25, 2)];
        let res = AnimClip::new("unsorted", SkeletonId(0), 1.0, poses, false);
        assert!(matches!(res, Err(RcError::UnsortedPoses(2))));
    }

    #[test]
    fn clip_joint_counts_match() {
        let poses = vec![pose(0.0, 2), pose(1.0, 3)];
        let res = AnimClip::new("ragged", SkeletonId(0), 1.0, poses, false);
        assert!(matches!(
            res,
            Err(RcError::PoseCountMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn skeleton_parent_before_child() {
        let joints = vec![
            Joint {
                name: "root".to_string(),
                parent: NO_PARENT,
                inverse_bind_pose: identity(),
            },
            Joint {
                name: "bad".to_string(),
                parent: 1,
                inverse_bind_pose: identity(),
            },
        ];
        let res = Skeleton::new(joints, true, identity());
        assert!(matches!(
            res,
            Err(RcError::BadParent {
                joint: 1,
                parent: 1
            })
        ));
    }

    #[test]
    fn check_skeleton_offset() {
        let joints = vec![Joint {
            name: "hip".to_string(),
            parent: NO_PARENT,
            inverse_bind_pose: identity(),
        }];
        let separate = Skeleton::new(joints.clone(), false, identity()).unwrap();
        let included = Skeleton::new(joints, true, identity()).unwrap();
        let clip = AnimClip::new(
            "two",
            SkeletonId(0),
            1.0,
            vec![pose(0.0, 2)],
            false,
        )
        .unwrap();
        assert!(clip.check_skeleton(&separate).is_ok());
        assert!(matches!(
            clip.check_skeleton(&included),
            Err(RcError::JointCountMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn options_yaml() {
        let options =
            SamplerOptions::from_yaml("playback_rate: 2.0\npalette_capacity: 8")
                .unwrap();
        assert!((options.playback_rate - 2.0).abs() < f32::EPSILON);
        assert!(options.enabled);
        assert_eq!(options.palette_capacity, MAX_JOINTS);
    }

    #[test]
    fn clip_yaml() {
        let text = "
name: wave
skeleton_id: 3
duration: 1.0
looping: true
poses:
  - time: 0.0
    local_poses:
      - {}
  - time: 1.0
    local_poses:
      - translation: [1.0, 0.0, 0.0]
";
        let clip = AnimClip::from_yaml(text).unwrap();
        assert_eq!(clip.skeleton_id(), SkeletonId(3));
        assert!(clip.looping());
        assert_eq!(clip.pose_count(), 2);
        let p = clip.poses()[1].local_poses[0];
        assert!((p.translation.x - 1.0).abs() < f32::EPSILON);
        assert_eq!(p.rotation, glm::Quat::identity());
        assert_eq!(p.scale, glm::vec3(1.0, 1.0, 1.0));
    }
}
