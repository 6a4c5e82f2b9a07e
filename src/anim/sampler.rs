use super::{
    palette::Palette,
    types::{AnimClip, SamplerOptions},
    util,
};
use crate::{
    rc_error::RcError,
    types::{SamplerId, SkeletonProvider, MAX_JOINTS, NO_PARENT},
};
use log::{debug, error, info, trace};
use nalgebra_glm as glm;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

static NEXT_SAMPLER_ID: AtomicU64 = AtomicU64::new(0);

/// Playback state of a sampler
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerState {
    /// A disabled sampler ignores `step` but keeps its state
    pub enabled: bool,
    pub looping: bool,
    /// Clip time computed by the last `step`
    pub current_local_time: f32,
    pub playback_rate: f32,
    /// Not used by the sampler itself. `AnimationComponent` blends by it
    /// when fading from one clip to another.
    pub weight: f32,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            enabled: true,
            looping: true,
            current_local_time: 0.0f32,
            playback_rate: 1.0f32,
            weight: 1.0f32,
        }
    }
}

/// Plays one clip. Each call to `step` turns a global time into clip time,
/// blends the two keyframes around it, composes the joints down the
/// hierarchy and leaves skinning matrices in the palette.
///
/// The clip is shared and read only. Nothing here is shared with other
/// samplers, so separate samplers can be stepped on separate threads.
#[derive(Debug)]
pub struct AnimSampler {
    id: SamplerId,
    clip: Option<Arc<AnimClip>>,
    pub state: SamplerState,
    /// Global time when the current cycle started. Negative until `play`.
    tau: f32,
    current_pose: usize,
    next_pose: usize,
    output: Palette,
    global_transform: glm::Mat4,
}

impl Default for AnimSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimSampler {
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(SamplerId(NEXT_SAMPLER_ID.fetch_add(1, Ordering::Relaxed)))
    }

    /// Creates a sampler with an id chosen by the caller. Uniqueness is then
    /// up to the caller.
    #[must_use]
    pub fn with_id(id: SamplerId) -> Self {
        Self {
            id,
            clip: None,
            state: SamplerState::default(),
            tau: -1.0f32,
            current_pose: 0,
            next_pose: 0,
            output: Palette::new(MAX_JOINTS),
            global_transform: glm::Mat4::identity(),
        }
    }

    #[must_use]
    pub fn with_options(options: &SamplerOptions) -> Self {
        let mut sampler = Self::new();
        sampler.state.enabled = options.enabled;
        sampler.state.playback_rate = options.playback_rate;
        sampler.state.weight = options.weight;
        sampler.output = Palette::new(options.palette_capacity.max(MAX_JOINTS));
        sampler
    }

    #[must_use]
    pub const fn id(&self) -> SamplerId {
        self.id
    }

    #[must_use]
    pub const fn clip(&self) -> Option<&Arc<AnimClip>> {
        self.clip.as_ref()
    }

    /// Assigns a clip and takes its looping flag. Time is not reset, call
    /// `play` for that. Keyframe indices are only reset if they don't fit
    /// the new clip.
    pub fn set_clip(&mut self, clip: Arc<AnimClip>) {
        info!(
            "sampler {} clip={:?} poses={} duration={}",
            self.id.0,
            clip.name(),
            clip.pose_count(),
            clip.duration()
        );
        self.state.looping = clip.looping();
        if self.current_pose >= clip.pose_count()
            || self.next_pose >= clip.pose_count()
        {
            self.reset_poses(clip.pose_count());
        }
        self.clip = Some(clip);
    }

    /// Starts a new cycle at `global_time`
    pub fn play(&mut self, global_time: f32) {
        debug!("sampler {} play at {}", self.id.0, global_time);
        self.tau = global_time;
        let count = self.clip.as_ref().map_or(0, |c| c.pose_count());
        self.reset_poses(count);
    }

    /// Advances playback to `global_time` and rebuilds the palette. Does
    /// nothing if the sampler is disabled.
    ///
    /// # Errors
    /// Returns `RcError` if there is no clip, `play` hasn't been called, the
    /// skeleton can't be resolved or doesn't match the clip. These are usage
    /// errors. They are caught before anything is written, so the palette,
    /// time origin, clip time and keyframe indices are left as they were.
    pub fn step<P>(
        &mut self,
        global_time: f32,
        skeletons: &P,
    ) -> Result<(), RcError>
    where
        P: SkeletonProvider + ?Sized,
    {
        if !self.state.enabled {
            return Ok(());
        }
        let Some(clip) = self.clip.clone() else {
            error!("sampler {} stepped with no clip", self.id.0);
            return Err(RcError::NoClip);
        };
        if self.tau < 0.0f32 {
            error!("sampler {} stepped with tau={}", self.id.0, self.tau);
            return Err(RcError::NegativeTimeOrigin(self.tau));
        }

        let Some(skeleton) = skeletons.resolve(clip.skeleton_id()) else {
            error!(
                "sampler {} skeleton {} not found",
                self.id.0,
                clip.skeleton_id().0
            );
            return Err(RcError::NoSkeleton(clip.skeleton_id()));
        };
        clip.check_skeleton(&skeleton)?;
        if skeleton.joints().len() > self.output.len() {
            error!(
                "sampler {} palette too small for {} joints",
                self.id.0,
                skeleton.joints().len()
            );
            return Err(RcError::TooManyJoints(skeleton.joints().len()));
        }

        let mut t = (global_time - self.tau) * self.state.playback_rate;
        if t > clip.duration() {
            // Only a looping clip restarts its cycle, but the time and
            // keyframes wind back either way.
            if self.state.looping {
                self.play(global_time);
            }
            t -= clip.duration();
            self.reset_poses(clip.pose_count());
            debug!("sampler {} wrapped to t={}", self.id.0, t);
        }
        self.state.current_local_time = t;

        // Settle on the keyframe pair once so every joint sees the same one
        let (current, next) = self.resolve_poses(&clip, t);
        if current != self.current_pose {
            debug!(
                "sampler {} keyframes {},{} -> {},{}",
                self.id.0, self.current_pose, self.next_pose, current, next
            );
        }
        self.current_pose = current;
        self.next_pose = next;

        let current = &clip.poses()[current];
        let next = &clip.poses()[next];
        let dt = util::weight(current.time, next.time, t);
        let root_in_joints = skeleton.root_in_joints();

        // Only the root needs seeding, every other joint is written below
        // from its parent.
        let local =
            util::interpolate(&current.local_poses[0], &next.local_poses[0], dt);
        if root_in_joints {
            self.output[0] = local;
        }
        self.global_transform = local;

        for i in 1..current.local_poses.len() {
            let idx = if root_in_joints { i } else { i - 1 };
            let local = util::interpolate(
                &current.local_poses[i],
                &next.local_poses[i],
                dt,
            );
            let parent = skeleton.joints()[idx].parent;
            let parent_transform = if parent == NO_PARENT {
                self.global_transform
            } else {
                self.output[usize::from(parent)]
            };
            self.output[idx] = parent_transform * local;
        }

        // Bring vertices into joint space with the inverse binding
        let root_inverse = skeleton.root_inverse_transform();
        for (out, joint) in self.output.iter_mut().zip(skeleton.joints()) {
            *out = root_inverse * *out * joint.inverse_bind_pose;
        }

        trace!(
            "sampler {} step gt={} t={} dt={}",
            self.id.0,
            global_time,
            t,
            dt
        );
        Ok(())
    }

    /// The keyframe pair to use at clip time `t`. Moves on by one keyframe
    /// once `t` is past the end of the current pair.
    fn resolve_poses(&self, clip: &AnimClip, t: f32) -> (usize, usize) {
        let poses = clip.poses();
        let dt = util::weight(
            poses[self.current_pose].time,
            poses[self.next_pose].time,
            t,
        );
        if dt > 1.0f32 {
            let next = if self.next_pose + 1 >= poses.len() {
                0
            } else {
                self.next_pose + 1
            };
            (self.next_pose, next)
        } else {
            (self.current_pose, self.next_pose)
        }
    }

    fn reset_poses(&mut self, count: usize) {
        self.current_pose = 0;
        self.next_pose = if count > 1 { 1 } else { 0 };
    }

    /// Number of joint poses per keyframe of the current clip
    ///
    /// # Errors
    /// Returns `RcError::NoClip` if no clip has been set
    pub fn palette_size(&self) -> Result<usize, RcError> {
        self.clip
            .as_ref()
            .and_then(|c| c.poses().get(self.current_pose))
            .map(|p| p.local_poses.len())
            .ok_or(RcError::NoClip)
    }

    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.output
    }

    /// Root transform blended by the last `step`
    #[must_use]
    pub const fn global_transform(&self) -> &glm::Mat4 {
        &self.global_transform
    }

    #[must_use]
    pub const fn tau(&self) -> f32 {
        self.tau
    }

    #[must_use]
    pub const fn current_pose_index(&self) -> usize {
        self.current_pose
    }

    #[must_use]
    pub const fn next_pose_index(&self) -> usize {
        self.next_pose
    }
}
