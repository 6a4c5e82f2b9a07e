use crate::anim::Skeleton;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Opaque reference from a clip to the skeleton it animates
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize,
)]
pub struct SkeletonId(pub u32);

/// Unique identifier of an `AnimSampler`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct SamplerId(pub u64);

/// Parent index of a joint that hangs directly off the root transform
pub const NO_PARENT: u8 = 0xff;

/// Default number of matrices in a sampler's palette. The palette is sized
/// once so stepping never reallocates.
pub const MAX_JOINTS: usize = 64;

/// Trait for something that can turn a `SkeletonId` into skeleton data.
/// Samplers are given one of these when stepped rather than looking
/// skeletons up in a global table.
pub trait SkeletonProvider {
    fn resolve(&self, id: SkeletonId) -> Option<Arc<Skeleton>>;
}
