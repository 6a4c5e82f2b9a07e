mod batch;
mod component;
mod palette;
mod registry;
mod sampler;
mod types;
pub mod util;

// Re-exports
pub use {
    batch::step_all,
    component::AnimationComponent,
    palette::Palette,
    registry::SkeletonRegistry,
    sampler::{AnimSampler, SamplerState},
    types::{AnimClip, AnimPose, Joint, JointPose, SamplerOptions, Skeleton},
};
