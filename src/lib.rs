//! Skeletal animation sampling and transform hierarchy.
//!
//! An `AnimSampler` plays one `AnimClip` against the `Skeleton` it names.
//! Each `step` turns a global time into clip time, blends the keyframes on
//! either side, composes joints down the hierarchy and leaves a palette of
//! skinning matrices for a renderer to upload.
//!
//! Matrices follow `nalgebra_glm` conventions: column vectors, so a child
//! joint's world matrix is `parent * local` and translation is in column 3.
pub mod anim;
pub mod rc_error;
pub mod scene;
pub mod transform;
pub mod types;
pub mod util;
