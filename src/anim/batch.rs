use super::sampler::AnimSampler;
use crate::{rc_error::RcError, types::SkeletonProvider};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Steps every sampler to the same global time. Samplers share nothing
/// but read only clip and skeleton data, so with the "rayon" feature they
/// are stepped in parallel.
///
/// # Errors
/// Returns the first `RcError` hit by any sampler. With "rayon" other
/// samplers may or may not have been stepped when that happens.
pub fn step_all<P>(
    samplers: &mut [AnimSampler],
    global_time: f32,
    skeletons: &P,
) -> Result<(), RcError>
where
    P: SkeletonProvider + Sync + ?Sized,
{
    #[cfg(feature = "rayon")]
    let it = samplers.par_iter_mut();
    #[cfg(not(feature = "rayon"))]
    let mut it = samplers.iter_mut();
    it.try_for_each(|sampler| sampler.step(global_time, skeletons))
}
