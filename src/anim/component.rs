use super::{
    palette::Palette,
    sampler::AnimSampler,
    types::{AnimClip, SamplerOptions},
};
use crate::{rc_error::RcError, types::SkeletonProvider};
use ahash::AHashMap;
use log::{debug, error};
use std::sync::Arc;

/// A weight ramp started by `blend_playback`
#[derive(Clone, Copy, Debug)]
struct Fade {
    from: f32,
    to: f32,
    start: f32,
    length: f32,
}

impl Fade {
    fn weight_at(&self, global_time: f32) -> (f32, bool) {
        let progress = if self.length > 0.0f32 {
            ((global_time - self.start) / self.length).clamp(0.0f32, 1.0f32)
        } else {
            1.0f32
        };
        (
            (self.to - self.from).mul_add(progress, self.from),
            progress >= 1.0f32,
        )
    }
}

/// Handles playback of named clips on a game object. Clips are added once
/// and then played back by name.
///
/// `blend_playback` switching to another clip keeps the previous sampler
/// running, and `palette` is then the two palettes blended by the weight of
/// the incoming sampler. The previous sampler is dropped once that weight
/// reaches 1 or another clip is played.
#[derive(Debug)]
pub struct AnimationComponent {
    clips: AHashMap<String, Arc<AnimClip>>,
    sampler: AnimSampler,
    outgoing: Option<AnimSampler>,
    playing: Option<String>,
    fade: Option<Fade>,
    blended: Palette,
}

impl Default for AnimationComponent {
    fn default() -> Self {
        Self::new(AnimSampler::new())
    }
}

impl AnimationComponent {
    #[must_use]
    pub fn new(sampler: AnimSampler) -> Self {
        let blended = Palette::new(sampler.palette().len());
        Self {
            clips: AHashMap::new(),
            sampler,
            outgoing: None,
            playing: None,
            fade: None,
            blended,
        }
    }

    /// Adds a clip to play back later. Replaces any clip with the same name.
    pub fn add_clip(&mut self, name: &str, clip: Arc<AnimClip>) {
        self.clips.insert(name.to_string(), clip);
    }

    fn find_clip(&self, name: &str) -> Result<Arc<AnimClip>, RcError> {
        self.clips.get(name).cloned().ok_or_else(|| {
            error!("no clip named {:?}", name);
            RcError::UnknownClip(name.to_string())
        })
    }

    /// Starts the named clip from its beginning at `global_time`. Any blend
    /// in progress is abandoned.
    ///
    /// # Errors
    /// Returns `RcError::UnknownClip` if no clip has that name
    pub fn playback(
        &mut self,
        name: &str,
        global_time: f32,
    ) -> Result<(), RcError> {
        let clip = self.find_clip(name)?;
        self.outgoing = None;
        self.fade = None;
        self.start(name, clip, global_time);
        Ok(())
    }

    fn start(&mut self, name: &str, clip: Arc<AnimClip>, global_time: f32) {
        self.sampler.set_clip(clip);
        self.sampler.play(global_time);
        self.playing = Some(name.to_string());
    }

    #[must_use]
    pub fn is_playing_back(&self, name: &str) -> bool {
        self.sampler.state.enabled && self.playing.as_deref() == Some(name)
    }

    /// True while a previous clip is still being blended out
    #[must_use]
    pub const fn is_blending(&self) -> bool {
        self.outgoing.is_some()
    }

    /// Fades the sampler weight to `target_weight` over `fade_len` seconds.
    ///
    /// If the named clip isn't already playing it is started with a weight
    /// of zero on a fresh sampler, and whatever was playing keeps running
    /// underneath to blend from.
    ///
    /// # Errors
    /// Returns `RcError::UnknownClip` if no clip has that name
    pub fn blend_playback(
        &mut self,
        name: &str,
        target_weight: f32,
        fade_len: f32,
        global_time: f32,
    ) -> Result<(), RcError> {
        if !self.is_playing_back(name) {
            let clip = self.find_clip(name)?;
            let incoming = AnimSampler::with_options(&SamplerOptions {
                enabled: true,
                playback_rate: self.sampler.state.playback_rate,
                weight: 0.0f32,
                palette_capacity: self.sampler.palette().len(),
            });
            let previous = std::mem::replace(&mut self.sampler, incoming);
            let was_playing = self.playing.is_some()
                && previous.state.enabled
                && previous.clip().is_some();
            if was_playing {
                // Shown until the first update blends anything
                self.blended.clone_from(previous.palette());
            }
            self.outgoing = was_playing.then_some(previous);
            self.start(name, clip, global_time);
            self.sampler.state.weight = 0.0f32;
        }
        debug!(
            "blend {:?} weight {} -> {} over {}",
            name, self.sampler.state.weight, target_weight, fade_len
        );
        self.fade = Some(Fade {
            from: self.sampler.state.weight,
            to: target_weight,
            start: global_time,
            length: fade_len,
        });
        Ok(())
    }

    /// Applies any fade in progress, steps the sampler and the one being
    /// blended out, then blends their palettes
    ///
    /// # Errors
    /// May return `RcError` from `AnimSampler::step`
    pub fn update<P>(
        &mut self,
        global_time: f32,
        skeletons: &P,
    ) -> Result<(), RcError>
    where
        P: SkeletonProvider + ?Sized,
    {
        if let Some(fade) = self.fade {
            let (weight, done) = fade.weight_at(global_time);
            self.sampler.state.weight = weight;
            if done {
                self.fade = None;
                if weight >= 1.0f32 && self.outgoing.take().is_some() {
                    debug!("blend to {:?} finished", self.playing);
                }
            }
        }
        self.sampler.step(global_time, skeletons)?;
        if let Some(outgoing) = self.outgoing.as_mut() {
            outgoing.step(global_time, skeletons)?;
            self.blended.blend(
                outgoing.palette(),
                self.sampler.palette(),
                self.sampler.state.weight,
            );
        }
        Ok(())
    }

    #[must_use]
    pub const fn sampler(&self) -> &AnimSampler {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut AnimSampler {
        &mut self.sampler
    }

    /// Skinning matrices for this object. While blending this is the mix of
    /// the outgoing and incoming clips, otherwise the sampler's own palette.
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        if self.outgoing.is_some() {
            &self.blended
        } else {
            self.sampler.palette()
        }
    }
}
