//! Motion-blur stretching.
//!
//! When remapped time advances by less than one frame per output frame
//! (slow motion), the shutter and sample budget shrink with it so that blur
//! trails match the motion that is actually shown.
//!
//! ```text
//! factor  = 1 - (1 - |step|) * compensation
//! shutter = factor * base_shutter
//! samples = max(1, round(factor * base_samples))
//! ```
//!
//! `step` is the local time derivative at the output frame; `compensation`
//! is the blur-stretch amount in `[0, 1]` (0 leaves blur untouched).

use retime_model::{BlurTrack, Curve, ParamSource, RemapRequest, SceneBlurState};

/// Stretched blur parameters for one scene at one output frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurSample {
    pub shutter: f64,
    pub samples: u32,
}

/// Computes stretched shutter/sample pairs.
#[derive(Clone, Copy)]
pub struct BlurStretch<'a> {
    factor: f64,
    curve: Option<&'a dyn Curve>,
}

impl<'a> BlurStretch<'a> {
    /// Create a calculator from the scalar compensation and its optional
    /// curve. The scalar is clamped to `[0, 1]`.
    pub fn new(factor: f64, source: ParamSource<'a>) -> Self {
        let clamped = clamp_compensation(factor);
        if clamped != factor {
            tracing::warn!(factor, clamped, "Blur-stretch factor outside [0, 1]");
        }
        Self {
            factor: clamped,
            curve: source.curve(),
        }
    }

    pub fn from_request(request: &RemapRequest<'a>) -> Self {
        Self::new(request.blur_stretch, request.blur_stretch_curve)
    }

    /// Compensation amount at `frame`, in `[0, 1]`.
    pub fn compensation(&self, frame: f64) -> f64 {
        match self.curve {
            Some(curve) => clamp_compensation(curve.evaluate(frame)),
            None => self.factor,
        }
    }

    /// Scale applied to the base shutter and samples.
    pub fn stretch_factor(&self, step: f64, frame: f64) -> f64 {
        1.0 - (1.0 - step.abs()) * self.compensation(frame)
    }

    /// Stretched blur parameters of `scene` for a local derivative `step`
    /// at time coordinate `frame`.
    pub fn compute(&self, scene: &SceneBlurState<'_>, step: f64, frame: f64) -> BlurSample {
        let factor = self.stretch_factor(step, frame);
        BlurSample {
            shutter: factor * scene.base_shutter(frame),
            samples: round_samples(factor * scene.base_samples(frame)),
        }
    }
}

/// Round a sample count to the nearest integer, never below 1.
///
/// Ties go to the even neighbour, so half speed over an odd base count
/// (`2.5`, `3.5`) lands on 2 and 4.
pub fn round_samples(value: f64) -> u32 {
    // f64::max ignores NaN, so a NaN sample count also lands on 1.
    value.round_ties_even().max(1.0).min(u32::MAX as f64) as u32
}

fn clamp_compensation(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Accumulates one blur track per blur-enabled scene.
pub struct BlurRecorder<'r, 'a> {
    stretch: BlurStretch<'a>,
    scenes: Vec<(&'r SceneBlurState<'a>, BlurTrack)>,
}

impl<'r, 'a> BlurRecorder<'r, 'a> {
    pub fn new(request: &'r RemapRequest<'a>) -> Self {
        let scenes = request
            .blur_scenes()
            .map(|scene| (scene, BlurTrack::new(scene.name.clone(), scene.kind)))
            .collect();
        Self {
            stretch: BlurStretch::from_request(request),
            scenes,
        }
    }

    /// Whether any scene needs blur values at all.
    pub fn is_active(&self) -> bool {
        !self.scenes.is_empty()
    }

    /// Append one output frame's blur values to every track.
    pub fn record(&mut self, step: f64, frame: f64) {
        let stretch = self.stretch;
        for (scene, track) in self.scenes.iter_mut() {
            let sample = stretch.compute(scene, step, frame);
            track.push(sample.shutter, sample.samples);
        }
    }

    pub fn into_tracks(self) -> Vec<BlurTrack> {
        self.scenes.into_iter().map(|(_, track)| track).collect()
    }
}
