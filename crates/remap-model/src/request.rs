//! Remap requests and results.
//!
//! A [`RemapRequest`] is everything the engine needs for one invocation;
//! a [`RemapResult`] is everything it hands back. There is no other state.

use serde::{Deserialize, Serialize};

use crate::curve::ParamSource;
use crate::scene::{BlurKind, BlurSourceProvider, SceneBlurState};

/// Which parameter drives the remap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemapMode {
    /// Integrate a playback speed (percent of normal speed).
    #[default]
    Speed,
    /// Sample a target-frame curve at every output frame.
    Frames,
}

impl RemapMode {
    /// Name of the parameter the mode reads.
    pub fn parameter(&self) -> &'static str {
        match self {
            RemapMode::Speed => "speed",
            RemapMode::Frames => "frame",
        }
    }
}

impl std::str::FromStr for RemapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "speed" => Ok(RemapMode::Speed),
            "frames" | "frame" => Ok(RemapMode::Frames),
            other => Err(format!("unknown remap mode '{other}' (expected speed|frames)")),
        }
    }
}

/// Input of one engine invocation.
#[derive(Debug, Clone)]
pub struct RemapRequest<'a> {
    /// Whether time remapping is turned on for the scene.
    pub enabled: bool,

    /// First frame of the scene range (inclusive).
    pub frame_start: i64,
    /// Last frame of the scene range (inclusive).
    pub frame_end: i64,
    /// The host's current (sub-)frame cursor.
    pub frame_current: f64,

    /// Frames cropped from the start of the published sequence.
    pub skip_start: u32,
    /// Frames cropped from the end, as a non-positive offset. `None` and
    /// `Some(0)` both mean no crop.
    pub skip_end: Option<i64>,

    pub mode: RemapMode,

    /// Scalar speed in percent, used in SPEED mode when not animated.
    pub speed: f64,
    /// Speed curve (SPEED mode) or target-frame curve (FRAMES mode).
    pub remap_curve: ParamSource<'a>,

    /// Scalar blur-stretch compensation in `[0, 1]`.
    pub blur_stretch: f64,
    /// Animated blur-stretch compensation.
    pub blur_stretch_curve: ParamSource<'a>,

    pub blur_source: BlurSourceProvider,
    pub scenes: Vec<SceneBlurState<'a>>,
}

impl<'a> RemapRequest<'a> {
    /// A SPEED-mode request at constant normal speed with no blur and no crop.
    pub fn new(frame_start: i64, frame_end: i64, frame_current: f64) -> Self {
        Self {
            enabled: true,
            frame_start,
            frame_end,
            frame_current,
            skip_start: 0,
            skip_end: None,
            mode: RemapMode::Speed,
            speed: 100.0,
            remap_curve: ParamSource::Static,
            blur_stretch: 1.0,
            blur_stretch_curve: ParamSource::Static,
            blur_source: BlurSourceProvider::NativeEngineBlur,
            scenes: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: RemapMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_speed(mut self, percent: f64) -> Self {
        self.speed = percent;
        self
    }

    pub fn with_curve(mut self, source: ParamSource<'a>) -> Self {
        self.remap_curve = source;
        self
    }

    pub fn with_crop(mut self, skip_start: u32, skip_end: Option<i64>) -> Self {
        self.skip_start = skip_start;
        self.skip_end = skip_end;
        self
    }

    pub fn with_blur_stretch(mut self, factor: f64, curve: ParamSource<'a>) -> Self {
        self.blur_stretch = factor;
        self.blur_stretch_curve = curve;
        self
    }

    pub fn with_scene(mut self, scene: SceneBlurState<'a>) -> Self {
        self.scenes.push(scene);
        self
    }

    /// Scenes whose motion blur is enabled, in request order.
    pub fn blur_scenes(&self) -> impl Iterator<Item = &SceneBlurState<'a>> {
        self.scenes.iter().filter(|s| s.blur_enabled)
    }
}

/// Where the host cursor lands in the published sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    /// 1-based position within the cropped sequence. `0` or negative when
    /// the cursor is before the published window.
    pub number: i64,
    /// Remapped frame value at that position, or `-1.0` when the cursor has
    /// not reached the range yet (FRAMES mode).
    pub actual: f64,
}

impl CursorPosition {
    pub const NOT_IN_RANGE: f64 = -1.0;

    /// 0-based index into `frames`, when the cursor is inside the window.
    pub fn index(&self) -> Option<usize> {
        if self.number >= 1 {
            Some((self.number - 1) as usize)
        } else {
            None
        }
    }
}

/// Stretched blur parameters of one scene, parallel to the frame list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurTrack {
    pub scene: String,
    pub kind: BlurKind,
    pub shutter: Vec<f64>,
    pub samples: Vec<u32>,
}

impl BlurTrack {
    pub fn new(scene: impl Into<String>, kind: BlurKind) -> Self {
        Self {
            scene: scene.into(),
            kind,
            shutter: Vec::new(),
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, shutter: f64, samples: u32) {
        self.shutter.push(shutter);
        self.samples.push(samples);
    }

    pub fn len(&self) -> usize {
        self.shutter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shutter.is_empty()
    }

    /// Shutter and samples at `index`.
    pub fn at(&self, index: usize) -> Option<(f64, u32)> {
        Some((*self.shutter.get(index)?, *self.samples.get(index)?))
    }
}

/// Output of one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemapResult {
    pub mode: RemapMode,
    /// Remapped (sub-)frames to render, in output order.
    pub frames: Vec<f64>,
    /// One track per blur-enabled scene, each as long as `frames`.
    pub blur: Vec<BlurTrack>,
    pub cursor: CursorPosition,
    /// Published (post-crop) frame count.
    pub total: usize,
    /// Frame count before cropping.
    pub uncropped_len: usize,
    /// First frame of the scene range.
    pub frame_start: i64,
    /// Crop applied at the front, kept for output numbering.
    pub skip_start: u32,
    /// The request's cursor, kept so navigation can return to it.
    pub frame_current: f64,
}

impl RemapResult {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn track(&self, scene: &str) -> Option<&BlurTrack> {
        self.blur.iter().find(|t| t.scene == scene)
    }
}

/// A real frame split into the integer frame and the sub-frame fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubFrame {
    pub frame: i64,
    /// Fraction in `(-1, 1)` carrying the sign of the input.
    pub subframe: f64,
}

impl SubFrame {
    /// Split by truncation toward zero, the way timeline hosts position
    /// themselves at a sub-frame.
    pub fn split(value: f64) -> Self {
        let frame = value.trunc();
        Self {
            frame: frame as i64,
            subframe: value - frame,
        }
    }

    pub fn value(&self) -> f64 {
        self.frame as f64 + self.subframe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("SPEED".parse::<RemapMode>().unwrap(), RemapMode::Speed);
        assert_eq!("frames".parse::<RemapMode>().unwrap(), RemapMode::Frames);
        assert!("warp".parse::<RemapMode>().is_err());
    }

    #[test]
    fn test_request_builder() {
        let req = RemapRequest::new(1, 10, 5.0)
            .with_speed(50.0)
            .with_crop(2, Some(-1))
            .with_scene(SceneBlurState::new("A", BlurKind::Eevee, 0.5, 8.0))
            .with_scene(SceneBlurState::new("B", BlurKind::Cycles, 0.5, 0.0).disabled());
        assert_eq!(req.speed, 50.0);
        assert_eq!(req.skip_start, 2);
        assert_eq!(req.blur_scenes().count(), 1);
    }

    #[test]
    fn test_cursor_index() {
        let inside = CursorPosition {
            number: 3,
            actual: 2.5,
        };
        assert_eq!(inside.index(), Some(2));
        let before = CursorPosition {
            number: 0,
            actual: CursorPosition::NOT_IN_RANGE,
        };
        assert_eq!(before.index(), None);
    }

    #[test]
    fn test_subframe_split() {
        let split = SubFrame::split(12.25);
        assert_eq!(split.frame, 12);
        assert!((split.subframe - 0.25).abs() < 1e-9);

        let negative = SubFrame::split(-2.5);
        assert_eq!(negative.frame, -2);
        assert!((negative.subframe + 0.5).abs() < 1e-9);
        assert!((negative.value() + 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_blur_track_access() {
        let mut track = BlurTrack::new("Main", BlurKind::Eevee);
        track.push(0.5, 8);
        track.push(0.25, 4);
        assert_eq!(track.len(), 2);
        assert_eq!(track.at(1), Some((0.25, 4)));
        assert_eq!(track.at(2), None);
    }
}
