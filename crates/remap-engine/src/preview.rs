//! Interactive preview over a computed result.
//!
//! A [`PreviewSession`] walks the published frames without recomputing
//! them. Each position resolves to a [`FramePass`]: the sub-frame to show
//! and the blur values to apply. [`PlaybackLoop`] cycles through the frames
//! at a fixed rate, and [`output_path`] names rendered frames so that a
//! cropped render keeps the numbering of the full one.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use retime_model::{RemapResult, SubFrame};

/// Navigation step sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSize {
    Single,
    Coarse,
    Jump,
}

impl StepSize {
    pub fn frames(&self) -> usize {
        match self {
            StepSize::Single => 1,
            StepSize::Coarse => 10,
            StepSize::Jump => 50,
        }
    }
}

/// Where the host cursor goes when a preview ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitMode {
    /// Back to the frame the preview started from.
    #[default]
    Back,
    /// To the timeline frame of the output position being previewed.
    FromIndex,
    /// To the remapped frame being previewed.
    Stay,
}

impl std::str::FromStr for ExitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "back" => Ok(ExitMode::Back),
            "from" | "from_index" | "from-index" => Ok(ExitMode::FromIndex),
            "stay" => Ok(ExitMode::Stay),
            other => Err(format!("unknown exit mode '{other}' (expected back|from|stay)")),
        }
    }
}

/// Blur values of one scene at a preview position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePass {
    pub scene: String,
    pub shutter: f64,
    pub samples: u32,
}

/// What the host applies to show one output frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePass {
    /// 0-based position in the published sequence.
    pub index: usize,
    /// Output frame number used for file naming.
    pub number: usize,
    /// Remapped frame to display.
    pub frame: f64,
    pub position: SubFrame,
    pub blur: Vec<ScenePass>,
}

/// Frame-by-frame navigation over a [`RemapResult`].
#[derive(Debug, Clone)]
pub struct PreviewSession<'r> {
    result: &'r RemapResult,
    index: usize,
}

impl<'r> PreviewSession<'r> {
    /// Start at the cursor's position, or at the first frame when the cursor
    /// is before the published window.
    pub fn new(result: &'r RemapResult) -> Self {
        let last = result.len().saturating_sub(1);
        let index = result.cursor.index().unwrap_or(0).min(last);
        Self { result, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Move back by `n`, stopping at the first frame. A zero step rewinds
    /// to the first frame.
    pub fn step_back(&mut self, n: usize) -> Option<FramePass> {
        self.index = match self.index.checked_sub(n) {
            Some(index) if n > 0 => index,
            _ => 0,
        };
        self.current()
    }

    /// Move forward by `n`, stopping at the last frame.
    pub fn step_forward(&mut self, n: usize) -> Option<FramePass> {
        let last = self.result.len().saturating_sub(1);
        self.index = self.index.saturating_add(n).min(last);
        self.current()
    }

    /// Move by a signed number of frames.
    pub fn step(&mut self, delta: i64) -> Option<FramePass> {
        let n = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        if delta < 0 {
            self.step_back(n)
        } else {
            self.step_forward(n)
        }
    }

    /// Resolve the current position, `None` for an empty result.
    pub fn current(&self) -> Option<FramePass> {
        frame_pass(self.result, self.index)
    }

    /// End the session and report where the host cursor should go.
    pub fn finish(self, mode: ExitMode) -> f64 {
        let result = self.result;
        match mode {
            ExitMode::Back => result.frame_current,
            ExitMode::FromIndex => {
                (result.frame_start + i64::from(result.skip_start) + self.index as i64) as f64
            }
            ExitMode::Stay => result
                .frames
                .get(self.index)
                .copied()
                .unwrap_or(result.frame_current),
        }
    }
}

/// Resolve output position `index` of `result`.
pub fn frame_pass(result: &RemapResult, index: usize) -> Option<FramePass> {
    let frame = *result.frames.get(index)?;
    let blur = result
        .blur
        .iter()
        .filter_map(|track| {
            let (shutter, samples) = track.at(index)?;
            Some(ScenePass {
                scene: track.scene.clone(),
                shutter,
                samples,
            })
        })
        .collect();

    Some(FramePass {
        index,
        number: output_frame_number(index, result.skip_start),
        frame,
        position: SubFrame::split(frame),
        blur,
    })
}

/// Endless cycle over the published frames.
#[derive(Debug, Clone)]
pub struct PlaybackLoop<'r> {
    frames: &'r [f64],
    counter: usize,
}

impl<'r> PlaybackLoop<'r> {
    pub fn new(result: &'r RemapResult) -> Self {
        Self {
            frames: &result.frames,
            counter: 0,
        }
    }

    /// Position of the frame returned by the next call to `next`.
    pub fn counter(&self) -> usize {
        self.counter
    }
}

impl Iterator for PlaybackLoop<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.counter >= self.frames.len() {
            self.counter = 0;
        }
        let frame = *self.frames.get(self.counter)?;
        self.counter += 1;
        Some(frame)
    }
}

/// Delay between playback ticks at `fps` frames per second.
pub fn tick_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

/// 1-based output frame number of position `index`, counted from the
/// uncropped start.
pub fn output_frame_number(index: usize, skip_start: u32) -> usize {
    index + skip_start as usize + 1
}

/// File path of output position `index`: `prefix` followed by the
/// zero-padded output frame number.
pub fn output_path(prefix: &str, index: usize, skip_start: u32, digits: usize) -> String {
    format!(
        "{prefix}{:0width$}",
        output_frame_number(index, skip_start),
        width = digits
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use retime_model::{BlurKind, BlurTrack, CursorPosition, RemapMode};

    fn result(number: i64) -> RemapResult {
        let frames: Vec<f64> = (0..100).map(|i| 1.0 + i as f64 * 0.5).collect();
        let mut track = BlurTrack::new("Main", BlurKind::Eevee);
        for i in 0..frames.len() {
            track.push(0.25, i as u32 + 1);
        }
        RemapResult {
            mode: RemapMode::Speed,
            total: frames.len(),
            uncropped_len: frames.len() + 3,
            frames,
            blur: vec![track],
            cursor: CursorPosition { number, actual: 0.0 },
            frame_start: 1,
            skip_start: 3,
            frame_current: 7.0,
        }
    }

    #[test]
    fn test_session_starts_at_cursor() {
        let r = result(5);
        assert_eq!(PreviewSession::new(&r).index(), 4);
        let r = result(0);
        assert_eq!(PreviewSession::new(&r).index(), 0);
    }

    #[test]
    fn test_navigation_clamps_at_ends() {
        let r = result(5);
        let mut session = PreviewSession::new(&r);
        session.step_back(StepSize::Coarse.frames());
        assert_eq!(session.index(), 0);
        session.step_forward(StepSize::Jump.frames());
        session.step_forward(StepSize::Jump.frames());
        assert_eq!(session.index(), 99);
        session.step(-1);
        assert_eq!(session.index(), 98);
    }

    #[test]
    fn test_step_back_zero_rewinds() {
        let r = result(20);
        let mut session = PreviewSession::new(&r);
        assert_eq!(session.step_back(5).unwrap().index, 14);
        assert_eq!(session.step_back(0).unwrap().index, 0);
        // A signed zero step is a forward step and stays put.
        session.step_forward(3);
        assert_eq!(session.step(0).unwrap().index, 3);
    }

    #[test]
    fn test_frame_pass_contents() {
        let r = result(4);
        let pass = PreviewSession::new(&r).current().unwrap();
        assert_eq!(pass.index, 3);
        assert_eq!(pass.number, 7);
        assert_eq!(pass.frame, 2.5);
        assert_eq!(pass.position.frame, 2);
        assert_eq!(pass.position.subframe, 0.5);
        assert_eq!(
            pass.blur,
            vec![ScenePass {
                scene: "Main".to_string(),
                shutter: 0.25,
                samples: 4,
            }]
        );
    }

    #[test]
    fn test_exit_modes() {
        let r = result(4);
        assert_eq!(PreviewSession::new(&r).finish(ExitMode::Back), 7.0);
        assert_eq!(PreviewSession::new(&r).finish(ExitMode::FromIndex), 7.0);
        assert_eq!(PreviewSession::new(&r).finish(ExitMode::Stay), 2.5);
        assert_eq!("from".parse::<ExitMode>().unwrap(), ExitMode::FromIndex);
    }

    #[test]
    fn test_playback_wraps() {
        let r = result(1);
        let played: Vec<f64> = PlaybackLoop::new(&r).skip(99).take(3).collect();
        assert_eq!(played, vec![50.5, 1.0, 1.5]);
        assert_eq!(tick_interval(25), Duration::from_millis(40));
    }

    #[test]
    fn test_empty_result_has_no_passes() {
        let mut r = result(1);
        r.frames.clear();
        r.blur.clear();
        assert!(PreviewSession::new(&r).current().is_none());
        assert_eq!(PlaybackLoop::new(&r).next(), None);
    }

    #[test]
    fn test_output_naming() {
        assert_eq!(output_frame_number(0, 0), 1);
        assert_eq!(output_frame_number(4, 3), 8);
        assert_eq!(output_path("render/frame_", 4, 3, 4), "render/frame_0008");
        assert_eq!(output_path("out_", 12345, 0, 4), "out_12346");
    }
}
