//! FRAMES mode: sample a target-frame curve once per output frame.
//!
//! Output frame `f` renders timeline frame `curve(f)`. Cropping happens up
//! front by narrowing the sampled window, so no second pass is needed.

use retime_model::{Curve, CursorPosition, RemapMode, RemapRequest, RemapResult};

use crate::blur::BlurRecorder;
use crate::crop::RangeCropper;
use crate::error::{RemapError, RemapOutcome};

/// Target-frame sampler for one request.
pub struct FrameSampler<'r, 'a> {
    request: &'r RemapRequest<'a>,
}

impl<'r, 'a> FrameSampler<'r, 'a> {
    pub fn new(request: &'r RemapRequest<'a>) -> Self {
        Self { request }
    }

    /// Sample the curve over `[frame_start + skip_start, frame_end + 1 - skip_end)`.
    pub fn sample(&self) -> RemapOutcome<RemapResult> {
        let request = self.request;
        let curve = request
            .remap_curve
            .curve()
            .ok_or(RemapError::MissingCurve)?;

        let (start, end) =
            RangeCropper::from_request(request).frame_window(request.frame_start, request.frame_end);
        if start >= end {
            tracing::warn!(start, end, "Sampling window is empty");
            return Err(RemapError::EmptyRange);
        }

        let points: Vec<f64> = (start..end).map(|f| f as f64).collect();
        let frames = curve.evaluate_many(&points);

        let mut recorder = BlurRecorder::new(request);
        if recorder.is_active() {
            for (step, frame) in local_steps(&frames).into_iter().zip(&frames) {
                recorder.record(step, *frame);
            }
        }

        let cursor = cursor_position(request, start, end, &frames);
        let uncropped_len = request
            .frame_end
            .saturating_sub(request.frame_start)
            .saturating_add(1)
            .max(0) as usize;

        tracing::debug!(
            start,
            end,
            total = frames.len(),
            cursor = cursor.number,
            "Frame sampling finished"
        );

        Ok(RemapResult {
            mode: RemapMode::Frames,
            total: frames.len(),
            frames,
            blur: recorder.into_tracks(),
            cursor,
            uncropped_len,
            frame_start: request.frame_start,
            skip_start: request.skip_start,
            frame_current: request.frame_current,
        })
    }
}

/// Local time derivative at each sample.
///
/// The ends use one-sided differences. Interior samples use the central
/// difference when the three neighbours are strictly monotonic and `0`
/// at turning points or plateaus. A single sample has no neighbours and
/// is treated as normal speed.
pub fn local_steps(frames: &[f64]) -> Vec<f64> {
    let n = frames.len();
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..n)
            .map(|i| {
                if i == 0 {
                    (frames[1] - frames[0]).abs()
                } else if i == n - 1 {
                    (frames[i] - frames[i - 1]).abs()
                } else {
                    let (prev, cur, next) = (frames[i - 1], frames[i], frames[i + 1]);
                    let monotonic = (prev < cur && cur < next) || (prev > cur && cur > next);
                    if monotonic {
                        (next - prev).abs() / 2.0
                    } else {
                        0.0
                    }
                }
            })
            .collect(),
    }
}

fn cursor_position(
    request: &RemapRequest<'_>,
    start: i64,
    end: i64,
    frames: &[f64],
) -> CursorPosition {
    let cursor = request.frame_current;
    let last = frames.last().copied().unwrap_or(CursorPosition::NOT_IN_RANGE);

    // Sub-frame cursors truncate toward zero, like `SubFrame::split`.
    // Float-to-int casts saturate, so infinite cursors stay finite here.
    let frame = cursor.trunc() as i64;

    if cursor < start as f64 {
        return CursorPosition {
            number: frame
                .saturating_sub(start)
                .saturating_add(request.frame_start),
            actual: CursorPosition::NOT_IN_RANGE,
        };
    }

    let offset = frame.saturating_sub(start);
    match usize::try_from(offset).ok().and_then(|i| frames.get(i)) {
        Some(&actual) if frame < end => CursorPosition {
            number: offset.saturating_add(1),
            actual,
        },
        _ => CursorPosition {
            number: frames.len() as i64,
            actual: last,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retime_model::{BlurKind, KeyframeCurve, ParamSource, SceneBlurState};

    fn frames_request<'a>(curve: &'a dyn Curve, current: f64) -> RemapRequest<'a> {
        RemapRequest::new(1, 10, current)
            .with_mode(RemapMode::Frames)
            .with_curve(ParamSource::Animated(curve))
    }

    fn identity(frame: f64) -> f64 {
        frame
    }

    #[test]
    fn test_local_steps_plateau_and_turns() {
        assert_eq!(local_steps(&[5.0, 5.0, 9.0]), vec![0.0, 0.0, 4.0]);
        assert_eq!(local_steps(&[1.0, 3.0, 5.0]), vec![2.0, 2.0, 2.0]);
        assert_eq!(local_steps(&[1.0, 4.0, 2.0]), vec![3.0, 0.0, 2.0]);
        assert_eq!(local_steps(&[9.0, 7.0, 5.0]), vec![2.0, 2.0, 2.0]);
        assert_eq!(local_steps(&[4.0]), vec![1.0]);
        assert!(local_steps(&[]).is_empty());
    }

    #[test]
    fn test_identity_curve() {
        let request = frames_request(&identity, 4.0);
        let result = FrameSampler::new(&request).sample().unwrap();
        assert_eq!(result.frames, (1..=10).map(f64::from).collect::<Vec<_>>());
        assert_eq!(result.cursor.number, 4);
        assert_eq!(result.cursor.actual, 4.0);
    }

    #[test]
    fn test_keyframed_ramp() {
        let curve = KeyframeCurve::linear(&[(1.0, 1.0), (10.0, 19.0)]);
        let request = frames_request(&curve, 1.0);
        let result = FrameSampler::new(&request).sample().unwrap();
        assert_eq!(result.total, 10);
        assert!((result.frames[2] - 5.0).abs() < 1e-9);
        assert!((result.frames[9] - 19.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_curve() {
        let request = RemapRequest::new(1, 10, 1.0).with_mode(RemapMode::Frames);
        assert_eq!(
            FrameSampler::new(&request).sample(),
            Err(RemapError::MissingCurve)
        );
    }

    #[test]
    fn test_crop_narrows_the_window() {
        let tenfold = |frame: f64| frame * 10.0;
        let request = frames_request(&tenfold, 5.0).with_crop(2, Some(-3));
        let result = FrameSampler::new(&request).sample().unwrap();
        assert_eq!(result.frames, vec![30.0, 40.0, 50.0, 60.0, 70.0]);
        assert_eq!(result.uncropped_len, 10);
        assert_eq!(result.cursor.number, 3);
        assert_eq!(result.cursor.actual, 50.0);
    }

    #[test]
    fn test_crop_everything_is_empty_range() {
        let request = frames_request(&identity, 1.0).with_crop(8, Some(-2));
        assert_eq!(
            FrameSampler::new(&request).sample(),
            Err(RemapError::EmptyRange)
        );
    }

    #[test]
    fn test_cursor_before_and_after_window() {
        let before = frames_request(&identity, 2.0).with_crop(3, None);
        let result = FrameSampler::new(&before).sample().unwrap();
        assert_eq!(result.cursor.number, -1);
        assert_eq!(result.cursor.actual, CursorPosition::NOT_IN_RANGE);

        let after = frames_request(&identity, 25.0);
        let result = FrameSampler::new(&after).sample().unwrap();
        assert_eq!(result.cursor.number, 10);
        assert_eq!(result.cursor.actual, 10.0);
    }

    #[test]
    fn test_subframe_cursor_truncates() {
        let double = |frame: f64| frame * 2.0 - 1.0;
        let request = frames_request(&double, 3.75);
        let result = FrameSampler::new(&request).sample().unwrap();
        assert_eq!(result.cursor.number, 3);
        assert_eq!(result.cursor.actual, 5.0);
    }

    #[test]
    fn test_negative_subframe_cursor_truncates_toward_zero() {
        let request = RemapRequest::new(-5, 5, -2.5)
            .with_mode(RemapMode::Frames)
            .with_curve(ParamSource::Animated(&identity));
        let result = FrameSampler::new(&request).sample().unwrap();
        // -2.5 sits on frame -2, the fourth sample of -5..=5.
        assert_eq!(result.cursor.number, 4);
        assert_eq!(result.cursor.actual, -2.0);
    }

    #[test]
    fn test_infinite_cursor_does_not_overflow() {
        let after = frames_request(&identity, f64::INFINITY);
        let result = FrameSampler::new(&after).sample().unwrap();
        assert_eq!(result.cursor.number, 10);

        let before = frames_request(&identity, f64::NEG_INFINITY);
        let result = FrameSampler::new(&before).sample().unwrap();
        assert_eq!(result.cursor.actual, CursorPosition::NOT_IN_RANGE);
    }

    #[test]
    fn test_extreme_end_crop_is_empty_range() {
        let request = frames_request(&identity, 1.0).with_crop(0, Some(i64::MIN));
        assert_eq!(
            FrameSampler::new(&request).sample(),
            Err(RemapError::EmptyRange)
        );

        let request = RemapRequest::new(1, i64::MAX, 1.0)
            .with_mode(RemapMode::Frames)
            .with_curve(ParamSource::Animated(&identity))
            .with_crop(0, Some(i64::MIN));
        assert_eq!(
            FrameSampler::new(&request).sample(),
            Err(RemapError::EmptyRange)
        );
    }

    #[test]
    fn test_hold_freezes_blur() {
        let hold = |_: f64| 5.0;
        let request = frames_request(&hold, 1.0)
            .with_scene(SceneBlurState::new("Main", BlurKind::Eevee, 0.5, 16.0));
        let result = FrameSampler::new(&request).sample().unwrap();
        let track = result.track("Main").unwrap();
        assert_eq!(track.len(), 10);
        assert!(track.shutter.iter().all(|&s| s == 0.0));
        assert!(track.samples.iter().all(|&s| s == 1));
    }
}
