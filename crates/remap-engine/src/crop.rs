//! Cropping integrated sequences to the published window.

use std::ops::Range;

use retime_model::{BlurTrack, CursorPosition, RemapMode, RemapRequest, RemapResult};

use crate::error::{RemapError, RemapOutcome};
use crate::speed::{CursorCapture, IntegratedSequence};

/// Drops `skip_start` frames from the front and `skip_end` from the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCropper {
    skip_start: usize,
    skip_end: usize,
}

impl RangeCropper {
    /// `skip_end` is a non-positive offset from the end; `None` and `Some(0)`
    /// mean no crop. Positive values are ignored with a warning.
    pub fn new(skip_start: u32, skip_end: Option<i64>) -> Self {
        let skip_end = match skip_end {
            Some(end) if end > 0 => {
                tracing::warn!(skip_end = end, "Positive end crop ignored");
                0
            }
            Some(end) => usize::try_from(end.unsigned_abs()).unwrap_or(usize::MAX),
            None => 0,
        };
        Self {
            skip_start: skip_start as usize,
            skip_end,
        }
    }

    pub fn from_request(request: &RemapRequest<'_>) -> Self {
        Self::new(request.skip_start, request.skip_end)
    }

    pub fn skip_start(&self) -> usize {
        self.skip_start
    }

    /// Magnitude of the end crop.
    pub fn skip_end(&self) -> usize {
        self.skip_end
    }

    /// Published length for `raw_len` integrated frames. Zero or negative
    /// means nothing is left to render. Saturates for extreme crops.
    pub fn published_len(&self, raw_len: usize) -> i64 {
        to_i64(raw_len)
            .saturating_sub(to_i64(self.skip_start))
            .saturating_sub(to_i64(self.skip_end))
    }

    /// Timeline window `[start, end)` left after cropping
    /// `[frame_start, frame_end]`. Empty when `start >= end`.
    pub fn frame_window(&self, frame_start: i64, frame_end: i64) -> (i64, i64) {
        let start = frame_start.saturating_add(to_i64(self.skip_start));
        let end = frame_end
            .saturating_add(1)
            .saturating_sub(to_i64(self.skip_end));
        (start, end)
    }

    /// Index window kept out of `raw_len` frames.
    pub fn window(&self, raw_len: usize) -> Option<Range<usize>> {
        if self.published_len(raw_len) <= 0 {
            return None;
        }
        Some(self.skip_start..raw_len - self.skip_end)
    }

    /// Crop a sequence. Empty when nothing survives.
    pub fn crop<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.window(items.len())
            .and_then(|window| items.get(window))
            .map(<[T]>::to_vec)
            .unwrap_or_default()
    }

    /// Crop an integrated SPEED sequence and resolve the cursor against the
    /// published window.
    pub fn apply(
        &self,
        sequence: IntegratedSequence,
        request: &RemapRequest<'_>,
    ) -> RemapOutcome<RemapResult> {
        let uncropped_len = sequence.frames.len();
        if self.window(uncropped_len).is_none() {
            tracing::warn!(
                uncropped_len,
                skip_start = self.skip_start,
                skip_end = self.skip_end,
                "Crop leaves no frames"
            );
            return Err(RemapError::EmptyRange);
        }

        let frames = self.crop(&sequence.frames);
        let (first, last) = match (frames.first(), frames.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(RemapError::EmptyRange),
        };
        let total = frames.len();

        let blur = sequence
            .blur
            .into_iter()
            .map(|track| BlurTrack {
                shutter: self.crop(&track.shutter),
                samples: self.crop(&track.samples),
                ..track
            })
            .collect();

        let cursor = self.resolve_cursor(sequence.cursor, first, last, total);

        Ok(RemapResult {
            mode: RemapMode::Speed,
            frames,
            blur,
            cursor,
            total,
            uncropped_len,
            frame_start: request.frame_start,
            skip_start: request.skip_start,
            frame_current: request.frame_current,
        })
    }

    fn resolve_cursor(
        &self,
        capture: CursorCapture,
        first: f64,
        last: f64,
        total: usize,
    ) -> CursorPosition {
        let cursor = match capture {
            CursorCapture::Captured {
                emitted, current, ..
            } if emitted >= self.skip_start => CursorPosition {
                number: (emitted - self.skip_start) as i64 + 1,
                actual: current,
            },
            // Reached before the window opened: pin to its first frame.
            CursorCapture::Captured { previous, .. } => CursorPosition {
                number: 0,
                actual: if previous < first { first } else { previous },
            },
            CursorCapture::BeforeRange => CursorPosition {
                number: 0,
                actual: first,
            },
            CursorCapture::AfterRange => CursorPosition {
                number: total as i64,
                actual: last,
            },
        };

        if cursor.number >= total as i64 {
            CursorPosition {
                number: total as i64,
                actual: last,
            }
        } else {
            cursor
        }
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retime_model::BlurKind;

    fn sequence(frames: Vec<f64>, cursor: CursorCapture) -> IntegratedSequence {
        let mut track = BlurTrack::new("Main", BlurKind::Eevee);
        for (i, _) in frames.iter().enumerate() {
            track.push(i as f64 / 10.0, i as u32 + 1);
        }
        IntegratedSequence {
            source_time: frames.clone(),
            frames,
            blur: vec![track],
            cursor,
        }
    }

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    #[test]
    fn test_no_crop_is_identity() {
        let cropper = RangeCropper::new(0, None);
        let frames = one_to_ten();
        assert_eq!(cropper.crop(&frames), frames);
        assert_eq!(RangeCropper::new(0, Some(0)), cropper);
    }

    #[test]
    fn test_crop_both_ends() {
        let cropper = RangeCropper::new(2, Some(-3));
        assert_eq!(cropper.crop(&one_to_ten()), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(cropper.published_len(10), 5);
    }

    #[test]
    fn test_positive_end_crop_is_ignored() {
        assert_eq!(RangeCropper::new(1, Some(4)).skip_end(), 0);
    }

    #[test]
    fn test_crop_everything_is_empty_range() {
        let request = RemapRequest::new(1, 10, 1.0).with_crop(6, Some(-4));
        let cropper = RangeCropper::from_request(&request);
        let seq = sequence(one_to_ten(), CursorCapture::BeforeRange);
        assert_eq!(cropper.apply(seq, &request), Err(RemapError::EmptyRange));
        assert!(cropper.crop(&one_to_ten()).is_empty());
    }

    #[test]
    fn test_extreme_end_crop_is_empty_range() {
        let request = RemapRequest::new(1, 10, 1.0).with_crop(u32::MAX, Some(i64::MIN));
        let cropper = RangeCropper::from_request(&request);
        assert_eq!(cropper.published_len(10), i64::MIN);
        let seq = sequence(one_to_ten(), CursorCapture::BeforeRange);
        assert_eq!(cropper.apply(seq, &request), Err(RemapError::EmptyRange));
        assert!(cropper.crop(&one_to_ten()).is_empty());

        let (start, end) = cropper.frame_window(1, i64::MAX);
        assert!(start >= end);
    }

    #[test]
    fn test_blur_tracks_are_cropped_with_frames() {
        let request = RemapRequest::new(1, 10, 1.0).with_crop(2, Some(-1));
        let seq = sequence(one_to_ten(), CursorCapture::BeforeRange);
        let result = RangeCropper::from_request(&request).apply(seq, &request).unwrap();
        assert_eq!(result.total, 7);
        assert_eq!(result.uncropped_len, 10);
        let track = result.track("Main").unwrap();
        assert_eq!(track.len(), 7);
        assert_eq!(track.samples[0], 3);
    }

    #[test]
    fn test_cursor_inside_window_is_renumbered() {
        let request = RemapRequest::new(1, 10, 6.0).with_crop(2, None);
        let seq = sequence(
            one_to_ten(),
            CursorCapture::Captured {
                emitted: 5,
                current: 6.0,
                previous: 5.0,
            },
        );
        let result = RangeCropper::from_request(&request).apply(seq, &request).unwrap();
        assert_eq!(result.cursor.number, 4);
        assert_eq!(result.cursor.actual, 6.0);
        assert_eq!(result.frames[3], 6.0);
    }

    #[test]
    fn test_cursor_before_window_pins_to_first_frame() {
        let request = RemapRequest::new(1, 10, 2.0).with_crop(4, None);
        let seq = sequence(
            one_to_ten(),
            CursorCapture::Captured {
                emitted: 1,
                current: 2.0,
                previous: 1.0,
            },
        );
        let result = RangeCropper::from_request(&request).apply(seq, &request).unwrap();
        assert_eq!(result.cursor.number, 0);
        assert_eq!(result.cursor.actual, 5.0);
    }

    #[test]
    fn test_cursor_past_window_is_clamped_to_total() {
        let request = RemapRequest::new(1, 10, 9.0).with_crop(0, Some(-3));
        let seq = sequence(
            one_to_ten(),
            CursorCapture::Captured {
                emitted: 8,
                current: 9.0,
                previous: 8.0,
            },
        );
        let result = RangeCropper::from_request(&request).apply(seq, &request).unwrap();
        assert_eq!(result.cursor.number, 7);
        assert_eq!(result.cursor.actual, 7.0);
    }

    #[test]
    fn test_uncaptured_cursor_fallbacks() {
        let request = RemapRequest::new(1, 10, 1.0);
        let cropper = RangeCropper::from_request(&request);

        let before = cropper
            .apply(sequence(one_to_ten(), CursorCapture::BeforeRange), &request)
            .unwrap();
        assert_eq!(before.cursor.number, 0);
        assert_eq!(before.cursor.actual, 1.0);

        let after = cropper
            .apply(sequence(one_to_ten(), CursorCapture::AfterRange), &request)
            .unwrap();
        assert_eq!(after.cursor.number, 10);
        assert_eq!(after.cursor.actual, 10.0);
    }
}
