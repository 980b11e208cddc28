//! SPEED mode: integrate a playback speed into remapped frames.
//!
//! # Algorithm
//!
//! Starting at `frame_start`, each iteration:
//!
//! 1. **Emit** the current remapped frame.
//! 2. **Step**: evaluate the speed (percent) at the integer source frame and
//!    scale it to frames per output frame.
//! 3. **Stall guard**: a step smaller than [`MIN_STEP`] is forced to
//!    `±MIN_STEP` so the loop always covers ground. The sign comes from a
//!    lookahead just past the covered distance. When speed is exactly zero
//!    both now and ahead, the emitted frame holds still while coverage still
//!    advances.
//! 4. **Blur**: record stretched blur values using the unforced step.
//! 5. **Advance** the emitted frame by the signed step and the covered
//!    distance by its magnitude.
//! 6. **Cursor**: remember where the host cursor falls.
//!
//! Integration stops once the covered distance exceeds the scene length plus
//! [`RANGE_TOLERANCE`]. Because coverage grows by at least `MIN_STEP` every
//! iteration, the loop is bounded by `(length + RANGE_TOLERANCE) / MIN_STEP`
//! iterations whatever the curve does.

use retime_model::{BlurTrack, RemapRequest};

use crate::blur::BlurRecorder;

/// Slack added to the scene length to absorb floating-point accumulation.
pub const RANGE_TOLERANCE: f64 = 0.01;

/// Smallest step the integrator takes, in frames.
pub const MIN_STEP: f64 = 0.01;

/// Distance past the covered range at which the stall guard looks ahead.
pub const LOOKAHEAD: f64 = 0.011;

/// Speed values are percentages of normal playback.
const PERCENT: f64 = 0.01;

/// Where the host cursor landed during integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorCapture {
    /// The cursor fell inside the source window of an iteration.
    Captured {
        /// Frames emitted when the cursor was reached; the cursor maps to
        /// the frame emitted next.
        emitted: usize,
        /// The remapped frame the cursor maps to.
        current: f64,
        /// The last frame emitted before reaching the cursor.
        previous: f64,
    },
    /// Never captured: the cursor precedes the first source window.
    BeforeRange,
    /// Never captured: the cursor lies past the integrated range.
    AfterRange,
}

/// Uncropped output of the integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratedSequence {
    /// Emitted remapped frames.
    pub frames: Vec<f64>,
    /// Covered source time at each emission. Strictly increasing.
    pub source_time: Vec<f64>,
    /// One track per blur-enabled scene, parallel to `frames`.
    pub blur: Vec<BlurTrack>,
    pub cursor: CursorCapture,
}

/// Speed integrator for one request.
pub struct SpeedIntegrator<'r, 'a> {
    request: &'r RemapRequest<'a>,
}

impl<'r, 'a> SpeedIntegrator<'r, 'a> {
    pub fn new(request: &'r RemapRequest<'a>) -> Self {
        Self { request }
    }

    /// Speed in percent at `frame`, from the curve or the scalar fallback.
    fn speed_at(&self, frame: f64) -> f64 {
        let speed = self
            .request
            .remap_curve
            .value_or(frame, self.request.speed);
        if speed.is_nan() {
            0.0
        } else {
            speed
        }
    }

    /// Run the integration.
    pub fn integrate(&self) -> IntegratedSequence {
        let request = self.request;
        let length = request.frame_end.saturating_sub(request.frame_start);
        let target = length as f64 + RANGE_TOLERANCE;
        let cursor = request.frame_current;

        let mut frames = Vec::new();
        let mut source_time = Vec::new();
        let mut recorder = BlurRecorder::new(request);
        let mut capture = None;

        let mut current = request.frame_start as f64;
        let mut actual = request.frame_start as f64;
        let mut covered = 0.0;
        let mut source_frame = request.frame_start;

        while covered <= target {
            let emitted = current;
            frames.push(emitted);
            source_time.push(actual);

            let raw = PERCENT * self.speed_at(source_frame as f64);
            let (step, zero_step) = guard_step(raw, || self.speed_at(actual + LOOKAHEAD));

            if recorder.is_active() {
                recorder.record(zero_step, source_frame as f64);
            }

            current += if step.abs() <= MIN_STEP { zero_step } else { step };
            actual += step.abs();
            covered += step.abs();
            source_frame += 1;

            let window = source_frame as f64;
            if window <= cursor && cursor < window + 1.0 {
                capture = Some(CursorCapture::Captured {
                    emitted: frames.len(),
                    current,
                    previous: emitted,
                });
            }
        }

        let cursor = capture.unwrap_or_else(|| {
            // Capture windows start one frame after `frame_start`.
            if cursor < request.frame_start as f64 + 1.0 {
                CursorCapture::BeforeRange
            } else {
                CursorCapture::AfterRange
            }
        });

        tracing::debug!(
            iterations = frames.len(),
            covered,
            cursor = ?cursor,
            "Speed integration finished"
        );

        IntegratedSequence {
            frames,
            source_time,
            blur: recorder.into_tracks(),
            cursor,
        }
    }
}

/// Apply the stall guard to a raw step.
///
/// Returns `(step, zero_step)`: `step` drives coverage and is never smaller
/// than [`MIN_STEP`] in magnitude; `zero_step` is what the emitted frame
/// advances by when the step was forced.
pub fn guard_step(raw: f64, lookahead: impl FnOnce() -> f64) -> (f64, f64) {
    if raw.abs() >= MIN_STEP {
        return (raw, raw);
    }
    let ahead = lookahead();
    if ahead < 0.0 {
        (-MIN_STEP, raw)
    } else if raw == 0.0 && ahead == 0.0 {
        (MIN_STEP, 0.0)
    } else {
        (MIN_STEP, raw)
    }
}
