//! Retime Engine: time remapping
//!
//! Turns a scene's frame range and a speed or target-frame curve into the
//! list of (sub-)frames to render:
//! - **Speed Integration:** accumulate a playback speed into remapped frames
//! - **Frame Sampling:** evaluate a target-frame curve per output frame
//! - **Blur Stretching:** scale shutter and samples to the local time rate
//! - **Cropping:** publish a window of the sequence and place the cursor in it
//! - **Preview:** step through and loop over a computed result
//!
//! This crate is pure computation with no I/O and no host state.
//! A [`RemapRequest`] goes in; a [`RemapResult`] or a [`RemapError`] comes out.

pub mod blur;
pub mod crop;
pub mod engine;
pub mod error;
pub mod preview;
pub mod sampler;
pub mod speed;

pub use blur::BlurStretch;
pub use crop::RangeCropper;
pub use engine::{remap, validate};
pub use error::{RemapError, RemapOutcome};
pub use preview::{ExitMode, FramePass, PlaybackLoop, PreviewSession, StepSize};
pub use sampler::FrameSampler;
pub use speed::SpeedIntegrator;

pub use retime_model::{RemapRequest, RemapResult};
