//! Retime Model
//!
//! Defines the data contracts between a host and the time-remapping engine:
//! - **Curves:** frame-to-value functions, keyframe animation, parameter sources
//! - **Scenes:** per-scene motion-blur state and blur source resolution
//! - **Requests/Results:** the engine's complete input and output
//! - **Documents:** host settings captured as JSON for tooling
//!
//! Frames are real-valued: a remapped frame such as `12.25` means a quarter
//! of the way between timeline frames 12 and 13.

pub mod curve;
pub mod document;
pub mod request;
pub mod scene;

pub use curve::*;
pub use document::*;
pub use request::*;
pub use scene::*;
