//! Curves: real-valued functions of a frame coordinate.
//!
//! The engine only ever needs `evaluate(frame) -> value`. Hosts can hand in
//! any closure, or use [`KeyframeCurve`] for authored keyframe animation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A pure mapping from a (sub-)frame coordinate to a real value.
///
/// Implementations must be side-effect free: the engine may evaluate the
/// same coordinate more than once and in any order.
pub trait Curve {
    /// Evaluate the curve at `frame`.
    fn evaluate(&self, frame: f64) -> f64;

    /// Evaluate the curve at every coordinate in `frames`.
    ///
    /// Override when the underlying curve has a cheaper batch path.
    fn evaluate_many(&self, frames: &[f64]) -> Vec<f64> {
        frames.iter().map(|&f| self.evaluate(f)).collect()
    }
}

impl<F> Curve for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, frame: f64) -> f64 {
        self(frame)
    }
}

/// How a keyframe blends into the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Hold the value until the next key.
    Constant,
    /// Straight line to the next key.
    #[default]
    Linear,
    /// Ease in and out of both keys (flat tangents at the keys).
    Smooth,
}

/// A single authored key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: f64,
    pub value: f64,
    /// Interpolation towards the following key.
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Keyframe {
    pub fn new(frame: f64, value: f64, interpolation: Interpolation) -> Self {
        Self {
            frame,
            value,
            interpolation,
        }
    }

    pub fn linear(frame: f64, value: f64) -> Self {
        Self::new(frame, value, Interpolation::Linear)
    }
}

/// Keyframe animation with constant extrapolation on both ends.
///
/// Serialized as a plain list of keys; keys are kept sorted by frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct KeyframeCurve {
    keyframes: Vec<Keyframe>,
}

impl KeyframeCurve {
    pub fn new(mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.frame.total_cmp(&b.frame));
        Self { keyframes }
    }

    /// Build a linear curve from `(frame, value)` pairs.
    pub fn linear(points: &[(f64, f64)]) -> Self {
        Self::new(
            points
                .iter()
                .map(|&(frame, value)| Keyframe::linear(frame, value))
                .collect(),
        )
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Frame range covered by the keys, if any.
    pub fn frame_range(&self) -> Option<(f64, f64)> {
        match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => Some((first.frame, last.frame)),
            _ => None,
        }
    }
}

impl From<Vec<Keyframe>> for KeyframeCurve {
    fn from(keyframes: Vec<Keyframe>) -> Self {
        Self::new(keyframes)
    }
}

impl From<KeyframeCurve> for Vec<Keyframe> {
    fn from(curve: KeyframeCurve) -> Self {
        curve.keyframes
    }
}

impl Curve for KeyframeCurve {
    fn evaluate(&self, frame: f64) -> f64 {
        let keys = &self.keyframes;
        let (first, last) = match (keys.first(), keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if frame <= first.frame {
            return first.value;
        }
        if frame >= last.frame {
            return last.value;
        }

        // First key strictly after `frame`; bounded to 1..len by the checks above.
        let idx = keys.partition_point(|k| k.frame <= frame);
        let left = &keys[idx - 1];
        let right = &keys[idx];

        let span = right.frame - left.frame;
        if span <= f64::EPSILON {
            return right.value;
        }

        let t = (frame - left.frame) / span;
        match left.interpolation {
            Interpolation::Constant => left.value,
            Interpolation::Linear => left.value + (right.value - left.value) * t,
            Interpolation::Smooth => {
                let eased = t * t * (3.0 - 2.0 * t);
                left.value + (right.value - left.value) * eased
            }
        }
    }
}

/// How a request parameter is animated.
#[derive(Clone, Copy, Default)]
pub enum ParamSource<'a> {
    /// Not animated: the request's scalar value applies.
    #[default]
    Static,
    /// Animated by a curve.
    Animated(&'a dyn Curve),
    /// Controlled by a procedural driver. Not supported by the engine.
    Driven,
}

impl<'a> ParamSource<'a> {
    /// The curve, when the parameter is curve-animated.
    pub fn curve(&self) -> Option<&'a dyn Curve> {
        match *self {
            ParamSource::Animated(curve) => Some(curve),
            _ => None,
        }
    }

    pub fn is_driven(&self) -> bool {
        matches!(self, ParamSource::Driven)
    }

    /// Evaluate the curve at `frame`, or return `fallback` when not animated.
    pub fn value_or(&self, frame: f64, fallback: f64) -> f64 {
        self.curve().map_or(fallback, |c| c.evaluate(frame))
    }
}

impl fmt::Debug for ParamSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSource::Static => f.write_str("Static"),
            ParamSource::Animated(_) => f.write_str("Animated(..)"),
            ParamSource::Driven => f.write_str("Driven"),
        }
    }
}
