//! Failure conditions of a remap invocation.
//!
//! Every condition aborts the whole computation; no partial result is ever
//! returned. None of them is retriable: the request has to change first.

use retime_common::RetimeError;
use retime_model::AddonVersion;

/// Why a remap request could not be satisfied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemapError {
    #[error("Time remapping is disabled for this scene")]
    Disabled,

    #[error("Time remapping doesn't work with drivers (the '{parameter}' parameter is driven)")]
    Drivers { parameter: &'static str },

    #[error(
        "Blur add-on {version} is not supported; update it to {} or higher",
        AddonVersion::MIN_SUPPORTED
    )]
    IncompatibleDependency { version: AddonVersion },

    #[error("No frames to render")]
    EmptyRange,

    #[error("The 'frame' parameter needs to be keyframed in FRAMES mode")]
    MissingCurve,
}

impl RemapError {
    /// Whether resubmitting the same request could succeed.
    pub fn is_retriable(&self) -> bool {
        false
    }

    /// Short machine-readable name of the condition.
    pub fn code(&self) -> &'static str {
        match self {
            RemapError::Disabled => "disabled",
            RemapError::Drivers { .. } => "drivers",
            RemapError::IncompatibleDependency { .. } => "incompatible_dependency",
            RemapError::EmptyRange => "empty_range",
            RemapError::MissingCurve => "missing_curve",
        }
    }
}

impl From<RemapError> for RetimeError {
    fn from(err: RemapError) -> Self {
        RetimeError::remap(err.to_string())
    }
}

/// Result type alias using RemapError.
pub type RemapOutcome<T> = Result<T, RemapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(RemapError::EmptyRange.to_string(), "No frames to render");
        let err = RemapError::IncompatibleDependency {
            version: AddonVersion(1, 0, 2),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.0.2"));
        assert!(msg.contains("1.1.0"));
        assert!(RemapError::Drivers { parameter: "speed" }
            .to_string()
            .contains("speed"));
    }

    #[test]
    fn test_never_retriable() {
        for err in [
            RemapError::Disabled,
            RemapError::Drivers { parameter: "frame" },
            RemapError::IncompatibleDependency {
                version: AddonVersion(1, 0, 0),
            },
            RemapError::EmptyRange,
            RemapError::MissingCurve,
        ] {
            assert!(!err.is_retriable(), "{} should not be retriable", err.code());
        }
    }

    #[test]
    fn test_converts_to_common_error() {
        let err: RetimeError = RemapError::MissingCurve.into();
        assert!(matches!(err, RetimeError::Remap { .. }));
    }
}
