//! Engine entry point: validate a request and dispatch on its mode.

use retime_model::{BlurKind, RemapMode, RemapRequest, RemapResult};

use crate::crop::RangeCropper;
use crate::error::{RemapError, RemapOutcome};
use crate::sampler::FrameSampler;
use crate::speed::SpeedIntegrator;

/// Reject requests the engine cannot satisfy.
///
/// Checks run in a fixed order so the reported error is deterministic:
/// enabled, drivers, then blur add-on compatibility.
pub fn validate(request: &RemapRequest<'_>) -> RemapOutcome<()> {
    if !request.enabled {
        return Err(RemapError::Disabled);
    }

    if request.remap_curve.is_driven() {
        return Err(RemapError::Drivers {
            parameter: request.mode.parameter(),
        });
    }
    if request.blur_stretch_curve.is_driven() {
        return Err(RemapError::Drivers {
            parameter: "blur_stretch",
        });
    }

    if let Some(version) = request.blur_source.unsupported_version() {
        let uses_addon = request
            .scenes
            .iter()
            .any(|scene| scene.kind == BlurKind::ExternalAddon);
        if uses_addon {
            return Err(RemapError::IncompatibleDependency { version });
        }
    }

    Ok(())
}

/// Compute the remapped frame sequence for `request`.
pub fn remap(request: &RemapRequest<'_>) -> RemapOutcome<RemapResult> {
    let span = tracing::debug_span!(
        "remap",
        mode = ?request.mode,
        frame_start = request.frame_start,
        frame_end = request.frame_end,
    );
    let _guard = span.enter();

    let outcome = validate(request).and_then(|()| match request.mode {
        RemapMode::Speed => {
            let sequence = SpeedIntegrator::new(request).integrate();
            RangeCropper::from_request(request).apply(sequence, request)
        }
        RemapMode::Frames => FrameSampler::new(request).sample(),
    });

    match &outcome {
        Ok(result) => tracing::debug!(
            total = result.total,
            uncropped = result.uncropped_len,
            cursor = result.cursor.number,
            scenes = result.blur.len(),
            "Remap complete"
        ),
        Err(e) => tracing::debug!(code = e.code(), error = %e, "Remap rejected"),
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use retime_model::{AddonVersion, BlurSourceProvider, ParamSource, SceneBlurState};

    #[test]
    fn test_disabled_wins_over_everything() {
        let mut request = RemapRequest::new(1, 10, 1.0).with_curve(ParamSource::Driven);
        request.enabled = false;
        assert_eq!(remap(&request), Err(RemapError::Disabled));
    }

    #[test]
    fn test_driven_parameters() {
        let request = RemapRequest::new(1, 10, 1.0).with_curve(ParamSource::Driven);
        assert_eq!(
            validate(&request),
            Err(RemapError::Drivers { parameter: "speed" })
        );

        let request = RemapRequest::new(1, 10, 1.0)
            .with_mode(RemapMode::Frames)
            .with_curve(ParamSource::Driven);
        assert_eq!(
            validate(&request),
            Err(RemapError::Drivers { parameter: "frame" })
        );

        let request =
            RemapRequest::new(1, 10, 1.0).with_blur_stretch(1.0, ParamSource::Driven);
        assert_eq!(
            validate(&request),
            Err(RemapError::Drivers {
                parameter: "blur_stretch"
            })
        );
    }

    #[test]
    fn test_old_addon_only_matters_when_used() {
        let old = AddonVersion(1, 0, 4);
        let mut request = RemapRequest::new(1, 10, 1.0);
        request.blur_source = BlurSourceProvider::ExternalAddonBlur(old);
        assert_eq!(validate(&request), Ok(()));

        let request = request.with_scene(SceneBlurState::new(
            "Main",
            BlurKind::ExternalAddon,
            0.5,
            8.0,
        ));
        assert_eq!(
            validate(&request),
            Err(RemapError::IncompatibleDependency { version: old })
        );
    }

    #[test]
    fn test_frames_mode_without_curve() {
        let request = RemapRequest::new(1, 10, 1.0).with_mode(RemapMode::Frames);
        assert_eq!(remap(&request), Err(RemapError::MissingCurve));
    }

    #[test]
    fn test_speed_mode_dispatch() {
        let request = RemapRequest::new(1, 10, 5.0);
        let result = remap(&request).unwrap();
        assert_eq!(result.mode, RemapMode::Speed);
        assert_eq!(result.total, 10);
        assert_eq!(result.cursor.number, 5);
    }
}
