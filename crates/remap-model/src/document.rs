//! Remap documents: host settings captured as JSON.
//!
//! A document holds everything a host would normally hand to the engine
//! from its live scene state: frame range, cursor, remap settings, authored
//! curves, and the per-scene motion-blur setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::curve::{Interpolation, Keyframe, KeyframeCurve, ParamSource};
use crate::request::{RemapMode, RemapRequest};
use crate::scene::{AddonVersion, BlurSourceProvider, RenderEngine, SceneBlurState};

/// Top-level document file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemapDocument {
    /// Schema version.
    pub version: String,

    /// Human-readable document name.
    pub name: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    pub settings: RemapSettings,

    #[serde(default)]
    pub curves: CurveSet,

    #[serde(default)]
    pub blur_source: BlurSourceProvider,

    #[serde(default)]
    pub scenes: Vec<SceneSettings>,
}

/// Scalar remap settings of the main scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemapSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub frame_start: i64,
    pub frame_end: i64,

    /// Cursor position; defaults to the first frame.
    #[serde(default)]
    pub frame_current: Option<f64>,

    #[serde(default)]
    pub mode: RemapMode,

    /// Speed in percent of normal speed.
    #[serde(default = "default_speed")]
    pub speed: f64,

    #[serde(default)]
    pub skip_start: u32,

    /// Non-positive; `0` means no crop.
    #[serde(default)]
    pub skip_end: i64,

    /// Blur-stretch compensation in `[0.0, 1.0]`.
    #[serde(default = "default_blur_stretch")]
    pub blur_stretch: f64,
}

/// Authored animation of the remap parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurveSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<AnimatedParam>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<AnimatedParam>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur_stretch: Option<AnimatedParam>,
}

/// How a parameter is animated in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimatedParam {
    /// Keyframe animation.
    Keyframes { keyframes: KeyframeCurve },

    /// Procedural driver expression (recorded, never evaluated).
    Driver { expression: String },
}

impl AnimatedParam {
    pub fn source(&self) -> ParamSource<'_> {
        match self {
            AnimatedParam::Keyframes { keyframes } => ParamSource::Animated(keyframes),
            AnimatedParam::Driver { .. } => ParamSource::Driven,
        }
    }
}

fn param_source(param: Option<&AnimatedParam>) -> ParamSource<'_> {
    param.map_or(ParamSource::Static, AnimatedParam::source)
}

/// Motion-blur setup of one scene that contributes to the render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    pub name: String,

    pub engine: RenderEngine,

    /// The render engine's own motion-blur toggle.
    #[serde(default)]
    pub motion_blur: bool,

    /// Whether the external blur add-on is switched on for this scene.
    #[serde(default)]
    pub addon_active: bool,

    pub shutter: f64,

    #[serde(default)]
    pub samples: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutter_curve: Option<KeyframeCurve>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples_curve: Option<KeyframeCurve>,
}

impl SceneSettings {
    /// Resolve this scene's blur state; `None` when no blur is possible.
    pub fn blur_state(&self, provider: &BlurSourceProvider) -> Option<SceneBlurState<'_>> {
        let mut state = SceneBlurState::resolve(
            self.name.clone(),
            provider,
            self.engine,
            self.motion_blur,
            self.addon_active,
            self.shutter,
            self.samples,
        )?;
        if let Some(curve) = &self.shutter_curve {
            state = state.with_shutter_curve(curve);
        }
        if let Some(curve) = &self.samples_curve {
            state = state.with_samples_curve(curve);
        }
        Some(state)
    }
}

fn default_true() -> bool {
    true
}

fn default_speed() -> f64 {
    100.0
}

fn default_blur_stretch() -> f64 {
    1.0
}

impl RemapDocument {
    /// Create a document with a single motion-blurred scene and a sample
    /// curve for the chosen mode.
    pub fn sample(
        name: impl Into<String>,
        mode: RemapMode,
        frame_start: i64,
        frame_end: i64,
        speed: f64,
        blur_stretch: f64,
    ) -> Self {
        let start = frame_start as f64;
        let end = frame_end as f64;
        let mid = start + (end - start) / 2.0;

        let curves = match mode {
            // Slow down to a quarter speed in the middle of the range.
            RemapMode::Speed => CurveSet {
                speed: Some(AnimatedParam::Keyframes {
                    keyframes: KeyframeCurve::new(vec![
                        Keyframe::new(start, speed, Interpolation::Smooth),
                        Keyframe::new(mid, speed / 4.0, Interpolation::Smooth),
                        Keyframe::new(end, speed, Interpolation::Smooth),
                    ]),
                }),
                ..CurveSet::default()
            },
            // Play forward to the middle, then rewind.
            RemapMode::Frames => CurveSet {
                frame: Some(AnimatedParam::Keyframes {
                    keyframes: KeyframeCurve::linear(&[(start, start), (mid, end), (end, start)]),
                }),
                ..CurveSet::default()
            },
        };

        Self {
            version: "1.0".to_string(),
            name: name.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            settings: RemapSettings {
                enabled: true,
                frame_start,
                frame_end,
                frame_current: None,
                mode,
                speed,
                skip_start: 0,
                skip_end: 0,
                blur_stretch,
            },
            curves,
            blur_source: BlurSourceProvider::NativeEngineBlur,
            scenes: vec![SceneSettings {
                name: "Scene".to_string(),
                engine: RenderEngine::Eevee,
                motion_blur: true,
                addon_active: false,
                shutter: 0.5,
                samples: 8.0,
                shutter_curve: None,
                samples_curve: None,
            }],
        }
    }

    /// Load a document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DocumentError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| DocumentError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save the document as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DocumentError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| DocumentError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| DocumentError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Report structural problems. An empty list means the document is
    /// well-formed; the engine may still reject it.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];
        let s = &self.settings;

        if s.frame_start > s.frame_end {
            issues.push(format!(
                "frame_start ({}) is after frame_end ({})",
                s.frame_start, s.frame_end
            ));
        }
        if s.skip_end > 0 {
            issues.push(format!("skip_end must be zero or negative, got {}", s.skip_end));
        }
        if !(0.0..=1.0).contains(&s.blur_stretch) {
            issues.push(format!(
                "blur_stretch must be within [0, 1], got {}",
                s.blur_stretch
            ));
        }
        for scene in &self.scenes {
            if scene.shutter < 0.0 {
                issues.push(format!("scene '{}' has a negative shutter", scene.name));
            }
        }
        if let Some(version) = self.blur_source.unsupported_version() {
            if self.scenes.iter().any(|s| s.addon_active) {
                issues.push(format!(
                    "blur add-on {version} is older than {}",
                    AddonVersion::MIN_SUPPORTED
                ));
            }
        }

        issues
    }

    /// Fail with [`DocumentError::ValidationError`] when `validate` reports
    /// anything.
    pub fn ensure_valid(&self) -> Result<(), DocumentError> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(DocumentError::ValidationError {
                message: issues.join("; "),
            })
        }
    }

    /// Build the engine request for this document.
    pub fn to_request(&self) -> RemapRequest<'_> {
        let s = &self.settings;
        let remap_curve = match s.mode {
            RemapMode::Speed => param_source(self.curves.speed.as_ref()),
            RemapMode::Frames => param_source(self.curves.frame.as_ref()),
        };

        RemapRequest {
            enabled: s.enabled,
            frame_start: s.frame_start,
            frame_end: s.frame_end,
            frame_current: s.frame_current.unwrap_or(s.frame_start as f64),
            skip_start: s.skip_start,
            skip_end: (s.skip_end != 0).then_some(s.skip_end),
            mode: s.mode,
            speed: s.speed,
            remap_curve,
            blur_stretch: s.blur_stretch,
            blur_stretch_curve: param_source(self.curves.blur_stretch.as_ref()),
            blur_source: self.blur_source,
            scenes: self
                .scenes
                .iter()
                .filter_map(|scene| scene.blur_state(&self.blur_source))
                .collect(),
        }
    }
}

/// Errors that can occur when working with documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid document: {message}")]
    ValidationError { message: String },
}
