//! Per-scene motion-blur state and blur source resolution.
//!
//! A scene's blur settings are captured fresh for every engine invocation
//! and discarded afterwards. Which blur implementation a scene uses is
//! decided once by the host through a [`BlurSourceProvider`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::curve::Curve;

/// Blur-capable engines a scene can render its motion blur with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurKind {
    /// Path tracer with a native shutter (no sample control).
    Cycles,
    /// Rasterizer with native shutter and sample steps.
    Eevee,
    /// Blur produced by the external blur add-on (shutter and samples).
    ExternalAddon,
}

impl BlurKind {
    /// Whether the engine exposes a sample/step count.
    pub fn has_samples(&self) -> bool {
        !matches!(self, BlurKind::Cycles)
    }
}

/// Render engine reported by the host for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderEngine {
    Cycles,
    Eevee,
    Workbench,
    Other,
}

/// Version of the external blur add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AddonVersion(pub u16, pub u16, pub u16);

impl AddonVersion {
    /// Oldest add-on release the engine interoperates with.
    pub const MIN_SUPPORTED: AddonVersion = AddonVersion(1, 1, 0);

    pub fn is_supported(&self) -> bool {
        *self >= Self::MIN_SUPPORTED
    }
}

impl fmt::Display for AddonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

/// Where motion blur comes from, resolved once by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "type", content = "version")]
pub enum BlurSourceProvider {
    /// The host cannot render motion blur at all.
    None,
    /// Only the render engines' own motion blur is available.
    #[default]
    NativeEngineBlur,
    /// The external blur add-on is installed at the given version.
    ExternalAddonBlur(AddonVersion),
}

impl BlurSourceProvider {
    /// Resolve which blur implementation a scene renders with.
    ///
    /// The external add-on takes over a scene whenever it is installed and
    /// active for that scene, regardless of the render engine. Otherwise
    /// only Cycles and Eevee have native motion blur.
    pub fn resolve_kind(&self, engine: RenderEngine, addon_active: bool) -> Option<BlurKind> {
        match self {
            BlurSourceProvider::None => None,
            BlurSourceProvider::ExternalAddonBlur(_) if addon_active => {
                Some(BlurKind::ExternalAddon)
            }
            BlurSourceProvider::NativeEngineBlur | BlurSourceProvider::ExternalAddonBlur(_) => {
                match engine {
                    RenderEngine::Cycles => Some(BlurKind::Cycles),
                    RenderEngine::Eevee => Some(BlurKind::Eevee),
                    RenderEngine::Workbench | RenderEngine::Other => None,
                }
            }
        }
    }

    /// The add-on version, when it is installed but too old.
    pub fn unsupported_version(&self) -> Option<AddonVersion> {
        match self {
            BlurSourceProvider::ExternalAddonBlur(v) if !v.is_supported() => Some(*v),
            _ => None,
        }
    }
}

/// Motion-blur settings of one scene for one engine invocation.
#[derive(Clone)]
pub struct SceneBlurState<'a> {
    /// Scene name, carried through to the result's blur tracks.
    pub name: String,
    pub kind: BlurKind,
    pub blur_enabled: bool,
    /// Base shutter, as a fraction of a frame.
    pub shutter: f64,
    /// Base sample/step count (0 when the engine has none).
    pub sample_count: f64,
    /// Animated shutter overriding `shutter`.
    pub shutter_curve: Option<&'a dyn Curve>,
    /// Animated sample count overriding `sample_count`.
    pub samples_curve: Option<&'a dyn Curve>,
}

impl<'a> SceneBlurState<'a> {
    pub fn new(name: impl Into<String>, kind: BlurKind, shutter: f64, sample_count: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            blur_enabled: true,
            shutter,
            sample_count: if kind.has_samples() { sample_count } else { 0.0 },
            shutter_curve: None,
            samples_curve: None,
        }
    }

    /// Build the blur state from live host settings.
    ///
    /// Returns `None` when the scene has no blur-capable engine. Scenes
    /// taken over by the external add-on always have blur enabled; native
    /// scenes follow the host's motion-blur toggle.
    pub fn resolve(
        name: impl Into<String>,
        provider: &BlurSourceProvider,
        engine: RenderEngine,
        motion_blur: bool,
        addon_active: bool,
        shutter: f64,
        sample_count: f64,
    ) -> Option<Self> {
        let kind = provider.resolve_kind(engine, addon_active)?;
        let mut state = Self::new(name, kind, shutter, sample_count);
        state.blur_enabled = kind == BlurKind::ExternalAddon || motion_blur;
        Some(state)
    }

    pub fn disabled(mut self) -> Self {
        self.blur_enabled = false;
        self
    }

    pub fn with_shutter_curve(mut self, curve: &'a dyn Curve) -> Self {
        self.shutter_curve = Some(curve);
        self
    }

    pub fn with_samples_curve(mut self, curve: &'a dyn Curve) -> Self {
        self.samples_curve = Some(curve);
        self
    }

    /// Base shutter at `frame`, from the override curve when present.
    pub fn base_shutter(&self, frame: f64) -> f64 {
        self.shutter_curve
            .map_or(self.shutter, |c| c.evaluate(frame))
    }

    /// Base sample count at `frame`, from the override curve when present.
    pub fn base_samples(&self, frame: f64) -> f64 {
        self.samples_curve
            .map_or(self.sample_count, |c| c.evaluate(frame))
    }
}

impl fmt::Debug for SceneBlurState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneBlurState")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("blur_enabled", &self.blur_enabled)
            .field("shutter", &self.shutter)
            .field("sample_count", &self.sample_count)
            .field("shutter_curve", &self.shutter_curve.is_some())
            .field("samples_curve", &self.samples_curve.is_some())
            .finish()
    }
}
