//! Pipeline Settings
//!
//! Per-camera configuration for the builtin pipeline: MSAA, shading scale,
//! bloom, color grading, tone mapping, FXAA, and FSR upscaling.
//!
//! Settings deserialize from JSON with every field optional; missing fields
//! fall back to the same defaults [`PipelineSettings::default`] produces, so a
//! partial document and a hand-built struct always agree.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sable::PipelineSettings;
//!
//! // Defaults: no MSAA, full-resolution shading, all effects off
//! let settings = PipelineSettings::default();
//!
//! // Half-resolution shading with FSR upscaling back to native
//! let settings = PipelineSettings::from_json(r#"{
//!     "enableShadingScale": true,
//!     "shadingScale": 0.5,
//!     "fsr": { "enabled": true }
//! }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::resources::{LutTexture, Material};

// ---------------------------------------------------------------------------
// MSAA
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MsaaSettings {
    pub enabled: bool,
    /// Hardware sample count. Common values: 2, 4, 8.
    pub sample_count: u32,
}

impl Default for MsaaSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            sample_count: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Bloom
// ---------------------------------------------------------------------------

/// Bloom filtering strategy.
///
/// `KawaseDualFilter` ping-pongs between two half-size targets per iteration;
/// `Mipmap` walks a downsample chain and composites on the way back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BloomKind {
    KawaseDualFilter,
    Mipmap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BloomSettings {
    pub enabled: bool,
    pub kind: BloomKind,
    /// Post-process material providing prefilter/downsample/upsample passes.
    /// Not serialized; assigned by the renderer after load.
    #[serde(skip)]
    pub material: Option<Material>,
    /// Treat alpha as a bloom mask in the prefilter pass.
    pub enable_alpha_mask: bool,
    pub iterations: u32,
    /// Luminance threshold below which pixels do not contribute.
    pub threshold: f32,
    pub intensity: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: BloomKind::KawaseDualFilter,
            material: None,
            enable_alpha_mask: false,
            iterations: 3,
            threshold: 0.8,
            intensity: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Color grading & tone mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToneMappingSettings {
    #[serde(skip)]
    pub material: Option<Material>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorGradingSettings {
    pub enabled: bool,
    #[serde(skip)]
    pub material: Option<Material>,
    /// Blend factor between the ungraded and graded image, 0 to 1.
    pub contribute: f32,
    #[serde(skip)]
    pub color_grading_map: Option<LutTexture>,
}

impl Default for ColorGradingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            material: None,
            contribute: 1.0,
            color_grading_map: None,
        }
    }
}

// ---------------------------------------------------------------------------
// FSR & FXAA
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FsrSettings {
    pub enabled: bool,
    #[serde(skip)]
    pub material: Option<Material>,
    /// RCAS sharpening strength, 0 to 1. Higher is sharper.
    pub sharpness: f32,
}

impl Default for FsrSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            material: None,
            sharpness: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FxaaSettings {
    pub enabled: bool,
    #[serde(skip)]
    pub material: Option<Material>,
}

// ---------------------------------------------------------------------------
// PipelineSettings
// ---------------------------------------------------------------------------

/// Root settings document for the builtin pipeline.
///
/// | Field                | Description                          | Default |
/// |----------------------|--------------------------------------|---------|
/// | `msaa`               | Hardware MSAA                        | off, 4x |
/// | `enable_shading_scale` | Render the scene below native res  | `false` |
/// | `shading_scale`      | Resolution factor when enabled       | `0.5`   |
/// | `bloom`              | Bloom effect                         | off     |
/// | `color_grading`      | LUT color grading                    | off     |
/// | `tone_mapping`       | HDR to LDR mapping                   | material-driven |
/// | `fxaa`               | Post-process anti-aliasing           | off     |
/// | `fsr`                | FidelityFX upscaling                 | off     |
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    pub msaa: MsaaSettings,
    pub enable_shading_scale: bool,
    pub shading_scale: f32,
    pub bloom: BloomSettings,
    pub tone_mapping: ToneMappingSettings,
    pub color_grading: ColorGradingSettings,
    pub fsr: FsrSettings,
    pub fxaa: FxaaSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            msaa: MsaaSettings::default(),
            enable_shading_scale: false,
            shading_scale: 0.5,
            bloom: BloomSettings::default(),
            tone_mapping: ToneMappingSettings::default(),
            color_grading: ColorGradingSettings::default(),
            fsr: FsrSettings::default(),
            fxaa: FxaaSettings::default(),
        }
    }
}

impl PipelineSettings {
    /// Parses a settings document, back-filling any missing fields with the
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective resolution factor for scene shading. 1.0 when shading scale
    /// is disabled.
    #[inline]
    #[must_use]
    pub fn effective_shading_scale(&self) -> f32 {
        if self.enable_shading_scale {
            self.shading_scale
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_empty_document() {
        let parsed = PipelineSettings::from_json("{}").unwrap();
        let built = PipelineSettings::default();
        assert_eq!(parsed.msaa.sample_count, built.msaa.sample_count);
        assert_eq!(parsed.bloom.iterations, built.bloom.iterations);
        assert!((parsed.shading_scale - built.shading_scale).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_document_back_fills() {
        let parsed = PipelineSettings::from_json(
            r#"{ "bloom": { "enabled": true, "iterations": 5 } }"#,
        )
        .unwrap();
        assert!(parsed.bloom.enabled);
        assert_eq!(parsed.bloom.iterations, 5);
        assert!((parsed.bloom.threshold - 0.8).abs() < f32::EPSILON);
        assert!((parsed.bloom.intensity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn shading_scale_requires_enable_flag() {
        let mut settings = PipelineSettings::default();
        settings.shading_scale = 0.5;
        assert!((settings.effective_shading_scale() - 1.0).abs() < f32::EPSILON);
        settings.enable_shading_scale = true;
        assert!((settings.effective_shading_scale() - 0.5).abs() < f32::EPSILON);
    }
}
