//! Device and per-camera pipeline configuration.
//!
//! [`PipelineConfigs`] is computed once from the device capabilities and
//! never changes. [`CameraConfigs`] is rebuilt for every camera every frame:
//! the orchestrator resets it, then each enabled pass builder fills in its
//! own section during the config phase.

use glam::Vec4;

use crate::resources::Material;
use crate::scene::Camera;
use crate::settings::PipelineSettings;

/// Capabilities of the device the pipeline runs on.
#[derive(Debug, Clone)]
pub struct DeviceCaps {
    pub is_mobile: bool,
    pub is_web: bool,
    /// Float color targets are renderable and filterable.
    pub supports_float_output: bool,
    /// Depth textures can be bound for sampling; without it shadow maps pack
    /// depth into color channels.
    pub supports_depth_sample: bool,
    /// Render-target v-axis direction relative to clip space.
    pub screen_space_sign_y: f32,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self {
            is_mobile: false,
            is_web: false,
            supports_float_output: true,
            supports_depth_sample: true,
            screen_space_sign_y: 1.0,
        }
    }
}

/// Device-level configuration, fixed for the lifetime of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfigs {
    pub is_mobile: bool,
    pub is_web: bool,
    pub use_float_output: bool,
    pub shadow_enabled: bool,
    pub shadow_map_format: wgpu::TextureFormat,
    pub shadow_map_size: (u32, u32),
    pub screen_space_sign_y: f32,
    pub supports_depth_sample: bool,
    /// Spot-light shadow maps per frame on mobile tiers.
    pub mobile_max_spot_light_shadow_maps: u32,
    /// Platform constants handed to shaders: x = sign y, w = device tier.
    pub platform: Vec4,
}

impl PipelineConfigs {
    #[must_use]
    pub fn new(caps: &DeviceCaps) -> Self {
        let shadow_map_format = if caps.supports_depth_sample {
            wgpu::TextureFormat::R32Float
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        Self {
            is_mobile: caps.is_mobile,
            is_web: caps.is_web,
            use_float_output: caps.supports_float_output,
            shadow_enabled: true,
            shadow_map_format,
            shadow_map_size: (1024, 1024),
            screen_space_sign_y: caps.screen_space_sign_y,
            supports_depth_sample: caps.supports_depth_sample,
            mobile_max_spot_light_shadow_maps: 1,
            platform: Vec4::new(
                caps.screen_space_sign_y,
                0.0,
                0.0,
                if caps.is_mobile { 0.0 } else { 1.0 },
            ),
        }
    }

    /// Spot-light shadow map budget for this device tier. Desktop is bounded
    /// only by the light list.
    #[must_use]
    pub fn max_spot_light_shadow_maps(&self) -> usize {
        if self.is_mobile {
            self.mobile_max_spot_light_shadow_maps as usize
        } else {
            usize::MAX
        }
    }
}

// ---------------------------------------------------------------------------
// Per-pass config sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardPassConfigs {
    pub enable_main_light_shadow_map: bool,
    pub enable_main_light_planar_shadow_map: bool,
    pub enable_planar_reflection_probe: bool,
    /// All additive lights in one pass versus one pass per shadowed light.
    pub enable_single_forward_pass: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BloomPassConfigs {
    pub enable_bloom: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ToneMappingPassConfigs {
    pub enable_tone_mapping: bool,
    pub enable_color_grading: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FxaaPassConfigs {
    pub enable_fxaa: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsrPassConfigs {
    pub enable_fsr: bool,
}

// ---------------------------------------------------------------------------
// CameraConfigs
// ---------------------------------------------------------------------------

/// Per-camera, per-frame configuration shared by all pass builders.
///
/// `remaining_passes` implements the output-routing protocol: every builder
/// that will record passes increments it during the config phase; during
/// setup each decrements it before recording. A builder seeing the counter at
/// zero after its decrement is the last one and must write the camera's
/// window; anything earlier writes an intermediate target.
#[derive(Debug, Clone)]
pub struct CameraConfigs {
    pub settings: PipelineSettings,

    pub enable_full_pipeline: bool,
    pub enable_profiler: bool,
    pub remaining_passes: i32,

    pub enable_msaa: bool,
    pub enable_shading_scale: bool,
    pub shading_scale: f32,

    pub enable_hdr: bool,
    pub radiance_format: wgpu::TextureFormat,

    /// Window-native dimensions.
    pub native_width: u32,
    pub native_height: u32,
    /// Scene-shading dimensions after the shading scale.
    pub width: u32,
    pub height: u32,

    pub window_id: u32,
    pub color_name: String,
    pub depth_stencil_name: String,
    pub is_main_game_window: bool,

    /// Used for the final blit whenever a stage must land the image in the
    /// window itself.
    pub copy_and_tonemap_material: Option<Material>,

    pub forward: ForwardPassConfigs,
    pub bloom: BloomPassConfigs,
    pub tone_mapping: ToneMappingPassConfigs,
    pub fxaa: FxaaPassConfigs,
    pub fsr: FsrPassConfigs,
}

impl Default for CameraConfigs {
    fn default() -> Self {
        Self {
            settings: PipelineSettings::default(),
            enable_full_pipeline: false,
            enable_profiler: false,
            remaining_passes: 0,
            enable_msaa: false,
            enable_shading_scale: false,
            shading_scale: 1.0,
            enable_hdr: false,
            radiance_format: wgpu::TextureFormat::Rgba8Unorm,
            native_width: 1,
            native_height: 1,
            width: 1,
            height: 1,
            window_id: 0,
            color_name: String::new(),
            depth_stencil_name: String::new(),
            is_main_game_window: false,
            copy_and_tonemap_material: None,
            forward: ForwardPassConfigs::default(),
            bloom: BloomPassConfigs::default(),
            tone_mapping: ToneMappingPassConfigs::default(),
            fxaa: FxaaPassConfigs::default(),
            fsr: FsrPassConfigs::default(),
        }
    }
}

impl CameraConfigs {
    /// Rebuilds the camera section from scratch. Pass-builder sections start
    /// disabled and are filled during the config phase.
    pub fn reset(
        &mut self,
        camera: &Camera,
        default_settings: &PipelineSettings,
        pipeline: &PipelineConfigs,
    ) {
        self.settings = camera
            .pipeline_settings
            .clone()
            .unwrap_or_else(|| default_settings.clone());

        self.enable_full_pipeline = camera.full_pipeline;
        self.is_main_game_window =
            camera.usage == crate::scene::CameraUsage::Game && camera.window.has_swapchain;
        self.enable_profiler = self.is_main_game_window;
        self.remaining_passes = 0;

        self.enable_shading_scale =
            self.settings.enable_shading_scale && (self.settings.shading_scale - 1.0).abs() > f32::EPSILON;
        self.shading_scale = if self.enable_shading_scale {
            self.settings.shading_scale
        } else {
            1.0
        };

        // Hardware MSAA is unavailable on web backends.
        self.enable_msaa = self.settings.msaa.enabled && !pipeline.is_web;

        self.enable_hdr = pipeline.use_float_output;
        self.radiance_format = if self.enable_hdr {
            wgpu::TextureFormat::Rgba16Float
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        self.native_width = camera.window.width.max(1);
        self.native_height = camera.window.height.max(1);
        self.width = scaled_dimension(self.native_width, self.shading_scale);
        self.height = scaled_dimension(self.native_height, self.shading_scale);

        self.window_id = camera.window.id;
        self.color_name = camera.window.color_name.clone();
        self.depth_stencil_name = camera.window.depth_stencil_name.clone();

        self.forward = ForwardPassConfigs::default();
        self.bloom = BloomPassConfigs::default();
        self.tone_mapping = ToneMappingPassConfigs::default();
        self.fxaa = FxaaPassConfigs::default();
        self.fsr = FsrPassConfigs::default();
    }

    // ─── Chain target names ──────────────────────────────────────────────
    //
    // Scene-resolution targets get a "Scaled" prefix when the shading scale
    // is active so native-resolution declarations never alias them.

    #[must_use]
    pub fn scene_depth_name(&self) -> String {
        if self.enable_shading_scale {
            format!("ScaledSceneDepth{}", self.window_id)
        } else {
            format!("SceneDepth{}", self.window_id)
        }
    }

    /// Prefix of the HDR radiance ping-pong pair.
    #[must_use]
    pub fn radiance_prefix(&self) -> &'static str {
        if self.enable_shading_scale {
            "ScaledRadiance"
        } else {
            "Radiance"
        }
    }

    /// Prefix of the LDR ping-pong pair used after tone mapping.
    #[must_use]
    pub fn ldr_prefix(&self) -> &'static str {
        if self.enable_shading_scale {
            "ScaledLdrColor"
        } else {
            "LdrColor"
        }
    }

    #[must_use]
    pub fn radiance_name(&self, slot: u32) -> String {
        format!("{}{}_{}", self.radiance_prefix(), slot, self.window_id)
    }

    #[must_use]
    pub fn ldr_color_name(&self, slot: u32) -> String {
        format!("{}{}_{}", self.ldr_prefix(), slot, self.window_id)
    }

    /// Native-resolution pair used between upscaling and UI compositing.
    #[must_use]
    pub fn ui_color_name(&self, slot: u32) -> String {
        format!("UiColor{}_{}", slot, self.window_id)
    }
}

/// Scaled render dimension, never below one pixel.
#[must_use]
pub fn scaled_dimension(value: u32, scale: f32) -> u32 {
    ((value as f32 * scale).floor() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_dimension_clamps_to_one() {
        assert_eq!(scaled_dimension(1920, 0.5), 960);
        assert_eq!(scaled_dimension(3, 0.5), 1);
        assert_eq!(scaled_dimension(1, 0.1), 1);
    }

    #[test]
    fn shadow_format_follows_depth_sampling() {
        let mut caps = DeviceCaps::default();
        let configs = PipelineConfigs::new(&caps);
        assert_eq!(configs.shadow_map_format, wgpu::TextureFormat::R32Float);

        caps.supports_depth_sample = false;
        let configs = PipelineConfigs::new(&caps);
        assert_eq!(configs.shadow_map_format, wgpu::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn mobile_limits_spot_shadow_maps() {
        let caps = DeviceCaps {
            is_mobile: true,
            ..DeviceCaps::default()
        };
        let configs = PipelineConfigs::new(&caps);
        assert_eq!(configs.max_spot_light_shadow_maps(), 1);
    }
}
