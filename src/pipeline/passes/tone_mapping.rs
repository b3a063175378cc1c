//! Tone mapping and color grading stage.
//!
//! Maps HDR radiance down to LDR and optionally applies a LUT-based grade in
//! the same fullscreen pass. Runs whenever the chain is HDR; on LDR devices
//! it still runs if a grading LUT is configured, since grading happens here.

use glam::Vec2;

use crate::graph::{PassHandle, QueueHint, RenderGraph, ResourceKey};
use crate::pipeline::builder::{add_copy_to_screen_pass, ping_pong_render_target, PipelinePassBuilder};
use crate::pipeline::config::{CameraConfigs, PipelineConfigs};
use crate::scene::{Camera, RenderScene};

// Material pass layout: plain map, then the two LUT layouts.
const PASS_TONE_MAPPING: u32 = 0;
const PASS_WITH_STRIP_LUT: u32 = 1;
const PASS_WITH_SQUARE_LUT: u32 = 2;

#[derive(Debug, Default)]
pub struct ToneMappingPassBuilder;

impl ToneMappingPassBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PipelinePassBuilder for ToneMappingPassBuilder {
    fn name(&self) -> &'static str {
        "tone-mapping"
    }

    fn config_order(&self) -> i32 {
        0
    }

    fn render_order(&self) -> i32 {
        300
    }

    fn config_camera(
        &mut self,
        _camera: &Camera,
        _scene: &RenderScene,
        _pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
    ) {
        let grading = &configs.settings.color_grading;
        configs.tone_mapping.enable_color_grading = grading.enabled
            && grading.contribute > 0.0
            && grading.material.is_some()
            && grading.color_grading_map.is_some();
        configs.tone_mapping.enable_tone_mapping =
            configs.enable_hdr || configs.tone_mapping.enable_color_grading;
        if configs.tone_mapping.enable_tone_mapping {
            configs.remaining_passes += 1;
        }
    }

    fn setup(
        &mut self,
        graph: &mut RenderGraph,
        _pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
        camera: &Camera,
        _scene: &RenderScene,
        prev: Option<PassHandle>,
    ) -> Option<PassHandle> {
        if !configs.tone_mapping.enable_tone_mapping {
            return prev;
        }
        let Some(prev_handle) = prev else {
            return prev;
        };
        let Some(input) = graph.pass(prev_handle).output() else {
            return prev;
        };

        let grading = configs.tone_mapping.enable_color_grading;
        let material = if grading {
            configs.settings.color_grading.material.clone()
        } else {
            configs.settings.tone_mapping.material.clone()
        }
        .or_else(|| configs.copy_and_tonemap_material.clone());
        let Some(material) = material else {
            return prev;
        };

        configs.remaining_passes -= 1;
        assert!(
            configs.remaining_passes >= 0,
            "tone mapping pass scheduled twice"
        );
        let last = configs.remaining_passes == 0;

        let out_name = if last && !configs.enable_shading_scale {
            configs.color_name.clone()
        } else {
            // First LDR target; everything upstream is radiance-named.
            ping_pong_render_target(input.name(), configs.ldr_prefix(), configs.window_id)
        };
        let out = ResourceKey::new(&out_name);

        // The LUT ships either as an N x N-slice strip or as the square 8x8
        // tile layout; the shader pass differs.
        let lut = configs.settings.color_grading.color_grading_map;
        let pass_index = match lut {
            Some(lut) if grading && lut.is_square_map() => PASS_WITH_SQUARE_LUT,
            Some(_) if grading => PASS_WITH_STRIP_LUT,
            _ => PASS_TONE_MAPPING,
        };

        let handle = graph.add_render_pass("tone-mapping", configs.width, configs.height);
        {
            let pass = graph.pass_mut(handle);
            pass.add_render_target(
                out,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                wgpu::StoreOp::Store,
            );
            pass.add_texture(input, "inputTexture");

            if let Some(lut) = lut.filter(|_| grading) {
                pass.set_float(
                    "colorGradingContribute",
                    configs.settings.color_grading.contribute,
                );
                pass.set_vec2("lutSize", Vec2::new(lut.width as f32, lut.height as f32));
            }

            pass.add_queue(QueueHint::None, "post-process")
                .add_camera_quad(camera, &material, pass_index);
        }

        if last && configs.enable_shading_scale {
            return Some(add_copy_to_screen_pass(graph, configs, camera, &out_name));
        }
        Some(handle)
    }
}
