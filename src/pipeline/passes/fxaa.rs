//! FXAA stage.
//!
//! Luminance-based post-process anti-aliasing over the LDR image. Runs at
//! scene resolution; when it ends the chain under a shading scale it cannot
//! write the window directly and appends an upscaling blit instead.

use glam::Vec4;

use crate::graph::{PassHandle, QueueHint, RenderGraph, ResourceKey};
use crate::pipeline::builder::{add_copy_to_screen_pass, ping_pong_render_target, PipelinePassBuilder};
use crate::pipeline::config::{CameraConfigs, PipelineConfigs};
use crate::scene::{Camera, RenderScene};

const PASS_FXAA: u32 = 0;

#[derive(Debug, Default)]
pub struct FxaaPassBuilder;

impl FxaaPassBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PipelinePassBuilder for FxaaPassBuilder {
    fn name(&self) -> &'static str {
        "fxaa"
    }

    fn config_order(&self) -> i32 {
        0
    }

    fn render_order(&self) -> i32 {
        400
    }

    fn config_camera(
        &mut self,
        _camera: &Camera,
        _scene: &RenderScene,
        _pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
    ) {
        configs.fxaa.enable_fxaa =
            configs.settings.fxaa.enabled && configs.settings.fxaa.material.is_some();
        if configs.fxaa.enable_fxaa {
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
        if !configs.fxaa.enable_fxaa {
            return prev;
        }
        let Some(prev_handle) = prev else {
            return prev;
        };
        let Some(material) = configs.settings.fxaa.material.clone() else {
            return prev;
        };
        let Some(input) = graph.pass(prev_handle).output() else {
            return prev;
        };

        configs.remaining_passes -= 1;
        assert!(configs.remaining_passes >= 0, "fxaa pass scheduled twice");
        let last = configs.remaining_passes == 0;

        let out_name = if last && !configs.enable_shading_scale {
            configs.color_name.clone()
        } else {
            ping_pong_render_target(input.name(), configs.ldr_prefix(), configs.window_id)
        };
        let out = ResourceKey::new(&out_name);

        let width = configs.width;
        let height = configs.height;
        let handle = graph.add_render_pass("fxaa", width, height);
        {
            let pass = graph.pass_mut(handle);
            pass.add_render_target(
                out,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                wgpu::StoreOp::Store,
            );
            pass.add_texture(input, "sceneColorMap");
            pass.set_vec4(
                "texSize",
                Vec4::new(
                    width as f32,
                    height as f32,
                    1.0 / width as f32,
                    1.0 / height as f32,
                ),
            );
            pass.add_queue(QueueHint::None, "post-process")
                .add_camera_quad(camera, &material, PASS_FXAA);
        }

        if last && configs.enable_shading_scale {
            return Some(add_copy_to_screen_pass(graph, configs, camera, &out_name));
        }
        Some(handle)
    }
}
