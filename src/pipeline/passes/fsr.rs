//! FidelityFX Super Resolution stage.
//!
//! Upscales the scaled LDR image back to native resolution: an EASU pass
//! does the spatial upscale, an RCAS pass sharpens the result. Only makes
//! sense below native resolution, so it requires an active shading scale.

use glam::Vec4;

use crate::graph::{PassHandle, QueueHint, RenderGraph, ResourceKey};
use crate::pipeline::builder::{ping_pong_render_target, PipelinePassBuilder};
use crate::pipeline::config::{CameraConfigs, PipelineConfigs};
use crate::scene::{Camera, RenderScene};

const PASS_EASU: u32 = 0;
const PASS_RCAS: u32 = 1;

#[derive(Debug, Default)]
pub struct FsrPassBuilder;

impl FsrPassBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn tex_size(width: u32, height: u32) -> Vec4 {
    Vec4::new(
        width as f32,
        height as f32,
        1.0 / width as f32,
        1.0 / height as f32,
    )
}

impl PipelinePassBuilder for FsrPassBuilder {
    fn name(&self) -> &'static str {
        "fsr"
    }

    fn config_order(&self) -> i32 {
        0
    }

    fn render_order(&self) -> i32 {
        500
    }

    fn config_camera(
        &mut self,
        _camera: &Camera,
        _scene: &RenderScene,
        _pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
    ) {
        configs.fsr.enable_fsr = configs.settings.fsr.enabled
            && configs.settings.fsr.material.is_some()
            && configs.enable_shading_scale
            && configs.shading_scale < 1.0;
        if configs.fsr.enable_fsr {
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
        if !configs.fsr.enable_fsr {
            return prev;
        }
        let Some(prev_handle) = prev else {
            return prev;
        };
        let Some(material) = configs.settings.fsr.material.clone() else {
            return prev;
        };
        let Some(input) = graph.pass(prev_handle).output() else {
            return prev;
        };

        configs.remaining_passes -= 1;
        assert!(configs.remaining_passes >= 0, "fsr pass scheduled twice");
        let last = configs.remaining_passes == 0;

        let id = configs.window_id;
        let native_w = configs.native_width;
        let native_h = configs.native_height;

        // RCAS wants sharpening attenuation, not strength.
        let sharpness = (1.0 - configs.settings.fsr.sharpness).clamp(0.02, 0.98);
        let params = Vec4::new(sharpness, 0.0, 0.0, 0.0);

        // EASU upscales into the native-resolution UI chain.
        let easu_out = ResourceKey::new(&configs.ui_color_name(0));
        let easu = graph.add_render_pass("fsr-easu", native_w, native_h);
        {
            let pass = graph.pass_mut(easu);
            pass.add_render_target(
                easu_out,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                wgpu::StoreOp::Store,
            );
            pass.add_texture(input, "outputResultMap");
            pass.set_vec4("fsrTexSize", tex_size(configs.width, configs.height));
            pass.add_queue(QueueHint::None, "post-process")
                .add_camera_quad(camera, &material, PASS_EASU);
        }

        let out_name = if last {
            configs.color_name.clone()
        } else {
            ping_pong_render_target(easu_out.name(), "UiColor", id)
        };
        let out = ResourceKey::new(&out_name);

        let rcas = graph.add_render_pass("fsr-rcas", native_w, native_h);
        {
            let pass = graph.pass_mut(rcas);
            pass.add_render_target(
                out,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                wgpu::StoreOp::Store,
            );
            pass.add_texture(easu_out, "outputResultMap");
            pass.set_vec4("fsrParams", params);
            pass.set_vec4("fsrTexSize", tex_size(native_w, native_h));
            pass.add_queue(QueueHint::None, "post-process")
                .add_camera_quad(camera, &material, PASS_RCAS);
        }

        Some(rcas)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn rcas_attenuation_is_clamped() {
        // Attenuation is 1 - sharpness, held inside [0.02, 0.98].
        let clamp = |sharpness: f32| (1.0 - sharpness).clamp(0.02, 0.98);
        assert!((clamp(0.8) - 0.2).abs() < 1e-6);
        assert!((clamp(1.0) - 0.02).abs() < f32::EPSILON);
        assert!((clamp(0.0) - 0.98).abs() < f32::EPSILON);
    }
}
