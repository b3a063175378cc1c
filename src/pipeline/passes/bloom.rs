//! Bloom stage.
//!
//! Prefilters bright pixels into a half-resolution chain, walks it down and
//! back up, then composites onto the radiance image. The Kawase dual filter
//! rewrites each level on the way up; the mipmap variant accumulates into the
//! existing level instead.

use glam::Vec4;

use crate::graph::{PassHandle, QueueHint, RenderGraph, ResourceKey};
use crate::pipeline::builder::{add_copy_to_screen_pass, ping_pong_render_target, PipelinePassBuilder};
use crate::pipeline::config::{CameraConfigs, PipelineConfigs};
use crate::scene::{Camera, RenderScene};
use crate::settings::BloomKind;

// Material pass layout shared by both bloom materials.
const PASS_PREFILTER: u32 = 0;
const PASS_DOWNSAMPLE: u32 = 1;
const PASS_UPSAMPLE: u32 = 2;
const PASS_COMBINE: u32 = 3;

#[derive(Debug, Default)]
pub struct BloomPassBuilder;

impl BloomPassBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn level_size(base: u32, level: u32) -> u32 {
        (base >> (level + 1)).max(1)
    }

    fn tex_name(id: u32, level: u32) -> String {
        format!("BloomTex{id}_{level}")
    }
}

fn tex_size_param(width: u32, height: u32) -> Vec4 {
    let w = width as f32;
    let h = height as f32;
    Vec4::new(w, h, 1.0 / w, 1.0 / h)
}

impl PipelinePassBuilder for BloomPassBuilder {
    fn name(&self) -> &'static str {
        "bloom"
    }

    fn config_order(&self) -> i32 {
        0
    }

    fn render_order(&self) -> i32 {
        200
    }

    fn config_camera(
        &mut self,
        _camera: &Camera,
        _scene: &RenderScene,
        _pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
    ) {
        configs.bloom.enable_bloom =
            configs.settings.bloom.enabled && configs.settings.bloom.material.is_some();
        if configs.bloom.enable_bloom {
            configs.remaining_passes += 1;
        }
    }

    fn window_resize(
        &mut self,
        graph: &mut RenderGraph,
        _pipeline: &PipelineConfigs,
        configs: &CameraConfigs,
        _camera: &Camera,
    ) {
        if !configs.bloom.enable_bloom {
            return;
        }
        let id = configs.window_id;
        for level in 0..=configs.settings.bloom.iterations.max(1) {
            graph.add_render_target(
                &Self::tex_name(id, level),
                configs.radiance_format,
                Self::level_size(configs.width, level),
                Self::level_size(configs.height, level),
            );
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
        if !configs.bloom.enable_bloom {
            return prev;
        }
        let Some(prev_handle) = prev else {
            return prev;
        };
        let Some(material) = configs.settings.bloom.material.clone() else {
            return prev;
        };
        let Some(input) = graph.pass(prev_handle).output() else {
            return prev;
        };

        configs.remaining_passes -= 1;
        assert!(configs.remaining_passes >= 0, "bloom pass scheduled twice");
        let last = configs.remaining_passes == 0;

        let id = configs.window_id;
        let iterations = configs.settings.bloom.iterations.max(1);
        let bloom = &configs.settings.bloom;
        let params = Vec4::new(
            bloom.threshold,
            bloom.intensity,
            if bloom.enable_alpha_mask { 1.0 } else { 0.0 },
            iterations as f32,
        );

        // Prefilter into the first chain level.
        {
            let w = Self::level_size(configs.width, 0);
            let h = Self::level_size(configs.height, 0);
            let target = ResourceKey::new(&Self::tex_name(id, 0));
            let handle = graph.add_render_pass("bloom-prefilter", w, h);
            let pass = graph.pass_mut(handle);
            pass.add_render_target(
                target,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                wgpu::StoreOp::Store,
            );
            pass.add_texture(input, "inputTexture");
            pass.set_vec4("bloomParams", params);
            pass.set_vec4("texSize", tex_size_param(w, h));
            pass.add_queue(QueueHint::None, "bloom")
                .add_fullscreen_quad(&material, PASS_PREFILTER);
        }

        for level in 1..=iterations {
            let w = Self::level_size(configs.width, level);
            let h = Self::level_size(configs.height, level);
            let source = ResourceKey::new(&Self::tex_name(id, level - 1));
            let target = ResourceKey::new(&Self::tex_name(id, level));
            let handle = graph.add_render_pass("bloom-downsample", w, h);
            let pass = graph.pass_mut(handle);
            pass.add_render_target(
                target,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                wgpu::StoreOp::Store,
            );
            pass.add_texture(source, "inputTexture");
            pass.set_vec4("texSize", tex_size_param(w, h));
            pass.add_queue(QueueHint::None, "bloom")
                .add_fullscreen_quad(&material, PASS_DOWNSAMPLE);
        }

        for level in (0..iterations).rev() {
            let w = Self::level_size(configs.width, level);
            let h = Self::level_size(configs.height, level);
            let source = ResourceKey::new(&Self::tex_name(id, level + 1));
            let target = ResourceKey::new(&Self::tex_name(id, level));
            let load = match configs.settings.bloom.kind {
                // The mipmap chain accumulates into what the downsample walk
                // left behind.
                BloomKind::Mipmap => wgpu::LoadOp::Load,
                BloomKind::KawaseDualFilter => wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            };
            let handle = graph.add_render_pass("bloom-upsample", w, h);
            let pass = graph.pass_mut(handle);
            pass.add_render_target(target, load, wgpu::StoreOp::Store);
            pass.add_texture(source, "inputTexture");
            pass.set_vec4("texSize", tex_size_param(w, h));
            pass.add_queue(QueueHint::None, "bloom")
                .add_fullscreen_quad(&material, PASS_UPSAMPLE);
        }

        // Composite bloom onto the radiance image.
        let out_name = if last && !configs.enable_shading_scale {
            configs.color_name.clone()
        } else {
            ping_pong_render_target(input.name(), configs.radiance_prefix(), id)
        };
        let out = ResourceKey::new(&out_name);
        let handle = graph.add_render_pass("bloom-combine", configs.width, configs.height);
        {
            let pass = graph.pass_mut(handle);
            pass.add_render_target(
                out,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                wgpu::StoreOp::Store,
            );
            pass.add_texture(input, "inputTexture");
            pass.add_texture(ResourceKey::new(&Self::tex_name(id, 0)), "bloomTexture");
            pass.set_vec4("bloomParams", params);
            pass.add_queue(QueueHint::None, "bloom")
                .add_camera_quad(camera, &material, PASS_COMBINE);
        }

        if last && configs.enable_shading_scale {
            return Some(add_copy_to_screen_pass(graph, configs, camera, &out_name));
        }
        Some(handle)
    }
}
