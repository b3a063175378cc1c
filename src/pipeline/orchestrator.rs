//! Builtin pipeline orchestrator.
//!
//! Owns the pass builders and drives the two-phase protocol over them for
//! every camera: a config pass in config order, then a setup pass in render
//! order, threading each builder's last pass into the next. Cameras flagged
//! off the full pipeline get a minimal forward-and-UI path instead.

use log::debug;

use crate::graph::{PassHandle, QueueHint, RenderGraph, ResourceKey, SceneFlags};
use crate::resources::Material;
use crate::scene::{Camera, RenderScene};
use crate::settings::PipelineSettings;

use super::builder::{config_sorted_indices, render_sorted_indices, PipelinePassBuilder};
use super::config::{CameraConfigs, DeviceCaps, PipelineConfigs};
use super::passes::{
    BloomPassBuilder, ForwardPassBuilder, FsrPassBuilder, FxaaPassBuilder,
    ToneMappingPassBuilder, UiPassBuilder,
};

pub struct BuiltinPipeline {
    pipeline_configs: PipelineConfigs,
    /// Fallback settings for cameras without an override.
    settings: PipelineSettings,
    camera_configs: CameraConfigs,
    builders: Vec<Box<dyn PipelinePassBuilder>>,
}

impl BuiltinPipeline {
    #[must_use]
    pub fn new(caps: &DeviceCaps, settings: PipelineSettings) -> Self {
        let mut pipeline = Self {
            pipeline_configs: PipelineConfigs::new(caps),
            settings,
            camera_configs: CameraConfigs::default(),
            builders: Vec::new(),
        };
        pipeline.camera_configs.copy_and_tonemap_material =
            Some(Material::new("builtin-copy-and-tonemap"));

        pipeline.add_builder(Box::new(ForwardPassBuilder::new()));
        pipeline.add_builder(Box::new(BloomPassBuilder::new()));
        pipeline.add_builder(Box::new(ToneMappingPassBuilder::new()));
        pipeline.add_builder(Box::new(FxaaPassBuilder::new()));
        pipeline.add_builder(Box::new(FsrPassBuilder::new()));
        pipeline.add_builder(Box::new(UiPassBuilder::new()));
        pipeline
    }

    /// Registers an additional stage. Order values decide where it lands in
    /// both phases, ties run after the builtin stages.
    pub fn add_builder(&mut self, builder: Box<dyn PipelinePassBuilder>) {
        self.builders.push(builder);
    }

    #[must_use]
    pub fn pipeline_configs(&self) -> &PipelineConfigs {
        &self.pipeline_configs
    }

    /// Camera configs left by the most recent config phase. Test hook and
    /// debug surface.
    #[must_use]
    pub fn camera_configs(&self) -> &CameraConfigs {
        &self.camera_configs
    }

    #[must_use]
    pub fn default_settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn set_default_settings(&mut self, settings: PipelineSettings) {
        self.settings = settings;
    }

    fn run_config_phase(&mut self, camera: &Camera, scene: &RenderScene) {
        self.camera_configs
            .reset(camera, &self.settings, &self.pipeline_configs);
        for index in config_sorted_indices(&self.builders) {
            self.builders[index].config_camera(
                camera,
                scene,
                &self.pipeline_configs,
                &mut self.camera_configs,
            );
        }
    }

    /// Re-declares every window-sized target. Call on window creation and
    /// whenever the window or the shading scale changes.
    pub fn window_resize(&mut self, graph: &mut RenderGraph, camera: &Camera, scene: &RenderScene) {
        self.run_config_phase(camera, scene);
        let configs = &self.camera_configs;
        let native_w = configs.native_width;
        let native_h = configs.native_height;

        debug!(
            "window {} resize: native {}x{}, scene {}x{}",
            configs.window_id, native_w, native_h, configs.width, configs.height
        );

        graph.add_render_window(
            &configs.color_name,
            wgpu::TextureFormat::Bgra8Unorm,
            native_w,
            native_h,
        );
        graph.add_depth_stencil(
            &configs.depth_stencil_name,
            wgpu::TextureFormat::Depth24PlusStencil8,
            native_w,
            native_h,
        );

        if configs.enable_full_pipeline {
            graph.add_depth_stencil(
                &configs.scene_depth_name(),
                wgpu::TextureFormat::Depth32Float,
                configs.width,
                configs.height,
            );
            for slot in 0..2 {
                graph.add_render_target(
                    &configs.radiance_name(slot),
                    configs.radiance_format,
                    configs.width,
                    configs.height,
                );
                graph.add_render_target(
                    &configs.ldr_color_name(slot),
                    wgpu::TextureFormat::Rgba8Unorm,
                    configs.width,
                    configs.height,
                );
                graph.add_render_target(
                    &configs.ui_color_name(slot),
                    wgpu::TextureFormat::Rgba8Unorm,
                    native_w,
                    native_h,
                );
            }
        }

        for index in render_sorted_indices(&self.builders) {
            self.builders[index].window_resize(
                graph,
                &self.pipeline_configs,
                &self.camera_configs,
                camera,
            );
        }
    }

    /// Records one camera's frame into the graph.
    ///
    /// # Panics
    /// Panics when the builders' `remaining_passes` accounting does not
    /// return to zero, meaning a stage configured output it never recorded
    /// (or recorded output it never configured).
    pub fn setup_camera(&mut self, graph: &mut RenderGraph, camera: &Camera, scene: &RenderScene) {
        self.run_config_phase(camera, scene);

        if !self.camera_configs.enable_full_pipeline {
            self.add_simple_pipeline(graph, camera);
            return;
        }

        let mut prev: Option<PassHandle> = None;
        for index in render_sorted_indices(&self.builders) {
            prev = self.builders[index].setup(
                graph,
                &self.pipeline_configs,
                &mut self.camera_configs,
                camera,
                scene,
                prev,
            );
        }

        assert_eq!(
            self.camera_configs.remaining_passes, 0,
            "pass builders out of balance"
        );
        graph.validate();
    }

    /// Forward-and-UI path for overlay and preview cameras.
    fn add_simple_pipeline(&mut self, graph: &mut RenderGraph, camera: &Camera) {
        let configs = &self.camera_configs;
        let color = ResourceKey::new(&configs.color_name);
        let depth = ResourceKey::new(&configs.depth_stencil_name);

        let handle = graph.add_render_pass("simple", configs.native_width, configs.native_height);
        let pass = graph.pass_mut(handle);

        let color_load = if camera.needs_clear_color() {
            wgpu::LoadOp::Clear(camera.clear_color)
        } else {
            wgpu::LoadOp::Load
        };
        pass.add_render_target(color, color_load, wgpu::StoreOp::Store);
        pass.add_depth_stencil(
            depth,
            wgpu::LoadOp::Clear(camera.clear_depth),
            wgpu::StoreOp::Discard,
        );

        pass.add_queue(QueueHint::Opaque, "default")
            .add_scene(camera, SceneFlags::OPAQUE | SceneFlags::MASK);
        pass.add_queue(QueueHint::Blend, "default")
            .add_scene(camera, SceneFlags::BLEND);
        let ui = pass.add_queue(QueueHint::Blend, "default");
        ui.add_scene(camera, SceneFlags::UI | SceneFlags::BLEND);
        ui.add_draw_2d();
        if configs.enable_profiler {
            ui.add_profiler(camera);
        }
    }
}
