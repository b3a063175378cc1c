//! Pass builder contract.
//!
//! The pipeline is assembled from small builders, one per stage. Each frame
//! runs two phases over them:
//!
//! - **config**, in `config_order`: builders inspect the camera and settings
//!   and fill their section of [`CameraConfigs`], bumping `remaining_passes`
//!   when they will record work.
//! - **setup**, in `render_order`: builders record their passes into the
//!   graph, chaining through the previous builder's last pass.
//!
//! Both orders are sorted stably, so builders sharing an order value keep
//! their registration order.

use crate::graph::{PassHandle, RenderGraph};
use crate::scene::{Camera, RenderScene};

use super::config::{CameraConfigs, PipelineConfigs};

pub trait PipelinePassBuilder {
    fn name(&self) -> &'static str;

    /// Position in the config phase.
    fn config_order(&self) -> i32;

    /// Position in the setup phase.
    fn render_order(&self) -> i32;

    /// Fills this builder's section of the camera configs. Builders that will
    /// record color output increment `configs.remaining_passes` here.
    fn config_camera(
        &mut self,
        camera: &Camera,
        scene: &RenderScene,
        pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
    ) {
        let _ = (camera, scene, pipeline, configs);
    }

    /// Declares the builder's persistent targets at the window's current
    /// size. Called whenever the window is created or resized.
    fn window_resize(
        &mut self,
        graph: &mut RenderGraph,
        pipeline: &PipelineConfigs,
        configs: &CameraConfigs,
        camera: &Camera,
    ) {
        let _ = (graph, pipeline, configs, camera);
    }

    /// Records this builder's passes. Receives the previous builder's last
    /// pass and returns its own, or `prev` unchanged when disabled.
    fn setup(
        &mut self,
        graph: &mut RenderGraph,
        pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
        camera: &Camera,
        scene: &RenderScene,
        prev: Option<PassHandle>,
    ) -> Option<PassHandle> {
        let _ = (graph, pipeline, scene, camera, configs);
        prev
    }
}

/// Indices of `builders` in config-phase order. The sort is stable, ties keep
/// registration order.
#[must_use]
pub fn config_sorted_indices(builders: &[Box<dyn PipelinePassBuilder>]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..builders.len()).collect();
    indices.sort_by_key(|&i| builders[i].config_order());
    indices
}

/// Indices of `builders` in setup-phase order.
#[must_use]
pub fn render_sorted_indices(builders: &[Box<dyn PipelinePassBuilder>]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..builders.len()).collect();
    indices.sort_by_key(|&i| builders[i].render_order());
    indices
}

/// Blits `source` into the camera's window at native resolution with the
/// copy-and-tonemap material. Used whenever a stage finishes at scaled
/// resolution but the chain has run out of native-resolution stages.
pub fn add_copy_to_screen_pass(
    graph: &mut RenderGraph,
    configs: &CameraConfigs,
    camera: &Camera,
    source_name: &str,
) -> PassHandle {
    let material = configs
        .copy_and_tonemap_material
        .clone()
        .unwrap_or_else(|| crate::resources::Material::new("builtin-copy-and-tonemap"));

    // The window target is declared by the orchestrator's resize path.
    let target = crate::graph::ResourceKey::new(&configs.color_name);
    let source = crate::graph::ResourceKey::new(source_name);

    let handle = graph.add_render_pass("copy-to-screen", configs.native_width, configs.native_height);
    let pass = graph.pass_mut(handle);
    pass.add_render_target(target, wgpu::LoadOp::Load, wgpu::StoreOp::Store);
    pass.add_texture(source, "inputTexture");
    pass.add_queue(crate::graph::QueueHint::None, "post-process")
        .add_camera_quad(camera, &material, 0);
    handle
}

/// Flips between a stage's two ping-pong targets.
///
/// Targets are named `{prefix}{0|1}_{id}`. Given the name the previous pass
/// wrote, returns the other one; given anything else (or an upstream target),
/// returns slot 0.
#[must_use]
pub fn ping_pong_render_target(prev_name: &str, prefix: &str, id: u32) -> String {
    if prev_name == format!("{prefix}0_{id}") {
        format!("{prefix}1_{id}")
    } else {
        format!("{prefix}0_{id}")
    }
}
