//! UI compositing stage.
//!
//! Appends the UI queue to whichever pass currently owns the window output,
//! so widgets composite over the finished scene without an extra pass. Runs
//! last and records no color target of its own.

use crate::graph::{PassHandle, QueueHint, RenderGraph, SceneFlags};
use crate::pipeline::builder::PipelinePassBuilder;
use crate::pipeline::config::{CameraConfigs, PipelineConfigs};
use crate::scene::{Camera, RenderScene};

#[derive(Debug, Default)]
pub struct UiPassBuilder;

impl UiPassBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PipelinePassBuilder for UiPassBuilder {
    fn name(&self) -> &'static str {
        "ui"
    }

    fn config_order(&self) -> i32 {
        0
    }

    fn render_order(&self) -> i32 {
        1000
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
        let handle = prev.expect("ui stage requires a previous render pass");

        let queue = graph
            .pass_mut(handle)
            .add_queue(QueueHint::Blend, "default");
        queue.add_scene(camera, SceneFlags::UI | SceneFlags::BLEND);
        queue.add_draw_2d();
        if configs.enable_profiler {
            queue.add_profiler(camera);
        }
        Some(handle)
    }
}
