//! Render Graph
//!
//! Declarative frame description consumed by the GPU executor. Pass builders
//! declare named resources and record passes against them; nothing here
//! touches the device, so the whole graph can be built and inspected on the
//! CPU.
//!
//! A frame is recorded in two steps:
//!
//! 1. **Declare** every window, color target, and depth target by name.
//!    Re-declaring updates dimensions, which is how resize works.
//! 2. **Record** passes in execution order. Each pass names its attachments
//!    and sampled inputs by key and fills one or more queues.

pub mod pass;
pub mod resource;

pub use pass::{
    ColorAttachment, DepthStencilAttachment, ParamValue, QueueCommand, QueueHint, RenderPass,
    RenderQueue, SceneFlags, ShaderParams, Viewport,
};
pub use resource::{ResourceDesc, ResourceKey, ResourceKind, ResourceRegistry};

use crate::resources::Material;

/// Index of a recorded pass within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassHandle(usize);

#[derive(Debug, Default)]
pub struct RenderGraph {
    resources: ResourceRegistry,
    passes: Vec<RenderPass>,
}

impl RenderGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Resource declarations ───────────────────────────────────────────

    pub fn add_render_window(
        &mut self,
        name: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> ResourceKey {
        let key = ResourceKey::new(name);
        self.resources.declare(
            key,
            ResourceDesc {
                kind: ResourceKind::RenderWindow,
                format,
                width,
                height,
                sample_count: 1,
            },
        );
        key
    }

    pub fn add_render_target(
        &mut self,
        name: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> ResourceKey {
        let key = ResourceKey::new(name);
        self.resources.declare(
            key,
            ResourceDesc {
                kind: ResourceKind::RenderTarget,
                format,
                width,
                height,
                sample_count: 1,
            },
        );
        key
    }

    pub fn add_depth_stencil(
        &mut self,
        name: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> ResourceKey {
        let key = ResourceKey::new(name);
        self.resources.declare(
            key,
            ResourceDesc {
                kind: ResourceKind::DepthStencil,
                format,
                width,
                height,
                sample_count: 1,
            },
        );
        key
    }

    /// Memoryless on tile GPUs; only the resolved output leaves the pass.
    pub fn add_msaa_render_target(
        &mut self,
        name: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> ResourceKey {
        let key = ResourceKey::new(name);
        self.resources.declare(
            key,
            ResourceDesc {
                kind: ResourceKind::MsaaColor,
                format,
                width,
                height,
                sample_count,
            },
        );
        key
    }

    pub fn add_msaa_depth_stencil(
        &mut self,
        name: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> ResourceKey {
        let key = ResourceKey::new(name);
        self.resources.declare(
            key,
            ResourceDesc {
                kind: ResourceKind::MsaaDepthStencil,
                format,
                width,
                height,
                sample_count,
            },
        );
        key
    }

    // ─── Pass recording ──────────────────────────────────────────────────

    pub fn add_render_pass(&mut self, name: &str, width: u32, height: u32) -> PassHandle {
        self.passes.push(RenderPass::new(name, width, height, 1));
        PassHandle(self.passes.len() - 1)
    }

    pub fn add_multisample_render_pass(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> PassHandle {
        self.passes
            .push(RenderPass::new(name, width, height, sample_count));
        PassHandle(self.passes.len() - 1)
    }

    /// Records a fullscreen blit from `source` into `target` using the given
    /// copy material.
    pub fn add_copy_pass(
        &mut self,
        source: ResourceKey,
        target: ResourceKey,
        material: &Material,
        pass_index: u32,
    ) -> PassHandle {
        let desc = *self.resources.expect(target);
        let handle = self.add_render_pass("copy", desc.width, desc.height);
        let pass = self.pass_mut(handle);
        pass.add_render_target(target, wgpu::LoadOp::Load, wgpu::StoreOp::Store);
        pass.add_texture(source, "inputTexture");
        pass.add_queue(QueueHint::None, "post-process")
            .add_fullscreen_quad(material, pass_index);
        handle
    }

    /// # Panics
    /// Panics if the handle is from a previous frame.
    #[must_use]
    pub fn pass_mut(&mut self, handle: PassHandle) -> &mut RenderPass {
        &mut self.passes[handle.0]
    }

    #[must_use]
    pub fn pass(&self, handle: PassHandle) -> &RenderPass {
        &self.passes[handle.0]
    }

    #[must_use]
    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    #[must_use]
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Validates that every attachment and sampled input of every recorded
    /// pass refers to a declared resource.
    ///
    /// # Panics
    /// Panics on the first dangling reference, naming it.
    pub fn validate(&self) {
        for pass in &self.passes {
            for attachment in &pass.color_attachments {
                let _ = self.resources.expect(attachment.target);
                if let Some(resolve) = attachment.resolve_target {
                    let _ = self.resources.expect(resolve);
                }
            }
            if let Some(ds) = &pass.depth_stencil {
                let _ = self.resources.expect(ds.target);
            }
            for (key, _) in &pass.inputs {
                let _ = self.resources.expect(*key);
            }
        }
    }

    /// Drops the recorded passes. Resource declarations persist so resize
    /// logic only has to re-declare what actually changed.
    pub fn reset_frame(&mut self) {
        self.passes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_pass_records_blit() {
        let mut graph = RenderGraph::new();
        let src = graph.add_render_target("Src", wgpu::TextureFormat::Rgba8Unorm, 64, 64);
        let dst = graph.add_render_target("Dst", wgpu::TextureFormat::Rgba8Unorm, 64, 64);

        let material = Material::new("blit");
        let handle = graph.add_copy_pass(src, dst, &material, 0);
        graph.validate();

        let pass = graph.pass(handle);
        assert_eq!(pass.output(), Some(dst));
        assert_eq!(pass.inputs.len(), 1);
        assert_eq!(pass.queues.len(), 1);
    }

    #[test]
    fn reset_frame_keeps_declarations() {
        let mut graph = RenderGraph::new();
        graph.add_render_target("Keep", wgpu::TextureFormat::Rgba16Float, 8, 8);
        graph.add_render_pass("scene", 8, 8);

        graph.reset_frame();
        assert!(graph.passes().is_empty());
        assert!(graph.resources().contains(ResourceKey::new("Keep")));
    }
}
