//! 渲染通道记录
//!
//! `RenderPass` 是一条声明式的通道记录：附件、采样输入、渲染队列与
//! 着色器参数。真正的 GPU 编码由外部执行器完成，这里只负责把一帧的
//! 结构完整地描述出来。

use glam::{Vec2, Vec4};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use uuid::Uuid;

use super::resource::ResourceKey;
use crate::resources::Material;

bitflags::bitflags! {
    /// Scene content selected into a queue.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SceneFlags: u32 {
        const NONE             = 0;
        const OPAQUE           = 1 << 0;
        const MASK             = 1 << 1;
        const BLEND            = 1 << 2;
        const SHADOW_CASTER    = 1 << 3;
        const UI               = 1 << 4;
        const DEFAULT_LIGHTING = 1 << 5;
        const PLANAR_SHADOW    = 1 << 8;
        const GEOMETRY         = 1 << 9;
        const PROFILER         = 1 << 10;
        const REFLECTION_PROBE = 1 << 12;
    }
}

/// Batching hint for a queue's sort and pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueHint {
    None,
    Opaque,
    Mask,
    Blend,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Vec4(Vec4),
    Vec2(Vec2),
    Float(f32),
}

/// 着色器参数集合，按名字记录
#[derive(Debug, Clone, Default)]
pub struct ShaderParams {
    values: FxHashMap<String, ParamValue>,
}

impl ShaderParams {
    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.values.insert(name.to_owned(), ParamValue::Vec4(value));
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.values.insert(name.to_owned(), ParamValue::Vec2(value));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.values
            .insert(name.to_owned(), ParamValue::Float(value));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn get_vec4(&self, name: &str) -> Option<Vec4> {
        match self.values.get(name) {
            Some(ParamValue::Vec4(v)) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_float(&self, name: &str) -> Option<f32> {
        match self.values.get(name) {
            Some(ParamValue::Float(v)) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorAttachment {
    pub target: ResourceKey,
    pub load: wgpu::LoadOp<wgpu::Color>,
    pub store: wgpu::StoreOp,
    /// Single-sample target multisampled color resolves into.
    pub resolve_target: Option<ResourceKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepthStencilAttachment {
    pub target: ResourceKey,
    pub depth_load: wgpu::LoadOp<f32>,
    pub depth_store: wgpu::StoreOp,
    pub stencil_load: wgpu::LoadOp<u32>,
    pub stencil_store: wgpu::StoreOp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One recorded draw source inside a queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueCommand {
    /// Scene geometry visible from a camera, filtered by flags. A light id
    /// marks per-light additive queues and shadow-caster queues.
    Scene {
        camera: Uuid,
        flags: SceneFlags,
        light_id: Option<u64>,
    },
    /// Fullscreen triangle with a material pass, used by post-process stages.
    FullscreenQuad { material: Material, pass_index: u32 },
    /// Fullscreen quad that also binds the camera's uniforms.
    CameraQuad {
        camera: Uuid,
        material: Material,
        pass_index: u32,
    },
    /// 2D batcher output (UI widgets).
    Draw2d,
    /// On-screen statistics overlay.
    Profiler { camera: Uuid },
}

#[derive(Debug, Clone)]
pub struct RenderQueue {
    pub hint: QueueHint,
    pub phase: String,
    pub commands: Vec<QueueCommand>,
    pub params: ShaderParams,
    /// Queue-level viewport override, used by the cascade atlas.
    pub viewport: Option<Viewport>,
}

impl RenderQueue {
    fn new(hint: QueueHint, phase: &str) -> Self {
        Self {
            hint,
            phase: phase.to_owned(),
            commands: Vec::new(),
            params: ShaderParams::default(),
            viewport: None,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> &mut Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn add_scene(&mut self, camera: &crate::scene::Camera, flags: SceneFlags) -> &mut Self {
        self.commands.push(QueueCommand::Scene {
            camera: camera.uuid,
            flags,
            light_id: None,
        });
        self
    }

    /// Scene draw restricted to one light, for additive lighting and
    /// shadow-caster passes.
    pub fn add_scene_with_light(
        &mut self,
        camera: &crate::scene::Camera,
        flags: SceneFlags,
        light_id: u64,
    ) -> &mut Self {
        self.commands.push(QueueCommand::Scene {
            camera: camera.uuid,
            flags,
            light_id: Some(light_id),
        });
        self
    }

    pub fn add_fullscreen_quad(&mut self, material: &Material, pass_index: u32) -> &mut Self {
        self.commands.push(QueueCommand::FullscreenQuad {
            material: material.clone(),
            pass_index,
        });
        self
    }

    pub fn add_camera_quad(
        &mut self,
        camera: &crate::scene::Camera,
        material: &Material,
        pass_index: u32,
    ) -> &mut Self {
        self.commands.push(QueueCommand::CameraQuad {
            camera: camera.uuid,
            material: material.clone(),
            pass_index,
        });
        self
    }

    pub fn add_draw_2d(&mut self) -> &mut Self {
        self.commands.push(QueueCommand::Draw2d);
        self
    }

    pub fn add_profiler(&mut self, camera: &crate::scene::Camera) -> &mut Self {
        self.commands.push(QueueCommand::Profiler {
            camera: camera.uuid,
        });
        self
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) -> &mut Self {
        self.params.set_vec4(name, value);
        self
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) -> &mut Self {
        self.params.set_vec2(name, value);
        self
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> &mut Self {
        self.params.set_float(name, value);
        self
    }
}

/// Recorded render pass. Built through [`RenderGraph::add_render_pass`] and
/// mutated in place by the pass builders.
///
/// [`RenderGraph::add_render_pass`]: super::RenderGraph::add_render_pass
#[derive(Debug, Clone)]
pub struct RenderPass {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub color_attachments: SmallVec<[ColorAttachment; 2]>,
    pub depth_stencil: Option<DepthStencilAttachment>,
    /// Sampled inputs, keyed by shader binding name.
    pub inputs: SmallVec<[(ResourceKey, String); 4]>,
    pub viewport: Option<Viewport>,
    pub queues: Vec<RenderQueue>,
    pub params: ShaderParams,
}

impl RenderPass {
    pub(super) fn new(name: &str, width: u32, height: u32, sample_count: u32) -> Self {
        Self {
            name: name.to_owned(),
            width,
            height,
            sample_count,
            color_attachments: SmallVec::new(),
            depth_stencil: None,
            inputs: SmallVec::new(),
            viewport: None,
            queues: Vec::new(),
            params: ShaderParams::default(),
        }
    }

    pub fn add_render_target(
        &mut self,
        target: ResourceKey,
        load: wgpu::LoadOp<wgpu::Color>,
        store: wgpu::StoreOp,
    ) -> &mut Self {
        self.color_attachments.push(ColorAttachment {
            target,
            load,
            store,
            resolve_target: None,
        });
        self
    }

    /// Multisampled color attachment resolving into `resolve_target`.
    pub fn add_resolved_render_target(
        &mut self,
        target: ResourceKey,
        resolve_target: ResourceKey,
        load: wgpu::LoadOp<wgpu::Color>,
        store: wgpu::StoreOp,
    ) -> &mut Self {
        self.color_attachments.push(ColorAttachment {
            target,
            load,
            store,
            resolve_target: Some(resolve_target),
        });
        self
    }

    pub fn add_depth_stencil(
        &mut self,
        target: ResourceKey,
        depth_load: wgpu::LoadOp<f32>,
        depth_store: wgpu::StoreOp,
    ) -> &mut Self {
        self.depth_stencil = Some(DepthStencilAttachment {
            target,
            depth_load,
            depth_store,
            stencil_load: wgpu::LoadOp::Clear(0),
            stencil_store: wgpu::StoreOp::Discard,
        });
        self
    }

    /// Binds a declared resource as a sampled input under a shader name.
    pub fn add_texture(&mut self, source: ResourceKey, binding: &str) -> &mut Self {
        self.inputs.push((source, binding.to_owned()));
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> &mut Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn add_queue(&mut self, hint: QueueHint, phase: &str) -> &mut RenderQueue {
        self.queues.push(RenderQueue::new(hint, phase));
        self.queues.last_mut().unwrap()
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) -> &mut Self {
        self.params.set_vec4(name, value);
        self
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) -> &mut Self {
        self.params.set_vec2(name, value);
        self
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> &mut Self {
        self.params.set_float(name, value);
        self
    }

    /// The image this pass leaves behind: the first color attachment, or its
    /// resolve target when multisampled.
    #[must_use]
    pub fn output(&self) -> Option<ResourceKey> {
        self.color_attachments
            .first()
            .map(|a| a.resolve_target.unwrap_or(a.target))
    }

    /// True when any queue samples or draws scene geometry (as opposed to
    /// pure fullscreen work).
    #[must_use]
    pub fn has_scene_queue(&self) -> bool {
        self.queues
            .iter()
            .any(|q| q.commands.iter().any(|c| matches!(c, QueueCommand::Scene { .. })))
    }
}
