//! Forward scene stage.
//!
//! Records, per camera: the cascaded shadow map for the main light,
//! reflection-probe captures, spot-light shadow maps, and the forward scene
//! pass itself (single multisampled pass or a chain of per-light passes).
//! Always the first color writer of the frame, so it increments
//! `remaining_passes` unconditionally.

use crate::graph::{PassHandle, QueueHint, RenderGraph, SceneFlags, Viewport};
use crate::pipeline::builder::{add_copy_to_screen_pass, PipelinePassBuilder};
use crate::pipeline::config::{CameraConfigs, PipelineConfigs};
use crate::pipeline::lighting::ForwardLighting;
use crate::scene::{
    Camera, CameraUsage, Light, LightKind, ProbeType, RenderScene, MAX_REFLECTION_PROBES,
};

#[derive(Debug, Default)]
pub struct ForwardPassBuilder {
    lighting: ForwardLighting,
}

/// Cascade viewport inside the 2x2 shadow atlas.
///
/// Fixed-area shadows and single-cascade lights use the whole map. The
/// screen-space sign decides whether cascade rows grow downward or upward.
#[must_use]
pub fn csm_main_light_viewport(
    fixed_area: bool,
    csm_level: u32,
    level: u32,
    width: u32,
    height: u32,
    screen_space_sign_y: f32,
) -> Viewport {
    if fixed_area || csm_level == 1 {
        return Viewport {
            x: 0,
            y: 0,
            width,
            height,
        };
    }
    let half_w = width / 2;
    let half_h = height / 2;
    let row = level / 2;
    let y = if screen_space_sign_y > 0.0 {
        (1 - row.min(1)) * half_h
    } else {
        row.min(1) * half_h
    };
    Viewport {
        x: (level % 2) * half_w,
        y,
        width: half_w,
        height: half_h,
    }
}

impl ForwardPassBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add_cascaded_shadow_map_pass(
        &self,
        graph: &mut RenderGraph,
        pipeline: &PipelineConfigs,
        configs: &CameraConfigs,
        camera: &Camera,
        light: &Light,
    ) {
        let id = configs.window_id;
        let (shadow_w, shadow_h) = pipeline.shadow_map_size;
        let map = graph.add_render_target(
            &format!("ShadowMap{id}"),
            pipeline.shadow_map_format,
            shadow_w,
            shadow_h,
        );
        let depth = graph.add_depth_stencil(
            &format!("ShadowDepth{id}"),
            wgpu::TextureFormat::Depth32Float,
            shadow_w,
            shadow_h,
        );

        let handle = graph.add_render_pass("cascaded-shadow-map", shadow_w, shadow_h);
        let pass = graph.pass_mut(handle);
        pass.add_render_target(
            map,
            wgpu::LoadOp::Clear(wgpu::Color::WHITE),
            wgpu::StoreOp::Store,
        );
        pass.add_depth_stencil(depth, wgpu::LoadOp::Clear(1.0), wgpu::StoreOp::Discard);

        let (csm_level, fixed_area) = match &light.kind {
            LightKind::Directional(d) => (d.csm_level.clamp(1, 4), d.shadow_fixed_area),
            _ => (1, true),
        };
        let levels = if fixed_area { 1 } else { csm_level };
        for level in 0..levels {
            let viewport = csm_main_light_viewport(
                fixed_area,
                csm_level,
                level,
                shadow_w,
                shadow_h,
                pipeline.screen_space_sign_y,
            );
            let queue = pass.add_queue(QueueHint::None, "shadow-caster");
            queue.set_viewport(viewport);
            queue.add_scene_with_light(
                camera,
                SceneFlags::OPAQUE | SceneFlags::MASK | SceneFlags::SHADOW_CASTER,
                light.id,
            );
        }
    }

    /// Captures pending reflection probes. Cube probes re-render only inside
    /// the editor; a frame takes at most [`MAX_REFLECTION_PROBES`] probes.
    fn add_reflection_probe_passes(
        &self,
        graph: &mut RenderGraph,
        configs: &CameraConfigs,
        scene: &RenderScene,
        editor: bool,
    ) {
        // Only probes actually captured count against the per-frame budget.
        for probe in scene
            .reflection_probes
            .iter()
            .filter(|probe| probe.need_render)
            .filter(|probe| probe.probe_type != ProbeType::Cube || editor)
            .take(MAX_REFLECTION_PROBES)
        {
            let (width, height) = probe.resolution();
            for face in 0..probe.face_count() {
                let color = graph.add_render_target(
                    &format!("{}_{face}", probe.camera.window.color_name),
                    configs.radiance_format,
                    width,
                    height,
                );
                let depth = graph.add_depth_stencil(
                    &format!("{}_{face}", probe.camera.window.depth_stencil_name),
                    wgpu::TextureFormat::Depth32Float,
                    width,
                    height,
                );

                let handle = graph.add_render_pass("reflection-probe", width, height);
                let pass = graph.pass_mut(handle);
                pass.add_render_target(
                    color,
                    wgpu::LoadOp::Clear(probe.camera.clear_color),
                    wgpu::StoreOp::Store,
                );
                pass.add_depth_stencil(depth, wgpu::LoadOp::Clear(1.0), wgpu::StoreOp::Discard);
                pass.add_queue(QueueHint::None, "reflect-map").add_scene(
                    &probe.camera,
                    SceneFlags::OPAQUE | SceneFlags::MASK | SceneFlags::REFLECTION_PROBE,
                );
            }
        }
    }

    /// Records the forward scene pass and its queues. Returns the pass so
    /// additive light work can chain onto it.
    #[allow(clippy::too_many_arguments)]
    fn add_forward_scene_pass(
        &self,
        graph: &mut RenderGraph,
        pipeline: &PipelineConfigs,
        configs: &CameraConfigs,
        camera: &Camera,
        scene: &RenderScene,
        color_name: &str,
        depth_name: &str,
    ) -> PassHandle {
        let id = configs.window_id;
        let width = configs.width;
        let height = configs.height;

        // The window target is declared by the resize path with its own
        // format; only intermediate radiance targets are declared here.
        let color = if color_name == configs.color_name {
            crate::graph::ResourceKey::new(color_name)
        } else {
            graph.add_render_target(color_name, configs.radiance_format, width, height)
        };
        let depth = graph.add_depth_stencil(
            depth_name,
            wgpu::TextureFormat::Depth32Float,
            width,
            height,
        );

        let color_load = if camera.needs_clear_color() {
            wgpu::LoadOp::Clear(camera.clear_color)
        } else {
            wgpu::LoadOp::Load
        };

        let handle = if configs.enable_msaa {
            let samples = configs.settings.msaa.sample_count;
            let msaa_color = graph.add_msaa_render_target(
                &format!("MsaaRadiance{id}"),
                configs.radiance_format,
                width,
                height,
                samples,
            );
            let msaa_depth = graph.add_msaa_depth_stencil(
                &format!("MsaaDepthStencil{id}"),
                wgpu::TextureFormat::Depth32Float,
                width,
                height,
                samples,
            );
            let handle = graph.add_multisample_render_pass("forward-msaa", width, height, samples);
            let pass = graph.pass_mut(handle);
            pass.add_resolved_render_target(msaa_color, color, color_load, wgpu::StoreOp::Discard);
            pass.add_depth_stencil(msaa_depth, wgpu::LoadOp::Clear(camera.clear_depth), wgpu::StoreOp::Discard);
            handle
        } else {
            let handle = graph.add_render_pass("forward", width, height);
            let pass = graph.pass_mut(handle);
            pass.add_render_target(color, color_load, wgpu::StoreOp::Store);
            let depth_load = if camera.clear_flags.contains(crate::scene::ClearFlags::DEPTH) {
                wgpu::LoadOp::Clear(camera.clear_depth)
            } else {
                wgpu::LoadOp::Load
            };
            pass.add_depth_stencil(depth, depth_load, wgpu::StoreOp::Store);
            handle
        };

        let pass = graph.pass_mut(handle);
        pass.set_viewport(camera_viewport(camera, width, height));

        if configs.forward.enable_main_light_shadow_map {
            pass.add_texture(
                crate::graph::ResourceKey::new(&format!("ShadowMap{id}")),
                "shadowMap",
            );
        }

        let main_light_id = scene.main_light.as_ref().map(|l| l.id);

        // Opaque and cutout geometry, lit by the main light.
        let opaque = pass.add_queue(QueueHint::Opaque, "default");
        match main_light_id {
            Some(light_id) => {
                opaque.add_scene_with_light(
                    camera,
                    SceneFlags::OPAQUE | SceneFlags::MASK | SceneFlags::DEFAULT_LIGHTING,
                    light_id,
                );
            }
            None => {
                opaque.add_scene(camera, SceneFlags::OPAQUE | SceneFlags::MASK);
            }
        }

        if configs.forward.enable_main_light_planar_shadow_map {
            if let Some(light_id) = main_light_id {
                pass.add_queue(QueueHint::Blend, "planar-shadow")
                    .add_scene_with_light(
                        camera,
                        SceneFlags::SHADOW_CASTER | SceneFlags::PLANAR_SHADOW | SceneFlags::BLEND,
                        light_id,
                    );
            }
        }

        handle
    }

    fn add_blend_queue(
        graph: &mut RenderGraph,
        handle: PassHandle,
        camera: &Camera,
        main_light_id: Option<u64>,
    ) {
        let queue = graph.pass_mut(handle).add_queue(QueueHint::Blend, "default");
        match main_light_id {
            Some(light_id) => {
                queue.add_scene_with_light(
                    camera,
                    SceneFlags::BLEND | SceneFlags::DEFAULT_LIGHTING,
                    light_id,
                );
            }
            None => {
                queue.add_scene(camera, SceneFlags::BLEND);
            }
        }
    }
}

fn camera_viewport(camera: &Camera, width: u32, height: u32) -> Viewport {
    let w = width as f32;
    let h = height as f32;
    Viewport {
        x: (camera.viewport.x * w).floor() as u32,
        y: (camera.viewport.y * h).floor() as u32,
        width: ((camera.viewport.z * w).floor() as u32).max(1),
        height: ((camera.viewport.w * h).floor() as u32).max(1),
    }
}

impl PipelinePassBuilder for ForwardPassBuilder {
    fn name(&self) -> &'static str {
        "forward"
    }

    fn config_order(&self) -> i32 {
        100
    }

    fn render_order(&self) -> i32 {
        100
    }

    fn config_camera(
        &mut self,
        camera: &Camera,
        scene: &RenderScene,
        pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
    ) {
        configs.remaining_passes += 1;

        let main_light_shadows = scene
            .main_light
            .as_ref()
            .is_some_and(|light| light.shadow_enabled);

        configs.forward.enable_main_light_shadow_map =
            pipeline.shadow_enabled && main_light_shadows && !scene.planar_shadows;
        configs.forward.enable_main_light_planar_shadow_map =
            pipeline.shadow_enabled && main_light_shadows && scene.planar_shadows;
        configs.forward.enable_planar_reflection_probe = matches!(
            camera.usage,
            CameraUsage::SceneView | CameraUsage::Preview | CameraUsage::Editor
        );
        // Per-light passes reload the color target, which multisampled
        // memoryless attachments cannot do.
        configs.forward.enable_single_forward_pass = pipeline.is_mobile || configs.enable_msaa;
    }

    fn window_resize(
        &mut self,
        graph: &mut RenderGraph,
        pipeline: &PipelineConfigs,
        configs: &CameraConfigs,
        _camera: &Camera,
    ) {
        let id = configs.window_id;
        let (shadow_w, shadow_h) = pipeline.shadow_map_size;
        graph.add_render_target(
            &format!("ShadowMap{id}"),
            pipeline.shadow_map_format,
            shadow_w,
            shadow_h,
        );
        graph.add_depth_stencil(
            &format!("ShadowDepth{id}"),
            wgpu::TextureFormat::Depth32Float,
            shadow_w,
            shadow_h,
        );
        if configs.enable_msaa {
            let samples = configs.settings.msaa.sample_count;
            graph.add_msaa_render_target(
                &format!("MsaaRadiance{id}"),
                configs.radiance_format,
                configs.width,
                configs.height,
                samples,
            );
            graph.add_msaa_depth_stencil(
                &format!("MsaaDepthStencil{id}"),
                wgpu::TextureFormat::Depth32Float,
                configs.width,
                configs.height,
                samples,
            );
        }
    }

    fn setup(
        &mut self,
        graph: &mut RenderGraph,
        pipeline: &PipelineConfigs,
        configs: &mut CameraConfigs,
        camera: &Camera,
        scene: &RenderScene,
        _prev: Option<PassHandle>,
    ) -> Option<PassHandle> {
        configs.remaining_passes -= 1;
        assert!(configs.remaining_passes >= 0, "forward pass scheduled twice");
        let last = configs.remaining_passes == 0;

        if configs.forward.enable_main_light_shadow_map {
            if let Some(light) = &scene.main_light {
                self.add_cascaded_shadow_map_pass(graph, pipeline, configs, camera, light);
            }
        }

        if configs.forward.enable_planar_reflection_probe {
            let editor = matches!(camera.usage, CameraUsage::SceneView | CameraUsage::Editor);
            self.add_reflection_probe_passes(graph, configs, scene, editor);
        }

        // The last writer lands in the window unless the scene renders at a
        // scaled resolution, in which case an upscaling blit follows.
        let color_name = if last && !configs.enable_shading_scale {
            configs.color_name.clone()
        } else {
            configs.radiance_name(0)
        };
        let depth_name = configs.scene_depth_name();

        self.lighting.cull_lights(scene, camera);
        let main_light_id = scene.main_light.as_ref().map(|l| l.id);

        let pass = if configs.forward.enable_single_forward_pass {
            let max = pipeline.max_spot_light_shadow_maps();
            self.lighting
                .add_spotlight_shadow_passes(graph, pipeline, camera, max);
            let handle = self.add_forward_scene_pass(
                graph, pipeline, configs, camera, scene, &color_name, &depth_name,
            );
            self.lighting.add_light_queues(graph, handle, camera, max);
            Self::add_blend_queue(graph, handle, camera, main_light_id);
            handle
        } else {
            let handle = self.add_forward_scene_pass(
                graph, pipeline, configs, camera, scene, &color_name, &depth_name,
            );
            let viewport = camera_viewport(camera, configs.width, configs.height);
            let handle = self.lighting.add_light_passes(
                graph,
                pipeline,
                camera,
                configs.window_id,
                configs.width,
                configs.height,
                viewport,
                &color_name,
                &depth_name,
                wgpu::StoreOp::Store,
                handle,
            );
            Self::add_blend_queue(graph, handle, camera, main_light_id);
            handle
        };

        if last && configs.enable_shading_scale {
            return Some(add_copy_to_screen_pass(graph, configs, camera, &color_name));
        }
        Some(pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csm_atlas_quadrants() {
        // Rows grow upward when sign y is positive.
        let vp0 = csm_main_light_viewport(false, 4, 0, 1024, 1024, 1.0);
        let vp1 = csm_main_light_viewport(false, 4, 1, 1024, 1024, 1.0);
        let vp2 = csm_main_light_viewport(false, 4, 2, 1024, 1024, 1.0);
        let vp3 = csm_main_light_viewport(false, 4, 3, 1024, 1024, 1.0);

        assert_eq!((vp0.x, vp0.y), (0, 512));
        assert_eq!((vp1.x, vp1.y), (512, 512));
        assert_eq!((vp2.x, vp2.y), (0, 0));
        assert_eq!((vp3.x, vp3.y), (512, 0));
        assert_eq!((vp0.width, vp0.height), (512, 512));
    }

    #[test]
    fn csm_fixed_area_uses_full_map() {
        let vp = csm_main_light_viewport(true, 4, 2, 1024, 1024, 1.0);
        assert_eq!((vp.x, vp.y, vp.width, vp.height), (0, 0, 1024, 1024));
    }

    #[test]
    fn csm_sign_y_flips_rows() {
        let vp = csm_main_light_viewport(false, 4, 0, 1024, 1024, -1.0);
        assert_eq!((vp.x, vp.y), (0, 0));
    }
}
