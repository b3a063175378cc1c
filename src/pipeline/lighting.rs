//! Forward-plus-additive light scheduling.
//!
//! Culls the scene's punctual lights against the camera frustum each frame
//! and records them either as additive queues inside the main forward pass
//! (single-pass mode) or as one shadow-map-plus-lighting pass pair per
//! shadowed spot light (multi-pass mode).

use log::trace;

use crate::graph::{PassHandle, QueueHint, RenderGraph, SceneFlags, Viewport};
use crate::scene::{Aabb, Camera, Light, LightKind, RenderScene, Sphere};

use super::config::PipelineConfigs;

#[derive(Debug, Default)]
pub struct ForwardLighting {
    /// Additive lights visible this frame, shadowless.
    lights: Vec<Light>,
    /// Spot lights that need a shadow map, nearest first.
    shadow_enabled_spot_lights: Vec<Light>,
}

impl ForwardLighting {
    /// Rebuilds both light lists for a camera. A spot light lands in exactly
    /// one list depending on its shadow flag.
    pub fn cull_lights(&mut self, scene: &RenderScene, camera: &Camera) {
        self.lights.clear();
        self.shadow_enabled_spot_lights.clear();

        let frustum = camera.frustum();
        let mut sphere = Sphere::default();

        for light in &scene.lights {
            if light.baked {
                continue;
            }
            match &light.kind {
                LightKind::Point(point) => {
                    sphere.set(light.position, point.range);
                    if frustum.intersects_sphere(&sphere) {
                        self.lights.push(light.clone());
                    }
                }
                LightKind::Sphere(sphere_light) => {
                    sphere.set(light.position, sphere_light.range);
                    if frustum.intersects_sphere(&sphere) {
                        self.lights.push(light.clone());
                    }
                }
                LightKind::Spot(spot) => {
                    sphere.set(light.position, spot.range);
                    if frustum.intersects_sphere(&sphere) {
                        if light.shadow_enabled {
                            self.shadow_enabled_spot_lights.push(light.clone());
                        } else {
                            self.lights.push(light.clone());
                        }
                    }
                }
                LightKind::RangedDirectional(ranged) => {
                    let mut aabb = Aabb::default();
                    aabb.transform_from(&Aabb::unit(), &ranged.world_matrix);
                    if frustum.intersects_aabb(&aabb) {
                        self.lights.push(light.clone());
                    }
                }
                // The main directional light is scheduled separately.
                LightKind::Directional(_) => {}
            }
        }

        let camera_pos = camera.position();
        self.shadow_enabled_spot_lights.sort_by(|a, b| {
            let da = a.position.distance_squared(camera_pos);
            let db = b.position.distance_squared(camera_pos);
            da.total_cmp(&db)
        });

        trace!(
            "culled lights: {} additive, {} shadowed spots",
            self.lights.len(),
            self.shadow_enabled_spot_lights.len()
        );
    }

    #[must_use]
    pub fn visible_lights(&self) -> &[Light] {
        &self.lights
    }

    #[must_use]
    pub fn shadowed_spot_lights(&self) -> &[Light] {
        &self.shadow_enabled_spot_lights
    }

    /// Shadowed spots force one lighting pass per light; everything else fits
    /// in the main pass.
    #[must_use]
    pub fn is_multiple_light_passes_needed(&self) -> bool {
        !self.shadow_enabled_spot_lights.is_empty()
    }

    /// Single-pass mode: one additive blend queue per visible light inside
    /// the main forward pass, tagged by light type. Shadowed spots sample the
    /// map rendered up front for their index.
    pub fn add_light_queues(
        &self,
        graph: &mut RenderGraph,
        pass: PassHandle,
        camera: &Camera,
        max_shadowed_spots: usize,
    ) {
        let pass = graph.pass_mut(pass);
        for light in &self.lights {
            pass.add_queue(QueueHint::Blend, light.kind.queue_name())
                .add_scene_with_light(camera, SceneFlags::BLEND, light.id);
        }
        for (index, light) in self
            .shadow_enabled_spot_lights
            .iter()
            .take(max_shadowed_spots)
            .enumerate()
        {
            pass.add_texture(
                crate::graph::ResourceKey::new(&format!("SpotShadowMap{index}")),
                "spotShadowMap",
            );
            pass.add_queue(QueueHint::Blend, light.kind.queue_name())
                .add_scene_with_light(camera, SceneFlags::BLEND, light.id);
        }
    }

    /// Single-pass mode: renders shadow maps for the nearest shadowed spots
    /// up front, one pass per map. Spots beyond the budget are dropped.
    pub fn add_spotlight_shadow_passes(
        &self,
        graph: &mut RenderGraph,
        pipeline: &PipelineConfigs,
        camera: &Camera,
        max_shadow_maps: usize,
    ) {
        let (shadow_w, shadow_h) = pipeline.shadow_map_size;
        for (index, light) in self
            .shadow_enabled_spot_lights
            .iter()
            .take(max_shadow_maps)
            .enumerate()
        {
            let map = graph.add_render_target(
                &format!("SpotShadowMap{index}"),
                pipeline.shadow_map_format,
                shadow_w,
                shadow_h,
            );
            let depth = graph.add_depth_stencil(
                &format!("SpotShadowDepth{index}"),
                wgpu::TextureFormat::Depth32Float,
                shadow_w,
                shadow_h,
            );

            let handle = graph.add_render_pass("spotlight-shadow", shadow_w, shadow_h);
            let pass = graph.pass_mut(handle);
            pass.add_render_target(
                map,
                wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                wgpu::StoreOp::Store,
            );
            pass.add_depth_stencil(
                depth,
                wgpu::LoadOp::Clear(1.0),
                wgpu::StoreOp::Discard,
            );
            pass.add_queue(QueueHint::None, "shadow-caster").add_scene_with_light(
                camera,
                SceneFlags::OPAQUE | SceneFlags::MASK | SceneFlags::SHADOW_CASTER,
                light.id,
            );
        }
    }

    /// Multi-pass mode: for each shadowed spot, a shadow map pass followed by
    /// an additive lighting pass over the scene color. The shadowless lights
    /// ride in the first lighting pass. Intermediate lighting passes keep the
    /// scene depth alive; the final one applies the caller's store op.
    /// Returns the last lighting pass.
    #[allow(clippy::too_many_arguments)]
    pub fn add_light_passes(
        &self,
        graph: &mut RenderGraph,
        pipeline: &PipelineConfigs,
        camera: &Camera,
        id: u32,
        width: u32,
        height: u32,
        viewport: Viewport,
        color: &str,
        depth_stencil: &str,
        depth_store: wgpu::StoreOp,
        mut last: PassHandle,
    ) -> PassHandle {
        let color_key = crate::graph::ResourceKey::new(color);
        let depth_key = crate::graph::ResourceKey::new(depth_stencil);

        if !self.lights.is_empty() {
            let pass = graph.pass_mut(last);
            for light in &self.lights {
                pass.add_queue(QueueHint::Blend, light.kind.queue_name())
                    .add_scene_with_light(camera, SceneFlags::BLEND, light.id);
            }
        }

        let (shadow_w, shadow_h) = pipeline.shadow_map_size;
        let max = pipeline.max_spot_light_shadow_maps();
        let spot_count = self.shadow_enabled_spot_lights.len().min(max);

        for (index, light) in self.shadow_enabled_spot_lights.iter().take(max).enumerate() {
            let map = graph.add_render_target(
                &format!("ShadowMap{id}"),
                pipeline.shadow_map_format,
                shadow_w,
                shadow_h,
            );
            let shadow_depth = graph.add_depth_stencil(
                &format!("ShadowDepth{id}"),
                wgpu::TextureFormat::Depth32Float,
                shadow_w,
                shadow_h,
            );

            let shadow_pass = graph.add_render_pass("spotlight-shadow", shadow_w, shadow_h);
            {
                let pass = graph.pass_mut(shadow_pass);
                pass.add_render_target(
                    map,
                    wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    wgpu::StoreOp::Store,
                );
                pass.add_depth_stencil(
                    shadow_depth,
                    wgpu::LoadOp::Clear(1.0),
                    wgpu::StoreOp::Discard,
                );
                pass.add_queue(QueueHint::None, "shadow-caster").add_scene_with_light(
                    camera,
                    SceneFlags::OPAQUE | SceneFlags::MASK | SceneFlags::SHADOW_CASTER,
                    light.id,
                );
            }

            let light_pass = graph.add_render_pass("spotlight-with-shadow-map", width, height);
            {
                let store = if index + 1 == spot_count {
                    depth_store
                } else {
                    wgpu::StoreOp::Store
                };
                let pass = graph.pass_mut(light_pass);
                pass.set_viewport(viewport);
                pass.add_render_target(color_key, wgpu::LoadOp::Load, wgpu::StoreOp::Store);
                pass.add_depth_stencil(depth_key, wgpu::LoadOp::Load, store);
                pass.add_texture(map, "spotShadowMap");
                pass.add_queue(QueueHint::Blend, light.kind.queue_name())
                    .add_scene_with_light(camera, SceneFlags::BLEND, light.id);
            }
            last = light_pass;
        }

        last
    }
}
