//! Light Culling & Shadow Scheduling Tests
//!
//! Tests for:
//! - Frustum culling of punctual lights (sphere and transformed-box tests)
//! - Baked lights being ignored at runtime
//! - Shadowed spot lights: mutual exclusivity with the additive list,
//!   nearest-first ordering, and per-tier shadow map budgets
//! - Cascaded shadow map pass recording
//! - Additive queue tagging and spot shadow map sampling
//! - Reflection probe capture budgeting

use glam::{Affine3A, Mat4, Vec2, Vec3};

use sable::graph::Viewport;
use sable::pipeline::{BuiltinPipeline, DeviceCaps, ForwardLighting, PipelineConfigs};
use sable::scene::{CameraUsage, LightKind, ProbeType, ReflectionProbe};
use sable::settings::PipelineSettings;
use sable::{Camera, Light, RenderGraph, RenderScene, RenderWindow};

/// Camera at the origin looking down -Z.
fn test_camera() -> Camera {
    Camera::new_perspective(60.0, 1.0, 0.1, 1000.0, RenderWindow::new(3, 800, 600))
}

fn point_at(position: Vec3, range: f32) -> Light {
    Light::new_point(Vec3::ONE, 1000.0, range).with_position(position)
}

fn spot_at(position: Vec3) -> Light {
    Light::new_spot(Vec3::ONE, 1000.0, 10.0, 0.4, 0.7).with_position(position)
}

// ============================================================================
// Frustum culling
// ============================================================================

#[test]
fn lights_behind_the_camera_are_culled() {
    let camera = test_camera();
    let mut scene = RenderScene::new();
    scene.add_light(point_at(Vec3::new(0.0, 0.0, -20.0), 2.0));
    scene.add_light(point_at(Vec3::new(0.0, 0.0, 50.0), 2.0));

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);

    assert_eq!(lighting.visible_lights().len(), 1);
    assert!(lighting.shadowed_spot_lights().is_empty());
}

#[test]
fn light_range_extends_visibility() {
    let camera = test_camera();
    let mut scene = RenderScene::new();
    // Center far off to the side but the radius reaches into the frustum.
    scene.add_light(point_at(Vec3::new(200.0, 0.0, -10.0), 1.0));
    scene.add_light(point_at(Vec3::new(200.0, 0.0, -10.0), 500.0));

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);
    assert_eq!(lighting.visible_lights().len(), 1);
}

#[test]
fn ranged_directional_uses_its_transformed_box() {
    let camera = test_camera();
    let inside = Mat4::from_scale_rotation_translation(
        Vec3::splat(4.0),
        glam::Quat::IDENTITY,
        Vec3::new(0.0, 0.0, -10.0),
    );
    let outside = Mat4::from_translation(Vec3::new(500.0, 0.0, -10.0));

    let mut scene = RenderScene::new();
    scene.add_light(Light::new_ranged_directional(Vec3::ONE, 1.0, inside));
    scene.add_light(Light::new_ranged_directional(Vec3::ONE, 1.0, outside));

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);
    assert_eq!(lighting.visible_lights().len(), 1);
}

#[test]
fn baked_lights_are_skipped() {
    let camera = test_camera();
    let mut scene = RenderScene::new();
    scene.add_light(point_at(Vec3::new(0.0, 0.0, -5.0), 3.0).baked());

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);
    assert!(lighting.visible_lights().is_empty());
}

#[test]
fn directional_lights_never_join_the_additive_list() {
    let camera = test_camera();
    let mut scene = RenderScene::new();
    scene.add_light(Light::new_directional(Vec3::ONE, 10.0));

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);
    assert!(lighting.visible_lights().is_empty());
}

// ============================================================================
// Shadowed spot lights
// ============================================================================

#[test]
fn shadowed_spots_leave_the_additive_list() {
    let camera = test_camera();
    let mut scene = RenderScene::new();
    scene.add_light(spot_at(Vec3::new(0.0, 0.0, -5.0)));
    scene.add_light(spot_at(Vec3::new(1.0, 0.0, -5.0)).with_shadows());

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);

    assert_eq!(lighting.visible_lights().len(), 1);
    assert_eq!(lighting.shadowed_spot_lights().len(), 1);
    assert_ne!(
        lighting.visible_lights()[0].id,
        lighting.shadowed_spot_lights()[0].id
    );
}

#[test]
fn shadowed_spots_sort_nearest_first() {
    let camera = test_camera();
    let mut scene = RenderScene::new();
    for z in [-10.0, -1.0, -5.0] {
        scene.add_light(spot_at(Vec3::new(0.0, 0.0, z)).with_shadows());
    }

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);

    let distances: Vec<f32> = lighting
        .shadowed_spot_lights()
        .iter()
        .map(|l| l.position.length())
        .collect();
    assert_eq!(distances, vec![1.0, 5.0, 10.0]);
}

#[test]
fn culling_is_idempotent_per_frame() {
    let camera = test_camera();
    let mut scene = RenderScene::new();
    scene.add_light(point_at(Vec3::new(0.0, 0.0, -5.0), 3.0));

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);
    lighting.cull_lights(&scene, &camera);
    assert_eq!(lighting.visible_lights().len(), 1);
}

// ============================================================================
// Shadow pass recording
// ============================================================================

fn record_frame(caps: &DeviceCaps, scene: &RenderScene) -> RenderGraph {
    let camera = test_camera();
    let mut pipeline = BuiltinPipeline::new(caps, PipelineSettings::default());
    let mut graph = RenderGraph::new();
    pipeline.window_resize(&mut graph, &camera, scene);
    pipeline.setup_camera(&mut graph, &camera, scene);
    graph
}

#[test]
fn main_light_records_one_queue_per_cascade() {
    let mut scene = RenderScene::new();
    let mut light = Light::new_directional(Vec3::ONE, 10.0).with_shadows();
    if let LightKind::Directional(d) = &mut light.kind {
        d.csm_level = 4;
    }
    scene.set_main_light(light);

    let graph = record_frame(&DeviceCaps::default(), &scene);
    let csm = graph
        .passes()
        .iter()
        .find(|p| p.name == "cascaded-shadow-map")
        .expect("main light shadow pass recorded");
    assert_eq!(csm.queues.len(), 4);
    // Each cascade gets its own atlas quadrant.
    let viewports: Vec<_> = csm.queues.iter().map(|q| q.viewport.unwrap()).collect();
    assert!(viewports.iter().all(|v| v.width == 512 && v.height == 512));
}

#[test]
fn fixed_area_shadow_uses_a_single_full_queue() {
    let mut scene = RenderScene::new();
    let mut light = Light::new_directional(Vec3::ONE, 10.0).with_shadows();
    if let LightKind::Directional(d) = &mut light.kind {
        d.csm_level = 4;
        d.shadow_fixed_area = true;
    }
    scene.set_main_light(light);

    let graph = record_frame(&DeviceCaps::default(), &scene);
    let csm = graph
        .passes()
        .iter()
        .find(|p| p.name == "cascaded-shadow-map")
        .unwrap();
    assert_eq!(csm.queues.len(), 1);
    let viewport = csm.queues[0].viewport.unwrap();
    assert_eq!((viewport.width, viewport.height), (1024, 1024));
}

#[test]
fn mobile_caps_spot_shadow_maps_at_one() {
    let caps = DeviceCaps {
        is_mobile: true,
        ..DeviceCaps::default()
    };
    let mut scene = RenderScene::new();
    for z in [-2.0, -4.0, -6.0] {
        scene.add_light(spot_at(Vec3::new(0.0, 0.0, z)).with_shadows());
    }

    let graph = record_frame(&caps, &scene);
    let shadow_passes = graph
        .passes()
        .iter()
        .filter(|p| p.name == "spotlight-shadow")
        .count();
    assert_eq!(shadow_passes, 1);
}

#[test]
fn desktop_records_one_lighting_pass_per_shadowed_spot() {
    let mut scene = RenderScene::new();
    scene.add_light(spot_at(Vec3::new(0.0, 0.0, -2.0)).with_shadows());
    scene.add_light(spot_at(Vec3::new(0.0, 0.0, -4.0)).with_shadows());

    let graph = record_frame(&DeviceCaps::default(), &scene);
    let light_passes = graph
        .passes()
        .iter()
        .filter(|p| p.name == "spotlight-with-shadow-map")
        .count();
    assert_eq!(light_passes, 2);
}

#[test]
fn single_pass_mode_samples_the_spot_shadow_map() {
    let caps = DeviceCaps {
        is_mobile: true,
        ..DeviceCaps::default()
    };
    let mut scene = RenderScene::new();
    scene.add_light(spot_at(Vec3::new(0.0, 0.0, -3.0)).with_shadows());

    let graph = record_frame(&caps, &scene);
    // The shadow map rendered up front must feed back into the scene pass.
    let sampled = graph.passes().iter().any(|p| {
        p.inputs
            .iter()
            .any(|(key, binding)| key.name() == "SpotShadowMap0" && binding == "spotShadowMap")
    });
    assert!(sampled);
}

#[test]
fn additive_queues_are_tagged_by_light_type() {
    let mut scene = RenderScene::new();
    scene.add_light(point_at(Vec3::new(0.0, 0.0, -5.0), 3.0));
    scene.add_light(spot_at(Vec3::new(0.0, 0.0, -4.0)).with_shadows());

    let graph = record_frame(&DeviceCaps::default(), &scene);
    let forward = graph.passes().iter().find(|p| p.name == "forward").unwrap();
    assert!(forward.queues.iter().any(|q| q.phase == "point-light"));
    let spot = graph
        .passes()
        .iter()
        .find(|p| p.name == "spotlight-with-shadow-map")
        .unwrap();
    assert!(spot.queues.iter().any(|q| q.phase == "spot-light"));
}

#[test]
fn final_spotlight_pass_honors_the_depth_store_op() {
    let camera = test_camera();
    let mut scene = RenderScene::new();
    scene.add_light(spot_at(Vec3::new(0.0, 0.0, -2.0)).with_shadows());
    scene.add_light(spot_at(Vec3::new(0.0, 0.0, -4.0)).with_shadows());

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);
    assert_eq!(lighting.shadowed_spot_lights().len(), 2);

    let pipeline = PipelineConfigs::new(&DeviceCaps::default());
    let mut graph = RenderGraph::new();
    graph.add_render_target("SceneColor", wgpu::TextureFormat::Rgba16Float, 800, 600);
    graph.add_depth_stencil("SceneDepth", wgpu::TextureFormat::Depth32Float, 800, 600);
    let base = graph.add_render_pass("forward", 800, 600);
    let viewport = Viewport {
        x: 0,
        y: 0,
        width: 800,
        height: 600,
    };
    let _ = lighting.add_light_passes(
        &mut graph,
        &pipeline,
        &camera,
        0,
        800,
        600,
        viewport,
        "SceneColor",
        "SceneDepth",
        wgpu::StoreOp::Discard,
        base,
    );

    // Intermediates keep depth alive; only the last pass applies the
    // caller's store op.
    let stores: Vec<_> = graph
        .passes()
        .iter()
        .filter(|p| p.name == "spotlight-with-shadow-map")
        .map(|p| p.depth_stencil.as_ref().unwrap().depth_store)
        .collect();
    assert_eq!(stores, vec![wgpu::StoreOp::Store, wgpu::StoreOp::Discard]);
}

// ============================================================================
// Reflection probe budgeting
// ============================================================================

fn planar_probe(window_id: u32, need_render: bool) -> ReflectionProbe {
    ReflectionProbe {
        probe_type: ProbeType::Planar,
        need_render,
        render_area: Vec2::new(128.0, 128.0),
        camera: Camera::new_perspective(90.0, 1.0, 0.1, 100.0, RenderWindow::new(window_id, 128, 128)),
    }
}

fn record_scene_view_frame(scene: &RenderScene) -> RenderGraph {
    let mut camera = test_camera();
    camera.usage = CameraUsage::SceneView;
    let mut pipeline = BuiltinPipeline::new(&DeviceCaps::default(), PipelineSettings::default());
    let mut graph = RenderGraph::new();
    pipeline.window_resize(&mut graph, &camera, scene);
    pipeline.setup_camera(&mut graph, &camera, scene);
    graph
}

#[test]
fn stale_probes_do_not_consume_the_capture_budget() {
    let mut scene = RenderScene::new();
    // Already-captured probes ahead of the one that still needs a render.
    for id in 0..4 {
        scene.reflection_probes.push(planar_probe(10 + id, false));
    }
    scene.reflection_probes.push(planar_probe(20, true));

    let graph = record_scene_view_frame(&scene);
    let captures = graph
        .passes()
        .iter()
        .filter(|p| p.name == "reflection-probe")
        .count();
    assert_eq!(captures, 1);
}

#[test]
fn probe_captures_cap_at_four_per_frame() {
    let mut scene = RenderScene::new();
    for id in 0..6 {
        scene.reflection_probes.push(planar_probe(30 + id, true));
    }

    let graph = record_scene_view_frame(&scene);
    let captures = graph
        .passes()
        .iter()
        .filter(|p| p.name == "reflection-probe")
        .count();
    assert_eq!(captures, 4);
}

// ============================================================================
// Camera transforms feeding the cull
// ============================================================================

#[test]
fn moving_the_camera_moves_the_frustum() {
    let mut camera = test_camera();
    let mut scene = RenderScene::new();
    scene.add_light(point_at(Vec3::new(0.0, 0.0, 100.0), 2.0));

    let mut lighting = ForwardLighting::default();
    lighting.cull_lights(&scene, &camera);
    assert!(lighting.visible_lights().is_empty());

    // Turn the camera around; the light is now in front of it.
    camera.update_view_projection(&Affine3A::from_rotation_y(std::f32::consts::PI));
    lighting.cull_lights(&scene, &camera);
    assert_eq!(lighting.visible_lights().len(), 1);
}
