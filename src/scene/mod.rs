//! Scene-side state the pipeline consumes: cameras, lights, reflection
//! probes, and the culling volumes used to trim light lists per camera.

pub mod bounds;
pub mod camera;
pub mod light;

pub use bounds::{Aabb, Sphere};
pub use camera::{Camera, CameraUsage, ClearFlags, Frustum, RenderWindow};
pub use light::{Light, LightKind};

use glam::Vec2;

/// Planar probes beyond this count are ignored for a frame.
pub const MAX_REFLECTION_PROBES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeType {
    Planar,
    Cube,
}

/// Reflection probe with its own capture camera. Cube probes bake six faces,
/// planar probes render a single mirrored view.
#[derive(Debug)]
pub struct ReflectionProbe {
    pub probe_type: ProbeType,
    /// Set while the probe awaits capture. The scene owner clears it after
    /// consuming the captured result; the pipeline only reads it.
    pub need_render: bool,
    pub render_area: Vec2,
    pub camera: Camera,
}

impl ReflectionProbe {
    #[must_use]
    pub fn face_count(&self) -> u32 {
        match self.probe_type {
            ProbeType::Planar => 1,
            ProbeType::Cube => 6,
        }
    }

    #[must_use]
    pub fn resolution(&self) -> (u32, u32) {
        let w = self.render_area.x.max(1.0) as u32;
        let h = self.render_area.y.max(1.0) as u32;
        (w, h)
    }
}

/// Per-frame scene snapshot handed to the pipeline. The main light is kept
/// separate from the additive light list, mirroring how forward lighting
/// treats them.
#[derive(Debug, Default)]
pub struct RenderScene {
    pub main_light: Option<Light>,
    pub lights: Vec<Light>,
    pub reflection_probes: Vec<ReflectionProbe>,
    /// Project the main light's shadows onto a ground plane instead of (or in
    /// addition to) the shadow map.
    pub planar_shadows: bool,
}

impl RenderScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn set_main_light(&mut self, light: Light) {
        self.main_light = Some(light);
    }
}
