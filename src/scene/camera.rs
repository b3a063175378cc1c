use glam::{Affine3A, Mat4, Vec3, Vec4};
use std::borrow::Cow;
use uuid::Uuid;

use crate::scene::bounds::{Aabb, Sphere};
use crate::settings::PipelineSettings;

bitflags::bitflags! {
    /// What a camera clears before rendering.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
        const ALL = Self::COLOR.bits() | Self::DEPTH_STENCIL.bits();
    }
}

/// What a camera is used for. Editor-facing usages get preview settings and
/// planar reflection probes; only game-facing usages get the profiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraUsage {
    Game,
    GameView,
    SceneView,
    Preview,
    Editor,
}

/// The output window a camera renders into.
///
/// Color/depth-stencil attachment names are the string keys the declarative
/// render graph resolves; each window carries its own id so per-window
/// resources (ping-pong buffers, shadow maps) never collide.
#[derive(Debug, Clone)]
pub struct RenderWindow {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub color_name: String,
    pub depth_stencil_name: String,
    /// Windows backed by a swapchain host the main game view.
    pub has_swapchain: bool,
}

impl RenderWindow {
    #[must_use]
    pub fn new(id: u32, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            color_name: format!("Color{id}"),
            depth_stencil_name: format!("DepthStencil{id}"),
            has_swapchain: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,

    // === Projection ===
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    // === Output ===
    pub window: RenderWindow,
    pub usage: CameraUsage,
    /// Normalized viewport rect (x, y, width, height).
    pub viewport: Vec4,
    pub clear_flags: ClearFlags,
    pub clear_color: wgpu::Color,
    pub clear_depth: f32,
    pub clear_stencil: u32,
    /// Whether this camera renders the full pipeline (scene layers) or only
    /// the simple path (UI / gizmo overlays).
    pub full_pipeline: bool,
    /// Per-camera settings override. `None` falls back to the pipeline's
    /// default settings.
    pub pipeline_settings: Option<PipelineSettings>,

    // Cached matrices, renderer read-only
    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
    pub(crate) frustum: Frustum,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32, window: RenderWindow) -> Self {
        let mut cam = Self {
            uuid: Uuid::new_v4(),
            name: Cow::Borrowed("Camera"),
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            window,
            usage: CameraUsage::Game,
            viewport: Vec4::new(0.0, 0.0, 1.0, 1.0),
            clear_flags: ClearFlags::ALL,
            clear_color: wgpu::Color::BLACK,
            clear_depth: 1.0,
            clear_stencil: 0,
            full_pipeline: true,
            pipeline_settings: None,

            world_matrix: Affine3A::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };
        cam.update_projection_matrix();
        cam
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    pub fn update_view_projection(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;
        self.view_matrix = Mat4::from(*world_transform).inverse();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    /// World-space camera position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Whether the color buffer needs clearing before the forward pass.
    #[must_use]
    pub fn needs_clear_color(&self) -> bool {
        self.clear_flags.contains(ClearFlags::COLOR)
    }
}

/// A view frustum as six planes, extracted with the Gribb-Hartmann method.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        // Extraction: https://www.gamedevs.org/uploads/fast-extraction-viewing-frustum-planes-from-world-view-projection-matrix.pdf
        planes[0] = rows[3] + rows[0]; // Left
        planes[1] = rows[3] - rows[0]; // Right
        planes[2] = rows[3] + rows[1]; // Bottom
        planes[3] = rows[3] - rows[1]; // Top
        // NDC depth range is [0, 1].
        planes[4] = rows[2]; // Near
        planes[5] = rows[3] - rows[2]; // Far

        for plane in &mut planes {
            let length = Vec3::new(plane.x, plane.y, plane.z).length();
            *plane /= length;
        }

        Self { planes }
    }

    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        for plane in &self.planes {
            let dist = plane.x * sphere.center.x
                + plane.y * sphere.center.y
                + plane.z * sphere.center.z
                + plane.w;
            if dist < -sphere.radius {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let normal = Vec3::new(plane.x, plane.y, plane.z);
            // Projection radius of the box onto the plane normal.
            let r = aabb.half_extents.dot(normal.abs());
            let dist = normal.dot(aabb.center) + plane.w;
            if dist < -r {
                return false;
            }
        }
        true
    }
}
