use glam::{Mat4, Vec3};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ShadowConfig {
    pub bias: f32,
    pub normal_bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.005,
            normal_bias: 0.02,
        }
    }
}

/// Cascade count for a directional light's shadow map, 1 to 4. Cascades
/// beyond the first are arranged in a 2x2 viewport atlas.
pub const MAX_CSM_LEVELS: u32 = 4;

#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub csm_level: u32,
    /// Fixed-area shadows render a single full-size map regardless of the
    /// cascade count.
    pub shadow_fixed_area: bool,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            csm_level: 1,
            shadow_fixed_area: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub range: f32,
}

#[derive(Debug, Clone)]
pub struct SphereLight {
    pub range: f32,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub range: f32,
    pub inner_cone: f32,
    pub outer_cone: f32,
}

/// A directional light restricted to a box volume; the unit box is
/// transformed by the light's world matrix.
#[derive(Debug, Clone)]
pub struct RangedDirectionalLight {
    pub world_matrix: Mat4,
}

// High-level abstraction: light component in the scene
#[derive(Debug, Clone)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
    Sphere(SphereLight),
    Spot(SpotLight),
    RangedDirectional(RangedDirectionalLight),
}

impl LightKind {
    /// Queue tag used for additive light queues, kept stable for downstream
    /// sorting and debugging.
    #[must_use]
    pub fn queue_name(&self) -> &'static str {
        match self {
            Self::Directional(_) => "directional-light",
            Self::Point(_) => "point-light",
            Self::Sphere(_) => "sphere-light",
            Self::Spot(_) => "spot-light",
            Self::RangedDirectional(_) => "ranged-directional-light",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub id: u64,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
    /// World-space position, resolved by the scene before rendering.
    pub position: Vec3,

    /// Baked lights contribute through lightmaps only and are skipped by
    /// runtime culling.
    pub baked: bool,
    pub shadow_enabled: bool,
    pub shadow: ShadowConfig,
}

impl Light {
    fn generate_id_from_uuid(uuid: &Uuid) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        uuid.hash(&mut hasher);
        hasher.finish()
    }

    #[must_use]
    pub fn new(color: Vec3, intensity: f32, kind: LightKind) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            uuid,
            id: Self::generate_id_from_uuid(&uuid),
            color,
            intensity,
            kind,
            position: Vec3::ZERO,
            baked: false,
            shadow_enabled: false,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self::new(color, intensity, LightKind::Directional(DirectionalLight::default()))
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self::new(color, intensity, LightKind::Point(PointLight { range }))
    }

    #[must_use]
    pub fn new_sphere(color: Vec3, intensity: f32, range: f32, size: f32) -> Self {
        Self::new(color, intensity, LightKind::Sphere(SphereLight { range, size }))
    }

    #[must_use]
    pub fn new_spot(color: Vec3, intensity: f32, range: f32, inner_cone: f32, outer_cone: f32) -> Self {
        Self::new(
            color,
            intensity,
            LightKind::Spot(SpotLight {
                range,
                inner_cone,
                outer_cone,
            }),
        )
    }

    #[must_use]
    pub fn new_ranged_directional(color: Vec3, intensity: f32, world_matrix: Mat4) -> Self {
        Self::new(
            color,
            intensity,
            LightKind::RangedDirectional(RangedDirectionalLight { world_matrix }),
        )
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_shadows(mut self) -> Self {
        self.shadow_enabled = true;
        self
    }

    #[must_use]
    pub fn baked(mut self) -> Self {
        self.baked = true;
        self
    }
}
