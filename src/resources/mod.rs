//! Render resources referenced by pipeline settings: post-process materials
//! and color-grading lookup textures. These are thin handles; the actual GPU
//! objects live with the renderer.

/// Material wrapping a post-process effect. Pass indices select the shader
/// pass within the effect (blit, prefilter, downsample, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub effect_name: String,
}

impl Material {
    #[must_use]
    pub fn new(effect_name: impl Into<String>) -> Self {
        Self {
            effect_name: effect_name.into(),
        }
    }
}

/// Color-grading lookup texture. An 8x8-tiled LUT is square
/// (width == height); strip LUTs are N slices of N wide laid out in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LutTexture {
    pub width: u32,
    pub height: u32,
}

impl LutTexture {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_square_map(&self) -> bool {
        self.width == self.height
    }
}
