//! Resource registry for the render graph.
//!
//! Targets are declared by name before any pass may attach or sample them.
//! Redeclaring a name is allowed and updates its dimensions, which is how
//! per-frame resize works: the pipeline re-declares every target at the start
//! of the frame with the current window size.

use rustc_hash::FxHashMap;

use crate::utils::interner::{self, Symbol};

/// Interned name of a graph resource.
///
/// Keys are cheap to copy, compare, and hash; the readable name is recovered
/// with [`ResourceKey::name`] for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKey(Symbol);

impl ResourceKey {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(interner::intern(name))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        interner::resolve(self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Swapchain-backed output of a camera's window.
    RenderWindow,
    /// Offscreen color target.
    RenderTarget,
    DepthStencil,
    /// Multisampled color, resolved into a single-sample target.
    MsaaColor,
    MsaaDepthStencil,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceDesc {
    pub kind: ResourceKind,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
}

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: FxHashMap<ResourceKey, ResourceDesc>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares or re-declares a resource. Re-declaring with new dimensions
    /// replaces the old descriptor under the same key.
    pub fn declare(&mut self, key: ResourceKey, desc: ResourceDesc) {
        self.resources.insert(key, desc);
    }

    #[must_use]
    pub fn get(&self, key: ResourceKey) -> Option<&ResourceDesc> {
        self.resources.get(&key)
    }

    #[must_use]
    pub fn contains(&self, key: ResourceKey) -> bool {
        self.resources.contains_key(&key)
    }

    /// Descriptor lookup for a key a pass is about to use.
    ///
    /// # Panics
    /// Panics when the key was never declared. Attachments and sampled inputs
    /// referencing unknown targets are authoring bugs, not runtime conditions.
    #[must_use]
    pub fn expect(&self, key: ResourceKey) -> &ResourceDesc {
        self.resources
            .get(&key)
            .unwrap_or_else(|| panic!("render graph resource not declared: {}", key.name()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
