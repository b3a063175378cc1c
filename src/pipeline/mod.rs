//! Builtin Render Pipeline
//!
//! A forward pipeline assembled from independent pass builders: forward
//! scene rendering with cascaded and spot shadows, then a post-process
//! chain of bloom, tone mapping with color grading, FXAA, FSR upscaling,
//! and UI compositing. See [`BuiltinPipeline`] for the frame protocol.

pub mod builder;
pub mod config;
pub mod lighting;
pub mod orchestrator;
pub mod passes;

pub use builder::{
    add_copy_to_screen_pass, config_sorted_indices, ping_pong_render_target,
    render_sorted_indices, PipelinePassBuilder,
};
pub use config::{
    scaled_dimension, BloomPassConfigs, CameraConfigs, DeviceCaps, ForwardPassConfigs,
    FsrPassConfigs, FxaaPassConfigs, PipelineConfigs, ToneMappingPassConfigs,
};
pub use lighting::ForwardLighting;
pub use orchestrator::BuiltinPipeline;
