#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod assets;
pub mod errors;
pub mod graph;
pub mod pipeline;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod utils;

pub use assets::bin_package::{pack, unpack};
pub use assets::skeleton_binary::DataInput;
pub use errors::{Result, SableError};
pub use graph::{PassHandle, QueueHint, RenderGraph, SceneFlags};
pub use pipeline::builder::PipelinePassBuilder;
pub use pipeline::config::{CameraConfigs, DeviceCaps, PipelineConfigs};
pub use pipeline::orchestrator::BuiltinPipeline;
pub use resources::{LutTexture, Material};
pub use scene::camera::{Camera, Frustum, RenderWindow};
pub use scene::light::{Light, LightKind};
pub use scene::RenderScene;
pub use settings::PipelineSettings;
pub use utils::interner;
