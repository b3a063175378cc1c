//! Builtin pass builders, one per pipeline stage.

pub mod bloom;
pub mod forward;
pub mod fsr;
pub mod fxaa;
pub mod tone_mapping;
pub mod ui;

pub use bloom::BloomPassBuilder;
pub use forward::{csm_main_light_viewport, ForwardPassBuilder};
pub use fsr::FsrPassBuilder;
pub use fxaa::FxaaPassBuilder;
pub use tone_mapping::ToneMappingPassBuilder;
pub use ui::UiPassBuilder;
