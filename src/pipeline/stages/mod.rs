//! # Built-in Pipeline Stages
//!
//! Stages run in declaration order. Each one decides for itself whether it
//! applies to the current placement.
//!
//! 1. **cutout** - background removal through the injected segmenter
//! 2. **grade** - adaptive contrast, sharpening and a saturation lift
//! 3. **resize** - aspect-preserving fit into the placement box
//! 4. **filter** - the placement's color filter
//! 5. **frame** - polaroid or plain border
//! 6. **rotate** - explicit or jittered tilt
//! 7. **outline** - sticker outline around the silhouette
//! 8. **shadow** - soft drop shadow

pub mod cutout;
pub mod filter;
pub mod frame;
pub mod grade;
pub mod outline;
pub mod resize;
pub mod rotate;
pub mod shadow;

pub use cutout::CutoutStage;
pub use filter::{apply_filter, FilterStage};
pub use frame::{add_border, add_polaroid_frame, FrameStage};
pub use grade::GradeStage;
pub use outline::{add_outline, OutlineStage};
pub use resize::{fit_dimensions, resize_to_fit, ResizeStage};
pub use rotate::RotateStage;
pub use shadow::{add_shadow, shadow_padding, ShadowStage};

// Stage names, used to replace stages in a pipeline
pub const CUTOUT: &str = "cutout";
pub const GRADE: &str = "grade";
pub const RESIZE: &str = "resize";
pub const FILTER: &str = "filter";
pub const FRAME: &str = "frame";
pub const ROTATE: &str = "rotate";
pub const OUTLINE: &str = "outline";
pub const SHADOW: &str = "shadow";
