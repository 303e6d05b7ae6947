//! # Template Catalog
//!
//! Declarative collage layouts and the keyword classifier that picks one from a
//! free-text style label.
//!
//! ## Usage
//!
//! ```rust
//! use mood_collage::template;
//!
//! let template = template::select("Editorial fashion spread", 2);
//! assert_eq!(template.name, "Magazine");
//! assert_eq!(template.placements.len(), 2);
//! ```

pub mod catalog;
pub mod types;

pub use catalog::{classify, select, Layout};
pub use types::{
    Background, Decoration, DoodleShape, FilterKind, FrameStyle, Outline, Placement, Template,
};
