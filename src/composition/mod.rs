//! # Composition Engine
//!
//! The composition engine coordinates template selection, per-photo processing
//! and decoration rendering to produce the final collage.

pub mod analysis;
pub mod canvas;
pub mod engine;

// Re-exports for convenience
pub use analysis::StyleAnalysis;
pub use engine::{stack_layers, Composition, CompositionEngine, LayerInfo};
