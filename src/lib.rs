//! # Mood-Collage
//!
//! Template-driven photo collage composition: pick a layout from a style label,
//! run each photo through a fail-soft effect pipeline and composite the results
//! with procedural decorations into one PNG.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mood_collage::{composition::CompositionEngine, config::Config};
//!
//! # fn main() -> mood_collage::Result<()> {
//! let photos = vec![std::fs::read("beach.jpg")?, std::fs::read("sunset.jpg")?];
//!
//! let engine = CompositionEngine::new(Config::default());
//! let png = engine.create_collage(&photos, "retro film", &["#E67E22", "#2D3436"], "Nostalgia")?;
//! std::fs::write("collage.png", png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`template`] - Layout catalog and style classifier
//! - [`pipeline`] - Per-photo effect stages
//! - [`composition`] - Canvas assembly and encoding
//! - [`decoration`] - Doodles, text, tape and swatches
//! - [`config`] - Configuration management
//!
//! ## Custom Stages
//!
//! Any stage can be swapped for your own by implementing [`Stage`](pipeline::Stage)
//! under the same name:
//!
//! ```rust
//! use image::RgbaImage;
//! use mood_collage::pipeline::{Stage, StageContext, StageResult};
//!
//! struct NoFilter;
//!
//! impl Stage for NoFilter {
//!     fn name(&self) -> &str {
//!         "filter"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Leaves colors alone"
//!     }
//!
//!     fn apply(&self, image: &RgbaImage, _context: &mut StageContext<'_>) -> StageResult {
//!         Ok(image.clone())
//!     }
//! }
//! ```

pub mod color;
pub mod composition;
pub mod config;
pub mod decoration;
pub mod error;
pub mod pipeline;
pub mod template;

// Re-export commonly used types for convenience
pub use crate::{
    color::Color,
    composition::{Composition, CompositionEngine, StyleAnalysis},
    config::Config,
    error::{CollageError, Result},
    pipeline::{PhotoPipeline, Segmenter, Stage},
    template::{Layout, Template},
};
