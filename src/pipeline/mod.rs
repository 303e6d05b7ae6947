//! # Photo Processing Pipeline
//!
//! Turns raw photo bytes into a finished layer for one placement: decode,
//! optional cutout, grading, fitting, filtering, framing, rotation, outline
//! and shadow.
//!
//! Every stage is fail-soft. A stage that cannot do its job returns a
//! recoverable [`StageError`](crate::error::StageError) and the photo moves on
//! unchanged; only decode failures and fatal stage errors drop a photo.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mood_collage::{config::PipelineConfig, pipeline::PhotoPipeline, template::Placement};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let pipeline = PhotoPipeline::new(PipelineConfig::default());
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let placement = Placement::new(0, 0, 800, 600);
//! let layer = pipeline
//!     .process(0, &bytes, &placement, &mut StdRng::seed_from_u64(1))
//!     .unwrap();
//! println!("layer is {}x{}", layer.image.width(), layer.image.height());
//! ```

pub mod ops;
pub mod processor;
pub mod segment;
pub mod stages;
pub mod traits;

pub use processor::{PhotoLayer, PhotoPipeline};
pub use segment::{BorderKeySegmenter, NoSegmenter, Segmenter};
pub use traits::{Stage, StageContext, StageResult};
