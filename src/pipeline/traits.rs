use image::RgbaImage;
use rand::rngs::StdRng;

use crate::{config::PipelineConfig, error::StageError, template::Placement};

/// Outcome of one stage: the transformed image, or why the pre-stage image
/// should be kept (recoverable) or the photo dropped (fatal).
pub type StageResult = std::result::Result<RgbaImage, StageError>;

/// Everything a stage may consult while processing one photo
pub struct StageContext<'a> {
    /// The slot this photo is being prepared for
    pub placement: &'a Placement,

    /// Numeric constants for grading, framing and shadows
    pub config: &'a PipelineConfig,

    /// Per-photo random source for jittered effects
    pub rng: &'a mut StdRng,

    /// Set once the cutout stage produced a transparent-background image
    pub is_cutout: bool,

    /// How far padding stages pushed the photo's top-left corner into the layer
    pub origin_shift: (i32, i32),
}

/// One step of the per-photo effect chain
///
/// Stages never mutate their input. Returning an error keeps the photo in the
/// previous state, so a stage may fail without affecting the stages after it.
pub trait Stage: Send + Sync {
    /// Unique name; used to replace stages in a pipeline
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Whether this stage runs for the given photo at all
    fn applies_to(&self, context: &StageContext<'_>) -> bool {
        let _ = context;
        true
    }

    /// Transform the image
    ///
    /// # Arguments
    ///
    /// * `image` - The image as left by the previous stage
    /// * `context` - Placement, constants and random source for this photo
    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult;
}
