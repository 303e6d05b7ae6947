use image::RgbaImage;

use crate::pipeline::{
    ops,
    traits::{Stage, StageContext, StageResult},
};

use super::GRADE;

/// Local-contrast tone grade: CLAHE on luma, then sharpening and a slight
/// saturation lift. Cutouts skip it; grading would reintroduce fringe color
/// around the silhouette.
#[derive(Debug, Default, Clone, Copy)]
pub struct GradeStage;

impl GradeStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for GradeStage {
    fn name(&self) -> &str {
        GRADE
    }

    fn description(&self) -> &str {
        "Adaptive contrast with sharpening and saturation"
    }

    fn applies_to(&self, context: &StageContext<'_>) -> bool {
        !context.is_cutout
    }

    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult {
        let config = context.config;

        let graded = ops::clahe_luma(image, config.clahe_clip_limit, config.clahe_tiles);
        let graded = ops::adjust_sharpness(&graded, config.grade_sharpness);
        Ok(ops::adjust_saturation(&graded, config.grade_saturation))
    }
}
