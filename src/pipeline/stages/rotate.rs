use image::{Rgba, RgbaImage};
use rand::Rng;
use tracing::trace;

use crate::pipeline::{
    ops,
    traits::{Stage, StageContext, StageResult},
};

use super::ROTATE;

/// Seams uncovered by rotation stay fully transparent
const SEAM_FILL: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Angles below this are not worth resampling for
const MIN_ANGLE: f32 = 0.01;

/// Tilts the photo by the placement's angle, or by a random angle within
/// `rotation_jitter` when the placement leaves it open.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotateStage;

impl RotateStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for RotateStage {
    fn name(&self) -> &str {
        ROTATE
    }

    fn description(&self) -> &str {
        "Counter-clockwise tilt with an expanded canvas"
    }

    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult {
        let degrees = match context.placement.rotation {
            Some(degrees) => degrees,
            None => {
                let jitter = context.config.rotation_jitter;
                if jitter > 0.0 {
                    context.rng.gen_range(-jitter..=jitter)
                } else {
                    0.0
                }
            }
        };

        if degrees.abs() < MIN_ANGLE {
            return Ok(image.clone());
        }

        trace!("Rotating by {:.2} degrees", degrees);
        Ok(ops::rotate_expand(image, degrees, SEAM_FILL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::template::Placement;
    use rand::{rngs::StdRng, SeedableRng};

    fn rotate(placement: &Placement, seed: u64) -> RgbaImage {
        let config = PipelineConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut context = StageContext {
            placement,
            config: &config,
            rng: &mut rng,
            is_cutout: false,
            origin_shift: (0, 0),
        };
        let photo = RgbaImage::from_pixel(60, 40, Rgba([200, 10, 10, 255]));
        RotateStage.apply(&photo, &mut context).unwrap()
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let out = rotate(&Placement::new(0, 0, 60, 40), 1);
        assert_eq!(out.dimensions(), (60, 40));
    }

    #[test]
    fn test_explicit_rotation_expands() {
        let out = rotate(&Placement::new(0, 0, 60, 40).rotation(-6.0), 1);
        assert!(out.width() > 60 && out.height() > 40);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_random_rotation_is_seeded() {
        let placement = Placement::new(0, 0, 60, 40).random_rotation();
        assert_eq!(rotate(&placement, 7), rotate(&placement, 7));
    }
}
