use image::{imageops, RgbaImage};
use tracing::debug;

use crate::{
    config::PipelineConfig,
    error::StageError,
    pipeline::{
        ops,
        traits::{Stage, StageContext, StageResult},
    },
};

use super::RESIZE;

/// Largest size with the photo's aspect ratio that fits inside `max_width` x
/// `max_height`. Never returns a zero dimension.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);

    let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (fitted_width, fitted_height)
}

/// Fit a photo into a placement box with Lanczos resampling.
///
/// Upscaling is bracketed by sharpening so small phone photos survive being
/// stretched to poster size: pre-sharpen, resample, post-sharpen, then a touch
/// of contrast. Downscaling only resamples.
pub fn resize_to_fit(
    image: &RgbaImage,
    max_width: u32,
    max_height: u32,
    config: &PipelineConfig,
) -> RgbaImage {
    let (width, height) = image.dimensions();
    let (target_width, target_height) = fit_dimensions(width, height, max_width, max_height);

    if (target_width, target_height) == (width, height) {
        return image.clone();
    }

    if target_width > width || target_height > height {
        debug!(
            "Upscaling {}x{} -> {}x{}",
            width, height, target_width, target_height
        );
        let sharpened = ops::adjust_sharpness(image, config.upscale_presharpen);
        let resized = imageops::resize(
            &sharpened,
            target_width,
            target_height,
            imageops::FilterType::Lanczos3,
        );
        let resized = ops::adjust_sharpness(&resized, config.upscale_postsharpen);
        ops::adjust_contrast(&resized, config.upscale_contrast)
    } else {
        imageops::resize(
            image,
            target_width,
            target_height,
            imageops::FilterType::Lanczos3,
        )
    }
}

/// Fits the photo into its placement box
#[derive(Debug, Default, Clone, Copy)]
pub struct ResizeStage;

impl ResizeStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for ResizeStage {
    fn name(&self) -> &str {
        RESIZE
    }

    fn description(&self) -> &str {
        "Aspect-preserving fit with sharpened upscaling"
    }

    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult {
        let placement = context.placement;
        if placement.width == 0 || placement.height == 0 {
            return Err(StageError::fatal(
                RESIZE,
                format!("placement box {}x{} is empty", placement.width, placement.height),
            ));
        }

        Ok(resize_to_fit(
            image,
            placement.width,
            placement.height,
            context.config,
        ))
    }
}
