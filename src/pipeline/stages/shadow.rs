use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

use crate::{
    config::PipelineConfig,
    pipeline::traits::{Stage, StageContext, StageResult},
};

use super::SHADOW;

/// Large blur radii are applied to a reduced mask and scaled back up; the
/// shadow is soft enough that the resampling is invisible.
const BLUR_SIGMA_PER_STEP: f32 = 4.0;

/// Padding needed on every side to hold a shadow with this blur
pub fn shadow_padding(blur_radius: f32) -> u32 {
    (blur_radius * 2.0).ceil().max(0.0) as u32
}

fn soften(mask: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return mask.clone();
    }

    let (width, height) = mask.dimensions();
    let step = ((sigma / BLUR_SIGMA_PER_STEP).floor() as u32).max(1);
    if step == 1 || width / step < 2 || height / step < 2 {
        return imageops::blur(mask, sigma);
    }

    let reduced = imageops::resize(
        mask,
        width / step,
        height / step,
        imageops::FilterType::Triangle,
    );
    let blurred = imageops::blur(&reduced, sigma / step as f32);
    imageops::resize(&blurred, width, height, imageops::FilterType::Triangle)
}

/// Place a blurred dark copy of the silhouette behind the image, offset to
/// the lower right. The result is padded by [`shadow_padding`] on every side.
pub fn add_shadow(image: &RgbaImage, config: &PipelineConfig) -> RgbaImage {
    let pad = shadow_padding(config.shadow_blur_radius);
    let offset = config.shadow_offset.min(pad);
    let (width, height) = image.dimensions();
    let (out_width, out_height) = (width + 2 * pad, height + 2 * pad);

    let opacity = config.shadow_opacity as u32;
    let mut mask = GrayImage::new(out_width, out_height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let alpha = (pixel[3] as u32 * opacity + 127) / 255;
        mask.put_pixel(x + pad + offset, y + pad + offset, Luma([alpha as u8]));
    }
    let mask = soften(&mask, config.shadow_blur_radius);

    let mut shadowed = RgbaImage::from_fn(out_width, out_height, |x, y| {
        Rgba([0, 0, 0, mask.get_pixel(x, y)[0]])
    });
    imageops::overlay(&mut shadowed, image, pad as i64, pad as i64);
    shadowed
}

/// Soft drop shadow beneath every slot that does not opt out
#[derive(Debug, Default, Clone, Copy)]
pub struct ShadowStage;

impl ShadowStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for ShadowStage {
    fn name(&self) -> &str {
        SHADOW
    }

    fn description(&self) -> &str {
        "Blurred drop shadow offset to the lower right"
    }

    fn applies_to(&self, context: &StageContext<'_>) -> bool {
        !context.placement.no_shadow
    }

    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult {
        let shadowed = add_shadow(image, context.config);

        let pad = shadow_padding(context.config.shadow_blur_radius) as i32;
        context.origin_shift.0 += pad;
        context.origin_shift.1 += pad;
        Ok(shadowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_pads_and_darkens_lower_right() {
        let config = PipelineConfig {
            shadow_blur_radius: 3.0,
            shadow_offset: 4,
            shadow_opacity: 120,
            ..PipelineConfig::default()
        };
        let photo = RgbaImage::from_pixel(20, 20, Rgba([250, 250, 250, 255]));
        let out = add_shadow(&photo, &config);

        assert_eq!(shadow_padding(3.0), 6);
        assert_eq!(out.dimensions(), (32, 32));
        // Photo sits at the padding offset
        assert_eq!(out.get_pixel(6, 6).0, [250, 250, 250, 255]);
        // Shadow shows past the lower-right corner but not the upper-left
        assert!(out.get_pixel(28, 28)[3] > 0);
        assert!(out.get_pixel(28, 28)[3] <= 120);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_large_blur_keeps_dimensions() {
        let config = PipelineConfig::default();
        let photo = RgbaImage::from_pixel(80, 50, Rgba([10, 10, 10, 255]));
        let out = add_shadow(&photo, &config);
        assert_eq!(out.dimensions(), (80 + 60, 50 + 60));
    }
}
