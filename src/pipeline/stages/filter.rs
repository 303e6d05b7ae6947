use image::{imageops, RgbaImage};

use crate::{
    error::StageError,
    pipeline::{
        ops,
        traits::{Stage, StageContext, StageResult},
    },
    template::FilterKind,
};

use super::FILTER;

const VINTAGE_CONTRAST: f32 = 0.9;
const BW_CONTRAST: f32 = 1.2;
const VIBRANT_SATURATION: f32 = 1.4;
const VIBRANT_CONTRAST: f32 = 1.1;
const SOFT_BLUR_SIGMA: f32 = 1.0;
const SOFT_BRIGHTNESS: f32 = 1.1;
const LUXURY_CONTRAST: f32 = 1.05;
const LUXURY_SHARPNESS: f32 = 1.1;

// Watercolor smooths at half resolution, which also keeps the bilateral
// passes affordable on poster-sized slots
const WATERCOLOR_PASSES: usize = 2;
const WATERCOLOR_RADIUS: u32 = 3;
const WATERCOLOR_SIGMA_SPACE: f32 = 3.0;
const WATERCOLOR_SIGMA_COLOR: f32 = 25.0;
const WATERCOLOR_SHARPNESS: f32 = 1.4;

/// Apply one color filter to an image
pub fn apply_filter(image: &RgbaImage, filter: FilterKind) -> StageResult {
    let filtered = match filter {
        FilterKind::None => image.clone(),
        FilterKind::Vintage => ops::adjust_contrast(&ops::sepia(image), VINTAGE_CONTRAST),
        FilterKind::Bw => ops::adjust_contrast(&ops::grayscale(image), BW_CONTRAST),
        FilterKind::Vibrant => ops::adjust_contrast(
            &ops::adjust_saturation(image, VIBRANT_SATURATION),
            VIBRANT_CONTRAST,
        ),
        FilterKind::Soft => ops::adjust_brightness(
            &ops::gaussian_blur(image, SOFT_BLUR_SIGMA),
            SOFT_BRIGHTNESS,
        ),
        FilterKind::Luxury => ops::adjust_sharpness(
            &ops::adjust_contrast(image, LUXURY_CONTRAST),
            LUXURY_SHARPNESS,
        ),
        FilterKind::Watercolor => watercolor(image)?,
    };
    Ok(filtered)
}

fn watercolor(image: &RgbaImage) -> StageResult {
    let (width, height) = image.dimensions();
    let (small_width, small_height) = (width / 2, height / 2);
    if small_width == 0 || small_height == 0 {
        return Err(StageError::recoverable(
            FILTER,
            format!("watercolor needs at least 2x2 pixels, got {}x{}", width, height),
        ));
    }

    let mut painted = imageops::resize(
        image,
        small_width,
        small_height,
        imageops::FilterType::Triangle,
    );
    for _ in 0..WATERCOLOR_PASSES {
        painted = ops::bilateral(
            &painted,
            WATERCOLOR_RADIUS,
            WATERCOLOR_SIGMA_SPACE,
            WATERCOLOR_SIGMA_COLOR,
        );
    }

    let painted = imageops::resize(&painted, width, height, imageops::FilterType::Lanczos3);
    Ok(ops::adjust_sharpness(&painted, WATERCOLOR_SHARPNESS))
}

/// Applies the placement's color filter
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterStage;

impl FilterStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for FilterStage {
    fn name(&self) -> &str {
        FILTER
    }

    fn description(&self) -> &str {
        "Per-slot color filter"
    }

    fn applies_to(&self, context: &StageContext<'_>) -> bool {
        context.placement.filter != FilterKind::None
    }

    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult {
        apply_filter(image, context.placement.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn swatch() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| Rgba([180, (x * 10) as u8, (y * 12) as u8, 255]))
    }

    #[test]
    fn test_bw_drops_chroma() {
        let out = apply_filter(&swatch(), FilterKind::Bw).unwrap();
        assert!(out.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
    }

    #[test]
    fn test_vintage_is_warm() {
        let out = apply_filter(&swatch(), FilterKind::Vintage).unwrap();
        assert!(out.pixels().all(|p| p[0] >= p[2]));
    }

    #[test]
    fn test_vibrant_widens_channel_spread() {
        let photo = RgbaImage::from_pixel(8, 8, Rgba([150, 110, 100, 255]));
        let out = apply_filter(&photo, FilterKind::Vibrant).unwrap();
        let p = out.get_pixel(4, 4);
        assert!(p[0] as i32 - p[2] as i32 > 50);
    }

    #[test]
    fn test_soft_brightens() {
        let photo = RgbaImage::from_pixel(8, 8, Rgba([100, 100, 100, 255]));
        let out = apply_filter(&photo, FilterKind::Soft).unwrap();
        assert_eq!(out.get_pixel(4, 4)[0], 110);
    }

    #[test]
    fn test_watercolor_keeps_size() {
        let out = apply_filter(&swatch(), FilterKind::Watercolor).unwrap();
        assert_eq!(out.dimensions(), (16, 16));
    }

    #[test]
    fn test_watercolor_refuses_single_pixel_rows() {
        let sliver = RgbaImage::from_pixel(30, 1, Rgba([1, 2, 3, 255]));
        let err = apply_filter(&sliver, FilterKind::Watercolor).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_none_is_identity() {
        assert_eq!(apply_filter(&swatch(), FilterKind::None).unwrap(), swatch());
    }
}
