use image::{imageops, Rgba, RgbaImage};

use crate::{
    config::PipelineConfig,
    pipeline::traits::{Stage, StageContext, StageResult},
    template::FrameStyle,
};

use super::FRAME;

const FRAME_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Instant-photo frame: equal margins on the top and sides, a deeper one
/// below. Margins scale with the photo.
pub fn add_polaroid_frame(image: &RgbaImage, side_ratio: f32, bottom_ratio: f32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let margin = (width as f32 * side_ratio).round() as u32;
    let bottom = (height as f32 * bottom_ratio).round() as u32;

    let mut framed = RgbaImage::from_pixel(width + 2 * margin, height + margin + bottom, FRAME_COLOR);
    imageops::overlay(&mut framed, image, margin as i64, margin as i64);
    framed
}

/// Uniform solid border
pub fn add_border(image: &RgbaImage, border: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut framed = RgbaImage::from_pixel(width + 2 * border, height + 2 * border, FRAME_COLOR);
    imageops::overlay(&mut framed, image, border as i64, border as i64);
    framed
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameStage;

impl FrameStage {
    pub fn new() -> Self {
        Self
    }

    fn frame(image: &RgbaImage, style: FrameStyle, config: &PipelineConfig) -> RgbaImage {
        match style {
            FrameStyle::None => image.clone(),
            FrameStyle::Polaroid => add_polaroid_frame(
                image,
                config.polaroid_side_ratio,
                config.polaroid_bottom_ratio,
            ),
            FrameStyle::Border => add_border(image, config.border_width),
        }
    }
}

impl Stage for FrameStage {
    fn name(&self) -> &str {
        FRAME
    }

    fn description(&self) -> &str {
        "White polaroid or border frame"
    }

    fn applies_to(&self, context: &StageContext<'_>) -> bool {
        context.placement.frame != FrameStyle::None
    }

    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult {
        Ok(Self::frame(image, context.placement.frame, context.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polaroid_margins() {
        let photo = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        let framed = add_polaroid_frame(&photo, 0.05, 0.15);

        assert_eq!(framed.dimensions(), (220, 125));
        assert_eq!(framed.get_pixel(5, 5).0, [255, 255, 255, 255]);
        assert_eq!(framed.get_pixel(10, 10).0, [0, 0, 0, 255]);
        assert_eq!(framed.get_pixel(100, 115).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_border_is_uniform() {
        let photo = RgbaImage::from_pixel(30, 20, Rgba([9, 9, 9, 255]));
        let framed = add_border(&photo, 10);

        assert_eq!(framed.dimensions(), (50, 40));
        assert_eq!(framed.get_pixel(9, 20).0, [255, 255, 255, 255]);
        assert_eq!(framed.get_pixel(10, 10).0, [9, 9, 9, 255]);
        assert_eq!(framed.get_pixel(45, 35).0, [255, 255, 255, 255]);
    }
}
