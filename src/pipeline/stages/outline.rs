use image::{imageops, RgbaImage};

use crate::{
    pipeline::{
        ops,
        traits::{Stage, StageContext, StageResult},
    },
    template::Outline,
};

use super::OUTLINE;

/// Surround the opaque silhouette with a solid outline `outline.width` pixels
/// thick. The result is padded by the width on every side.
pub fn add_outline(image: &RgbaImage, outline: &Outline) -> RgbaImage {
    let padded = ops::pad_transparent(image, outline.width);
    let grown = ops::dilate(&ops::alpha_mask(&padded), outline.width);

    let mut stroked = RgbaImage::from_fn(padded.width(), padded.height(), |x, y| {
        outline.color.with_alpha(grown.get_pixel(x, y)[0])
    });
    imageops::overlay(&mut stroked, &padded, 0, 0);
    stroked
}

/// Sticker outline for cutout slots
#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineStage;

impl OutlineStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for OutlineStage {
    fn name(&self) -> &str {
        OUTLINE
    }

    fn description(&self) -> &str {
        "Solid outline following the silhouette"
    }

    fn applies_to(&self, context: &StageContext<'_>) -> bool {
        context.placement.use_outline && context.placement.outline.width > 0
    }

    fn apply(&self, image: &RgbaImage, context: &mut StageContext<'_>) -> StageResult {
        let outline = context.placement.outline;
        let stroked = add_outline(image, &outline);

        let pad = outline.width as i32;
        context.origin_shift.0 += pad;
        context.origin_shift.1 += pad;
        Ok(stroked)
    }
}
