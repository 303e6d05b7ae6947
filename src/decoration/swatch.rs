use image::{Rgba, RgbaImage};

use crate::{color::Color, config::DecorationConfig};

use super::draw::fill_rect;

/// At most this many palette colors are shown
pub const MAX_SWATCHES: usize = 5;

const SWATCH_OUTLINE: u32 = 4;

/// Vertical column of palette chips, each outlined in white, starting at (x, y)
pub fn draw_swatches(canvas: &mut RgbaImage, x: i32, y: i32, palette: &[Color], config: &DecorationConfig) {
    let size = config.swatch_size;
    let stride = (size + config.swatch_spacing) as i64;

    for (index, color) in palette.iter().take(MAX_SWATCHES).enumerate() {
        let top = y as i64 + index as i64 * stride;
        fill_rect(
            canvas,
            x as i64 - SWATCH_OUTLINE as i64,
            top - SWATCH_OUTLINE as i64,
            size + 2 * SWATCH_OUTLINE,
            size + 2 * SWATCH_OUTLINE,
            Rgba([255, 255, 255, 255]),
        );
        fill_rect(canvas, x as i64, top, size, size, color.rgba());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swatches_stack_vertically_and_cap_at_five() {
        let config = DecorationConfig {
            swatch_size: 10,
            swatch_spacing: 5,
            ..DecorationConfig::default()
        };
        let palette: Vec<Color> = (1..=7).map(|i| Color::new(i * 30, 0, 0)).collect();
        let mut canvas = RgbaImage::from_pixel(40, 120, Rgba([0, 0, 0, 255]));
        draw_swatches(&mut canvas, 10, 10, &palette, &config);

        assert_eq!(canvas.get_pixel(15, 15).0, [30, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(15, 30).0, [60, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(15, 75).0, [150, 0, 0, 255]);
        // Sixth chip would start at y = 85
        assert_eq!(canvas.get_pixel(15, 95).0, [0, 0, 0, 255]);
        // White outline
        assert_eq!(canvas.get_pixel(8, 15).0, [255, 255, 255, 255]);
    }
}
