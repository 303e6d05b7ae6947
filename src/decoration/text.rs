use std::path::Path;

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

use crate::{color::Color, config::DecorationConfig};

use super::{
    draw::{blend_pixel, fill_rect},
    font,
};

/// Font used for text decorations
pub enum Typeface {
    TrueType(Font<'static>),
    /// Built-in block letters; always available
    Bitmap,
}

impl Typeface {
    /// Try the configured font, then each system font, then fall back to the
    /// built-in bitmap font. Never fails.
    pub fn load(config: &DecorationConfig) -> Self {
        let candidates = config.font_path.iter().chain(config.system_fonts.iter());

        for path in candidates {
            match Self::load_file(path) {
                Some(font) => {
                    debug!("Using font {:?}", path);
                    return Typeface::TrueType(font);
                }
                None => debug!("Font {:?} unavailable", path),
            }
        }

        if config.font_path.is_some() {
            warn!("Configured font could not be loaded, using built-in bitmap font");
        } else {
            debug!("No system font found, using built-in bitmap font");
        }
        Typeface::Bitmap
    }

    fn load_file(path: &Path) -> Option<Font<'static>> {
        let bytes = std::fs::read(path).ok()?;
        Font::try_from_vec(bytes)
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, Typeface::Bitmap)
    }

    /// Draw `text` with its top-left corner at (x, y), `size` pixels tall
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: u32, color: Rgba<u8>) {
        match self {
            Typeface::TrueType(font) => draw_truetype(canvas, font, text, x, y, size, color),
            Typeface::Bitmap => draw_bitmap(canvas, text, x, y, size, color),
        }
    }
}

fn draw_truetype(
    canvas: &mut RgbaImage,
    font: &Font<'static>,
    text: &str,
    x: i32,
    y: i32,
    size: u32,
    color: Rgba<u8>,
) {
    let scale = Scale::uniform(size as f32);
    let v_metrics = font.v_metrics(scale);

    for glyph in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = x as i64 + bb.min.x as i64 + gx as i64;
                let py = y as i64 + bb.min.y as i64 + gy as i64;
                blend_pixel(canvas, px, py, color, coverage);
            });
        }
    }
}

fn draw_bitmap(canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: u32, color: Rgba<u8>) {
    // Glyph rows span the cap height, roughly 70% of the em size
    let cell = (size * 7 / 10 / font::GLYPH_HEIGHT).max(1);

    for (index, c) in text.chars().enumerate() {
        let rows = font::glyph(c);
        let origin_x = x as i64 + (index as u32 * font::ADVANCE * cell) as i64;

        for row in 0..font::GLYPH_HEIGHT {
            for col in 0..font::GLYPH_WIDTH {
                if font::is_set(&rows, col, row) {
                    fill_rect(
                        canvas,
                        origin_x + (col * cell) as i64,
                        y as i64 + (row * cell) as i64,
                        cell,
                        cell,
                        color,
                    );
                }
            }
        }
    }
}

/// Draw text over a faint black drop shadow offset by `max(2, size / 40)`
#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    canvas: &mut RgbaImage,
    typeface: &Typeface,
    text: &str,
    x: i32,
    y: i32,
    size: u32,
    color: Color,
    shadow_alpha: u8,
) {
    let offset = (size / 40).max(2) as i32;
    if shadow_alpha > 0 {
        typeface.draw(canvas, text, x + offset, y + offset, size, Rgba([0, 0, 0, shadow_alpha]));
    }
    typeface.draw(canvas, text, x, y, size, color.rgba());
}
