//! # Decoration Renderer
//!
//! Draws the non-photo overlays of a template on top of the composed canvas:
//! hand-drawn doodles, captions, washi tape strips and palette swatches.
//!
//! Decorations without an explicit color take the first palette entry, or
//! black when the palette is empty.

pub mod doodle;
pub mod draw;
pub mod font;
pub mod swatch;
pub mod tape;
pub mod text;

use image::RgbaImage;
use rand::rngs::StdRng;
use tracing::debug;

use crate::{color::Color, config::DecorationConfig, template::Decoration};

pub use text::Typeface;

/// Color for a decoration: its own, else the first palette entry, else black
pub fn resolve_color(explicit: Option<Color>, palette: &[Color]) -> Color {
    explicit
        .or_else(|| palette.first().copied())
        .unwrap_or(Color::BLACK)
}

pub struct DecorationRenderer {
    config: DecorationConfig,
    typeface: Typeface,
}

impl DecorationRenderer {
    /// Create a renderer, loading the first usable font from the config
    pub fn new(config: DecorationConfig) -> Self {
        let typeface = Typeface::load(&config);
        Self { config, typeface }
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Draw every decoration in declaration order
    pub fn render(
        &self,
        canvas: &mut RgbaImage,
        decorations: &[Decoration],
        palette: &[Color],
        rng: &mut StdRng,
    ) {
        for decoration in decorations {
            debug!("Drawing {}", decoration.kind());
            self.render_one(canvas, decoration, palette, rng);
        }
    }

    fn render_one(
        &self,
        canvas: &mut RgbaImage,
        decoration: &Decoration,
        palette: &[Color],
        rng: &mut StdRng,
    ) {
        match decoration {
            Decoration::Doodle {
                shape,
                x,
                y,
                size,
                color,
            } => doodle::draw_doodle(
                canvas,
                *shape,
                *x,
                *y,
                *size,
                resolve_color(*color, palette),
                rng,
            ),
            Decoration::Text {
                content,
                x,
                y,
                font_size,
                color,
            } => text::draw_text(
                canvas,
                &self.typeface,
                content,
                *x,
                *y,
                *font_size,
                resolve_color(*color, palette),
                self.config.text_shadow_alpha,
            ),
            Decoration::WashiTape { x, y, rotation, color } => tape::draw_tape(
                canvas,
                *x,
                *y,
                *rotation,
                resolve_color(*color, palette),
                &self.config,
            ),
            Decoration::ColorSwatch { x, y } => {
                swatch::draw_swatches(canvas, *x, *y, palette, &self.config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::DoodleShape;
    use image::Rgba;
    use rand::SeedableRng;

    #[test]
    fn test_resolve_color_fallbacks() {
        let red = Color::from_u32(0xFF0000);
        let blue = Color::from_u32(0x0000FF);
        assert_eq!(resolve_color(Some(red), &[blue]), red);
        assert_eq!(resolve_color(None, &[blue, red]), blue);
        assert_eq!(resolve_color(None, &[]), Color::BLACK);
    }

    #[test]
    fn test_paletteless_doodle_is_black() {
        let renderer = DecorationRenderer::new(DecorationConfig::default());
        let mut canvas = RgbaImage::from_pixel(120, 120, Rgba([255, 255, 255, 255]));
        let doodle = Decoration::Doodle {
            shape: DoodleShape::Circle,
            x: 10,
            y: 10,
            size: 100,
            color: None,
        };
        renderer.render(&mut canvas, &[doodle], &[], &mut StdRng::seed_from_u64(1));

        assert!(canvas.pixels().any(|p| p.0 == [0, 0, 0, 255]));
        assert!(canvas.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
    }

    #[test]
    fn test_swatch_without_palette_draws_nothing() {
        let renderer = DecorationRenderer::new(DecorationConfig::default());
        let mut canvas = RgbaImage::from_pixel(300, 300, Rgba([10, 20, 30, 255]));
        let before = canvas.clone();
        renderer.render(
            &mut canvas,
            &[Decoration::ColorSwatch { x: 20, y: 20 }],
            &[],
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(canvas, before);
    }
}
