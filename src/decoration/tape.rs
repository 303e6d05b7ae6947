use image::{imageops, Rgba, RgbaImage};

use crate::{color::Color, config::DecorationConfig, pipeline::ops};

/// Bites cut into each short edge
const SCALLOPS: u32 = 3;

/// A strip of translucent washi tape, before rotation. The short edges get
/// semicircular bites so the strip looks torn off rather than cut.
pub fn tape_strip(width: u32, height: u32, color: Color, alpha: u8) -> RgbaImage {
    let pitch = height as f32 / SCALLOPS as f32;
    let bite = pitch * 0.35;

    RgbaImage::from_fn(width, height, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        let row = ((py / pitch).floor()).min(SCALLOPS as f32 - 1.0);
        let centre_y = (row + 0.5) * pitch;

        let bitten = [0.0, width as f32].iter().any(|&edge| {
            let (dx, dy) = (px - edge, py - centre_y);
            dx * dx + dy * dy < bite * bite
        });

        if bitten {
            Rgba([color.r, color.g, color.b, 0])
        } else {
            color.with_alpha(alpha)
        }
    })
}

/// Draw tape rotated counter-clockwise by `rotation` degrees with the rotated
/// bounding box's top-left corner at (x, y)
pub fn draw_tape(
    canvas: &mut RgbaImage,
    x: i32,
    y: i32,
    rotation: f32,
    color: Color,
    config: &DecorationConfig,
) {
    let strip = tape_strip(config.tape_width, config.tape_height, color, config.tape_alpha);
    let strip = if rotation.abs() >= 0.01 {
        ops::rotate_expand(&strip, rotation, Rgba([color.r, color.g, color.b, 0]))
    } else {
        strip
    };
    imageops::overlay(canvas, &strip, x as i64, y as i64);
}
