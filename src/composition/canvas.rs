//! Canvas-level raster steps: background fill, layer pasting, paper grain,
//! flattening and PNG encoding.

use image::{
    codecs::png::{CompressionType, FilterType, PngEncoder},
    imageops, ColorType, ImageEncoder, Rgb, RgbImage, RgbaImage,
};
use rand::{rngs::StdRng, Rng};

use crate::{
    error::EncodeError,
    pipeline::{ops::clamp_u8, PhotoLayer},
    template::Background,
};

/// Allocate the canvas and paint its background.
///
/// Gradients run top to bottom: row 0 is exactly `top` and the last row is
/// exactly `bottom`.
pub fn create_background(width: u32, height: u32, background: &Background) -> RgbaImage {
    match background {
        Background::Solid { color } => RgbaImage::from_pixel(width, height, color.rgba()),
        Background::Gradient { top, bottom } => {
            let mut canvas = RgbaImage::new(width, height);
            let last_row = height.saturating_sub(1).max(1) as f32;
            for (y, row) in canvas.enumerate_rows_mut() {
                let color = top.lerp(bottom, y as f32 / last_row).rgba();
                for (_, _, pixel) in row {
                    *pixel = color;
                }
            }
            canvas
        }
    }
}

/// Paste layers in the given order; later layers cover earlier ones
pub fn paste_layers(canvas: &mut RgbaImage, layers: &[PhotoLayer]) {
    for layer in layers {
        let (x, y) = layer.position();
        imageops::overlay(canvas, &layer.image, x, y);
    }
}

/// Blend uniform gray noise into the color channels for a paper-grain feel
pub fn apply_texture(canvas: &mut RgbaImage, opacity: f32, noise_max: u8, rng: &mut StdRng) {
    if opacity <= 0.0 || noise_max == 0 {
        return;
    }

    let keep = 1.0 - opacity;
    for pixel in canvas.pixels_mut() {
        let noise = rng.gen_range(0..noise_max) as f32 * opacity;
        for c in 0..3 {
            pixel[c] = clamp_u8(pixel[c] as f32 * keep + noise);
        }
    }
}

/// Composite over opaque white and drop the alpha channel
pub fn flatten(canvas: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let pixel = canvas.get_pixel(x, y);
        let alpha = pixel[3] as f32 / 255.0;
        let over_white = |c: u8| clamp_u8(c as f32 * alpha + 255.0 * (1.0 - alpha));
        Rgb([over_white(pixel[0]), over_white(pixel[1]), over_white(pixel[2])])
    })
}

/// Lossless PNG with the strongest compression
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidCanvas { width, height });
    }

    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, FilterType::Adaptive)
        .write_image(image.as_raw(), width, height, ColorType::Rgb8)
        .map_err(|e| EncodeError::PngFailed {
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use image::Rgba;
    use rand::SeedableRng;

    #[test]
    fn test_gradient_endpoints_are_exact() {
        let top = Color::from_u32(0xFFF9FF);
        let bottom = Color::from_u32(0xFDEBF3);
        let canvas = create_background(8, 50, &Background::Gradient { top, bottom });

        assert_eq!(canvas.get_pixel(3, 0).0, [0xFF, 0xF9, 0xFF, 255]);
        assert_eq!(canvas.get_pixel(3, 49).0, [0xFD, 0xEB, 0xF3, 255]);
        assert!(canvas.get_pixel(0, 25)[1] < 0xF9 && canvas.get_pixel(0, 25)[1] > 0xEB);
    }

    #[test]
    fn test_single_row_gradient_is_top() {
        let canvas = create_background(
            4,
            1,
            &Background::Gradient {
                top: Color::WHITE,
                bottom: Color::BLACK,
            },
        );
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_texture_stays_subtle() {
        let mut canvas = RgbaImage::from_pixel(32, 32, Rgba([200, 100, 50, 255]));
        apply_texture(&mut canvas, 0.045, 50, &mut StdRng::seed_from_u64(4));

        for pixel in canvas.pixels() {
            assert!((pixel[0] as i32 - 200).abs() <= 10);
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_flatten_over_white() {
        let canvas = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let flat = flatten(&canvas);
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_png_roundtrip_dimensions() {
        let image = RgbImage::from_pixel(17, 9, Rgb([1, 2, 3]));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (17, 9));
    }

    #[test]
    fn test_empty_canvas_refuses_to_encode() {
        let image = RgbImage::new(0, 10);
        assert!(matches!(
            encode_png(&image),
            Err(EncodeError::InvalidCanvas { .. })
        ));
    }
}
