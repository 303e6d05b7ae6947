//! Foreground segmentation collaborators.
//!
//! A [`Segmenter`] turns a photo into a cutout whose background is fully
//! transparent. Real deployments plug in a model-backed implementation; the
//! crate ships a heuristic one that keys out a uniform border color.

use std::collections::VecDeque;

use image::{Rgba, RgbaImage};

use crate::error::StageError;

/// Background removal, injected into the cutout stage
pub trait Segmenter: Send + Sync {
    fn name(&self) -> &str;

    /// Produce an RGBA cutout the same size as `photo`
    fn segment(&self, photo: &RgbaImage) -> Result<RgbaImage, StageError>;
}

/// Segmenter that is never able to help; every cutout falls back to grading
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSegmenter;

impl Segmenter for NoSegmenter {
    fn name(&self) -> &str {
        "none"
    }

    fn segment(&self, _photo: &RgbaImage) -> Result<RgbaImage, StageError> {
        Err(StageError::recoverable("cutout", "no segmenter configured"))
    }
}

/// Flood-fills from the image border across pixels close to the average
/// border color and makes them transparent.
///
/// Works for studio shots on plain backdrops. Refuses images where nothing or
/// nearly everything would be removed.
#[derive(Debug, Clone, Copy)]
pub struct BorderKeySegmenter {
    /// Maximum euclidean RGB distance from the key color
    pub tolerance: f32,

    /// Fraction of pixels that must survive as foreground
    pub min_foreground: f32,
}

impl Default for BorderKeySegmenter {
    fn default() -> Self {
        Self {
            tolerance: 40.0,
            min_foreground: 0.02,
        }
    }
}

impl BorderKeySegmenter {
    fn border_key(photo: &RgbaImage) -> [f32; 3] {
        let (width, height) = photo.dimensions();
        let mut sum = [0.0f64; 3];
        let mut count = 0.0f64;

        let mut add = |pixel: &Rgba<u8>| {
            for c in 0..3 {
                sum[c] += pixel[c] as f64;
            }
            count += 1.0;
        };

        for x in 0..width {
            add(photo.get_pixel(x, 0));
            add(photo.get_pixel(x, height - 1));
        }
        for y in 0..height {
            add(photo.get_pixel(0, y));
            add(photo.get_pixel(width - 1, y));
        }

        [
            (sum[0] / count) as f32,
            (sum[1] / count) as f32,
            (sum[2] / count) as f32,
        ]
    }
}

impl Segmenter for BorderKeySegmenter {
    fn name(&self) -> &str {
        "border-key"
    }

    fn segment(&self, photo: &RgbaImage) -> Result<RgbaImage, StageError> {
        let (width, height) = photo.dimensions();
        if width < 3 || height < 3 {
            return Err(StageError::recoverable("cutout", "photo too small to segment"));
        }

        let key = Self::border_key(photo);
        let matches_key = |pixel: &Rgba<u8>| {
            let distance: f32 = (0..3)
                .map(|c| {
                    let d = pixel[c] as f32 - key[c];
                    d * d
                })
                .sum();
            distance.sqrt() <= self.tolerance
        };

        let index = |x: u32, y: u32| (y * width + x) as usize;
        let mut background = vec![false; (width * height) as usize];
        let mut queue = VecDeque::new();

        let seed = |x: u32, y: u32, background: &mut Vec<bool>, queue: &mut VecDeque<(u32, u32)>| {
            if !background[index(x, y)] && matches_key(photo.get_pixel(x, y)) {
                background[index(x, y)] = true;
                queue.push_back((x, y));
            }
        };

        for x in 0..width {
            seed(x, 0, &mut background, &mut queue);
            seed(x, height - 1, &mut background, &mut queue);
        }
        for y in 0..height {
            seed(0, y, &mut background, &mut queue);
            seed(width - 1, y, &mut background, &mut queue);
        }

        while let Some((x, y)) = queue.pop_front() {
            if x > 0 {
                seed(x - 1, y, &mut background, &mut queue);
            }
            if x + 1 < width {
                seed(x + 1, y, &mut background, &mut queue);
            }
            if y > 0 {
                seed(x, y - 1, &mut background, &mut queue);
            }
            if y + 1 < height {
                seed(x, y + 1, &mut background, &mut queue);
            }
        }

        let removed = background.iter().filter(|b| **b).count();
        let total = background.len();
        if removed == 0 {
            return Err(StageError::recoverable("cutout", "no uniform background found"));
        }
        if (total - removed) as f32 / (total as f32) < self.min_foreground {
            return Err(StageError::recoverable("cutout", "no foreground left after keying"));
        }

        let mut cutout = photo.clone();
        for (x, y, pixel) in cutout.enumerate_pixels_mut() {
            if background[index(x, y)] {
                pixel[3] = 0;
            }
        }
        Ok(cutout)
    }
}
