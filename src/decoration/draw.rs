//! Antialiased raster primitives on straight-alpha canvases.

use image::{Rgba, RgbaImage};

use crate::{color::Color, pipeline::ops::clamp_u8};

/// Blend `color` onto one canvas pixel with the given coverage; out-of-bounds
/// coordinates are ignored.
pub fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = (color[3] as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
    if alpha == 0 {
        return;
    }

    let target = canvas.get_pixel_mut(x as u32, y as u32);
    let src_alpha = alpha as f32 / 255.0;
    let dst_alpha = target[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    for c in 0..3 {
        let mixed = color[c] as f32 * src_alpha + target[c] as f32 * dst_alpha * (1.0 - src_alpha);
        target[c] = clamp_u8(mixed / out_alpha);
    }
    target[3] = clamp_u8(out_alpha * 255.0);
}

/// Axis-aligned filled rectangle
pub fn fill_rect(canvas: &mut RgbaImage, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>) {
    for py in y..y + height as i64 {
        for px in x..x + width as i64 {
            blend_pixel(canvas, px, py, color, 1.0);
        }
    }
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq > 0.0 {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Coverage accumulated over a canvas region, then blended in one go so
/// overlapping stroke segments do not darken their joints
pub struct CoverageMask {
    x0: i64,
    y0: i64,
    width: usize,
    height: usize,
    coverage: Vec<f32>,
}

impl CoverageMask {
    /// Mask over the canvas region covering every point, grown by `margin`
    pub fn around(points: &[(f32, f32)], margin: f32) -> Self {
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if points.is_empty() {
            return Self {
                x0: 0,
                y0: 0,
                width: 0,
                height: 0,
                coverage: Vec::new(),
            };
        }

        let x0 = (min_x - margin).floor() as i64;
        let y0 = (min_y - margin).floor() as i64;
        let width = ((max_x + margin).ceil() as i64 - x0 + 1).max(0) as usize;
        let height = ((max_y + margin).ceil() as i64 - y0 + 1).max(0) as usize;

        Self {
            x0,
            y0,
            width,
            height,
            coverage: vec![0.0; width * height],
        }
    }

    /// Add a round-capped line segment of the given width
    pub fn stroke_segment(&mut self, a: (f32, f32), b: (f32, f32), width: f32) {
        let half = width / 2.0;
        let left = ((a.0.min(b.0) - half - 1.0).floor() as i64 - self.x0).max(0) as usize;
        let top = ((a.1.min(b.1) - half - 1.0).floor() as i64 - self.y0).max(0) as usize;
        let right = (((a.0.max(b.0) + half + 1.0).ceil() as i64 - self.x0).max(0) as usize).min(self.width);
        let bottom = (((a.1.max(b.1) + half + 1.0).ceil() as i64 - self.y0).max(0) as usize).min(self.height);

        for my in top..bottom {
            for mx in left..right {
                let p = (
                    (self.x0 + mx as i64) as f32 + 0.5,
                    (self.y0 + my as i64) as f32 + 0.5,
                );
                let coverage = (half + 0.5 - distance_to_segment(p, a, b)).clamp(0.0, 1.0);
                let cell = &mut self.coverage[my * self.width + mx];
                *cell = cell.max(coverage);
            }
        }
    }

    /// Add a polyline through `points`, optionally closing it
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], width: f32, closed: bool) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], width);
        }
        if closed && points.len() > 2 {
            self.stroke_segment(points[points.len() - 1], points[0], width);
        }
    }

    /// Blend the accumulated coverage onto the canvas
    pub fn paint(&self, canvas: &mut RgbaImage, color: Color) {
        let color = color.rgba();
        for my in 0..self.height {
            for mx in 0..self.width {
                let coverage = self.coverage[my * self.width + mx];
                if coverage > 0.0 {
                    blend_pixel(canvas, self.x0 + mx as i64, self.y0 + my as i64, color, coverage);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_ignores_out_of_bounds() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        blend_pixel(&mut canvas, -1, 2, Rgba([255, 0, 0, 255]), 1.0);
        blend_pixel(&mut canvas, 4, 0, Rgba([255, 0, 0, 255]), 1.0);
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_covers_line_not_surroundings() {
        let mut canvas = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
        let points = [(5.0, 20.0), (35.0, 20.0)];
        let mut mask = CoverageMask::around(&points, 4.0);
        mask.stroke_polyline(&points, 4.0, false);
        mask.paint(&mut canvas, Color::BLACK);

        assert_eq!(canvas.get_pixel(20, 19).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(20, 10).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(39, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_fill_rect_clips_to_canvas() {
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        fill_rect(&mut canvas, 8, 8, 5, 5, Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(9, 9).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(7, 7).0, [0, 0, 0, 255]);
    }
}
