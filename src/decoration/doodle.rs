//! Hand-drawn doodles: every shape is traced twice with jittered points and
//! slightly different pen widths, like a marker going over its own line.

use std::f32::consts::PI;

use image::RgbaImage;
use rand::{rngs::StdRng, Rng};

use crate::{color::Color, template::DoodleShape};

use super::draw::CoverageMask;

const PASSES: usize = 2;
const MIN_STROKE: f32 = 2.0;

/// Outline of a shape inside the `size` x `size` box at (x, y), before jitter
pub fn outline_points(shape: DoodleShape, x: f32, y: f32, size: f32) -> (Vec<(f32, f32)>, bool) {
    let (cx, cy) = (x + size / 2.0, y + size / 2.0);

    match shape {
        DoodleShape::Heart => {
            // Classic parametric heart spans about 34 x 30 units
            let scale = size / 34.0;
            let points = (0..96)
                .map(|i| {
                    let t = i as f32 / 96.0 * 2.0 * PI;
                    let hx = 16.0 * t.sin().powi(3);
                    let hy = 13.0 * t.cos()
                        - 5.0 * (2.0 * t).cos()
                        - 2.0 * (3.0 * t).cos()
                        - (4.0 * t).cos();
                    (cx + hx * scale, cy - hy * scale)
                })
                .collect();
            (points, true)
        }
        DoodleShape::Star => {
            // Ten vertices alternating outer and inner radius, each edge
            // subdivided so the jitter bends it
            let (outer, inner) = (size / 2.0, size / 4.0);
            let vertices: Vec<(f32, f32)> = (0..10)
                .map(|i| {
                    let angle = -PI / 2.0 + i as f32 * PI / 5.0;
                    let radius = if i % 2 == 0 { outer } else { inner };
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                })
                .collect();

            let mut points = Vec::with_capacity(60);
            for i in 0..vertices.len() {
                let (a, b) = (vertices[i], vertices[(i + 1) % vertices.len()]);
                for step in 0..6 {
                    let t = step as f32 / 6.0;
                    points.push((a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t));
                }
            }
            (points, true)
        }
        DoodleShape::Circle => {
            let radius = size / 2.0;
            let points = (0..64)
                .map(|i| {
                    let angle = i as f32 / 64.0 * 2.0 * PI;
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                })
                .collect();
            (points, true)
        }
        DoodleShape::Squiggle => {
            // Two and a half waves across the box width
            let amplitude = size / 12.0;
            let baseline = y + size / 6.0;
            let points = (0..=60)
                .map(|i| {
                    let t = i as f32 / 60.0;
                    (x + t * size, baseline + amplitude * (t * 5.0 * PI).sin())
                })
                .collect();
            (points, false)
        }
    }
}

/// Draw a doodle with its top-left corner at (x, y)
pub fn draw_doodle(
    canvas: &mut RgbaImage,
    shape: DoodleShape,
    x: i32,
    y: i32,
    size: u32,
    color: Color,
    rng: &mut StdRng,
) {
    let size = size.max(1) as f32;
    let (points, closed) = outline_points(shape, x as f32, y as f32, size);

    let jitter = (size / 60.0).max(1.0);
    let min_width = (size / 60.0).max(MIN_STROKE);
    let max_width = (size / 40.0).max(min_width + 1.0);

    let mut mask = CoverageMask::around(&points, jitter + max_width);
    for _ in 0..PASSES {
        let wobbly: Vec<(f32, f32)> = points
            .iter()
            .map(|&(px, py)| {
                (
                    px + rng.gen_range(-jitter..=jitter),
                    py + rng.gen_range(-jitter..=jitter),
                )
            })
            .collect();
        let width = rng.gen_range(min_width..=max_width);
        mask.stroke_polyline(&wobbly, width, closed);
    }
    mask.paint(canvas, color);
}
