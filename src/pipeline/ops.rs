//! Pixel operations shared by the pipeline stages.
//!
//! All operations take straight-alpha RGBA buffers and leave the alpha channel
//! alone unless stated otherwise. Enhancement factors follow PIL `ImageEnhance`
//! semantics: the image is blended away from a degenerate version of itself,
//! so 1.0 is the identity.

use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

const EPSILON: f32 = 1e-4;

#[inline]
pub fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// ITU-R 601 luma, the same weights PIL uses for mode "L"
#[inline]
pub fn luma(pixel: &Rgba<u8>) -> f32 {
    0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32
}

fn map_rgb<F>(image: &RgbaImage, f: F) -> RgbaImage
where
    F: Fn([f32; 3]) -> [f32; 3],
{
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b] = f([pixel[0] as f32, pixel[1] as f32, pixel[2] as f32]);
        pixel[0] = clamp_u8(r);
        pixel[1] = clamp_u8(g);
        pixel[2] = clamp_u8(b);
    }
    out
}

/// Saturation: blend against the grayscale image
pub fn adjust_saturation(image: &RgbaImage, factor: f32) -> RgbaImage {
    if (factor - 1.0).abs() < EPSILON {
        return image.clone();
    }
    map_rgb(image, |[r, g, b]| {
        let l = 0.299 * r + 0.587 * g + 0.114 * b;
        [l + (r - l) * factor, l + (g - l) * factor, l + (b - l) * factor]
    })
}

/// Brightness: blend against black
pub fn adjust_brightness(image: &RgbaImage, factor: f32) -> RgbaImage {
    if (factor - 1.0).abs() < EPSILON {
        return image.clone();
    }
    map_rgb(image, |[r, g, b]| [r * factor, g * factor, b * factor])
}

/// Contrast: blend against the mean luma of the visible pixels
pub fn adjust_contrast(image: &RgbaImage, factor: f32) -> RgbaImage {
    if (factor - 1.0).abs() < EPSILON {
        return image.clone();
    }

    let (sum, count) = image
        .pixels()
        .filter(|p| p[3] > 0)
        .fold((0.0f64, 0u64), |(sum, count), p| (sum + luma(p) as f64, count + 1));
    let mean = if count == 0 { 128.0 } else { (sum / count as f64).round() as f32 };

    map_rgb(image, |[r, g, b]| {
        [
            mean + (r - mean) * factor,
            mean + (g - mean) * factor,
            mean + (b - mean) * factor,
        ]
    })
}

/// Sharpness: blend against a 3x3 smoothed copy; the outermost ring is kept
pub fn adjust_sharpness(image: &RgbaImage, factor: f32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if (factor - 1.0).abs() < EPSILON || width < 3 || height < 3 {
        return image.clone();
    }

    let mut out = image.clone();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sums = [0u32; 3];
            for dy in 0..3 {
                for dx in 0..3 {
                    let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                    let neighbour = image.get_pixel(x + dx - 1, y + dy - 1);
                    for (channel, sum) in sums.iter_mut().enumerate() {
                        *sum += neighbour[channel] as u32 * weight;
                    }
                }
            }

            let original = image.get_pixel(x, y);
            let target = out.get_pixel_mut(x, y);
            for channel in 0..3 {
                let smooth = sums[channel] as f32 / 13.0;
                let value = original[channel] as f32;
                target[channel] = clamp_u8(smooth + (value - smooth) * factor);
            }
        }
    }
    out
}

pub fn grayscale(image: &RgbaImage) -> RgbaImage {
    map_rgb(image, |[r, g, b]| {
        let l = 0.299 * r + 0.587 * g + 0.114 * b;
        [l, l, l]
    })
}

/// Classic sepia color matrix
pub fn sepia(image: &RgbaImage) -> RgbaImage {
    map_rgb(image, |[r, g, b]| {
        [
            0.393 * r + 0.769 * g + 0.189 * b,
            0.349 * r + 0.686 * g + 0.168 * b,
            0.272 * r + 0.534 * g + 0.131 * b,
        ]
    })
}

pub fn gaussian_blur(image: &RgbaImage, sigma: f32) -> RgbaImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    imageops::blur(image, sigma)
}

/// Contrast-limited adaptive histogram equalization on luma only.
///
/// The luma delta is added to all three channels, which keeps the chroma
/// components of the YCbCr representation unchanged.
pub fn clahe_luma(image: &RgbaImage, clip_limit: f32, tiles: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tile_w = width.div_ceil(tiles.clamp(1, width));
    let tile_h = height.div_ceil(tiles.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let lumas: Vec<f32> = image.pixels().map(luma).collect();
    let bins: Vec<u8> = lumas.iter().map(|l| clamp_u8(*l)).collect();

    let mut luts = vec![[0u8; 256]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let (x0, x1) = (tx * tile_w, ((tx + 1) * tile_w).min(width));
            let (y0, y1) = (ty * tile_h, ((ty + 1) * tile_h).min(height));

            let mut histogram = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[bins[(y * width + x) as usize] as usize] += 1;
                }
            }

            let count = (x1 - x0) * (y1 - y0);
            let limit = ((clip_limit * count as f32 / 256.0).ceil() as u32).max(1);
            let mut excess = 0u32;
            for bin in histogram.iter_mut() {
                if *bin > limit {
                    excess += *bin - limit;
                    *bin = limit;
                }
            }

            // Spread the clipped mass evenly, leftovers at a regular stride
            let bonus = excess / 256;
            let mut remainder = excess % 256;
            let stride = if remainder > 0 { (256 / remainder).max(1) } else { 1 };
            for (value, bin) in histogram.iter_mut().enumerate() {
                *bin += bonus;
                if remainder > 0 && value as u32 % stride == 0 {
                    *bin += 1;
                    remainder -= 1;
                }
            }

            let lut = &mut luts[(ty * tiles_x + tx) as usize];
            let mut cdf = 0u32;
            for (value, bin) in histogram.iter().enumerate() {
                cdf += bin;
                lut[value] = clamp_u8(cdf as f32 * 255.0 / count as f32);
            }
        }
    }

    // Bilinear blend between the four nearest tile centres
    let tile_coord = |pos: u32, size: u32, count: u32| {
        let f = (pos as f32 + 0.5) / size as f32 - 0.5;
        let t0 = (f.floor().max(0.0) as u32).min(count - 1);
        let t1 = (t0 + 1).min(count - 1);
        let weight = (f - t0 as f32).clamp(0.0, 1.0);
        (t0, t1, weight)
    };

    let mut out = image.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let index = (y * width + x) as usize;
        let bin = bins[index] as usize;
        let (tx0, tx1, ax) = tile_coord(x, tile_w, tiles_x);
        let (ty0, ty1, ay) = tile_coord(y, tile_h, tiles_y);
        let lookup = |tx: u32, ty: u32| luts[(ty * tiles_x + tx) as usize][bin] as f32;

        let top = lookup(tx0, ty0) * (1.0 - ax) + lookup(tx1, ty0) * ax;
        let bottom = lookup(tx0, ty1) * (1.0 - ax) + lookup(tx1, ty1) * ax;
        let mapped = top * (1.0 - ay) + bottom * ay;

        let delta = mapped - lumas[index];
        for channel in 0..3 {
            pixel[channel] = clamp_u8(pixel[channel] as f32 + delta);
        }
    }
    out
}

/// Edge-preserving smoothing: each pixel becomes a neighbourhood average
/// weighted by both distance and color similarity.
pub fn bilateral(image: &RgbaImage, radius: u32, sigma_space: f32, sigma_color: f32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if radius == 0 || width == 0 || height == 0 {
        return image.clone();
    }

    let r = radius as i32;
    let side = (2 * r + 1) as usize;
    let mut spatial = vec![0.0f32; side * side];
    for dy in -r..=r {
        for dx in -r..=r {
            let d2 = (dx * dx + dy * dy) as f32;
            spatial[((dy + r) as usize) * side + (dx + r) as usize] =
                (-d2 / (2.0 * sigma_space * sigma_space)).exp();
        }
    }

    // Indexed by rounded euclidean RGB distance, max sqrt(3 * 255^2) < 442
    let color_weights: Vec<f32> = (0..442)
        .map(|d| {
            let d = d as f32;
            (-(d * d) / (2.0 * sigma_color * sigma_color)).exp()
        })
        .collect();

    let mut out = image.clone();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let centre = image.get_pixel(x as u32, y as u32);
            let mut acc = [0.0f32; 3];
            let mut total = 0.0f32;

            for dy in -r..=r {
                let ny = y + dy;
                if ny < 0 || ny >= height as i32 {
                    continue;
                }
                for dx in -r..=r {
                    let nx = x + dx;
                    if nx < 0 || nx >= width as i32 {
                        continue;
                    }
                    let neighbour = image.get_pixel(nx as u32, ny as u32);
                    let distance = (0..3)
                        .map(|c| {
                            let d = neighbour[c] as f32 - centre[c] as f32;
                            d * d
                        })
                        .sum::<f32>()
                        .sqrt()
                        .round() as usize;

                    let weight = spatial[((dy + r) as usize) * side + (dx + r) as usize]
                        * color_weights[distance.min(color_weights.len() - 1)];
                    for c in 0..3 {
                        acc[c] += neighbour[c] as f32 * weight;
                    }
                    total += weight;
                }
            }

            let target = out.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                target[c] = clamp_u8(acc[c] / total);
            }
        }
    }
    out
}

/// Rotate counter-clockwise by `degrees`, growing the canvas to the rotated
/// bounding box. Uncovered area takes `fill`; sampling is bilinear on
/// premultiplied values so transparent seams do not bleed color.
pub fn rotate_expand(image: &RgbaImage, degrees: f32, fill: Rgba<u8>) -> RgbaImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as f32, height as f32);
    let (sin, cos) = degrees.to_radians().sin_cos();

    // Trim float noise so a right angle does not gain a pixel
    let new_w = (w * cos.abs() + h * sin.abs() - 1e-3).ceil().max(1.0) as u32;
    let new_h = (w * sin.abs() + h * cos.abs() - 1e-3).ceil().max(1.0) as u32;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (ncx, ncy) = (new_w as f32 / 2.0, new_h as f32 / 2.0);

    let sample = |sx: i64, sy: i64| -> Rgba<u8> {
        if sx < 0 || sy < 0 || sx >= width as i64 || sy >= height as i64 {
            fill
        } else {
            *image.get_pixel(sx as u32, sy as u32)
        }
    };

    RgbaImage::from_fn(new_w, new_h, |x, y| {
        let dx = x as f32 + 0.5 - ncx;
        let dy = y as f32 + 0.5 - ncy;
        let fx = cos * dx - sin * dy + cx - 0.5;
        let fy = sin * dx + cos * dy + cy - 0.5;

        let (x0, y0) = (fx.floor(), fy.floor());
        let (ax, ay) = (fx - x0, fy - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let taps = [
            (sample(x0, y0), (1.0 - ax) * (1.0 - ay)),
            (sample(x0 + 1, y0), ax * (1.0 - ay)),
            (sample(x0, y0 + 1), (1.0 - ax) * ay),
            (sample(x0 + 1, y0 + 1), ax * ay),
        ];

        let mut premul = [0.0f32; 3];
        let mut alpha = 0.0f32;
        for (pixel, weight) in taps {
            let a = pixel[3] as f32 / 255.0 * weight;
            for c in 0..3 {
                premul[c] += pixel[c] as f32 * a;
            }
            alpha += a;
        }

        if alpha <= f32::EPSILON {
            return fill;
        }
        Rgba([
            clamp_u8(premul[0] / alpha),
            clamp_u8(premul[1] / alpha),
            clamp_u8(premul[2] / alpha),
            clamp_u8(alpha * 255.0),
        ])
    })
}

/// Extract the alpha channel
pub fn alpha_mask(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[3]])
    })
}

const FAR: f64 = 1e20;

// One-dimensional squared distance transform (Felzenszwalb & Huttenlocher)
fn distance_transform_1d(f: &[f64], out: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }

    let intersect = |q: usize, p: usize| {
        ((f[q] + (q * q) as f64) - (f[p] + (p * p) as f64)) / (2.0 * q as f64 - 2.0 * p as f64)
    };

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, slot) in out.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let d = q as f64 - v[k] as f64;
        *slot = d * d + f[v[k]];
    }
}

/// Grow the opaque region of `mask` by `radius` pixels (Euclidean). Pixels
/// within `radius` are fully covered, the next pixel out is anti-aliased.
pub fn dilate(mask: &GrayImage, radius: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return mask.clone();
    }

    let mut grid: Vec<f64> = mask
        .pixels()
        .map(|p| if p[0] >= 128 { 0.0 } else { FAR })
        .collect();

    let longest = w.max(h);
    let mut line = vec![0.0f64; longest];
    let mut out = vec![0.0f64; longest];
    let mut v = vec![0usize; longest];
    let mut z = vec![0.0f64; longest + 1];

    for x in 0..w {
        for y in 0..h {
            line[y] = grid[y * w + x];
        }
        distance_transform_1d(&line[..h], &mut out[..h], &mut v, &mut z);
        for y in 0..h {
            grid[y * w + x] = out[y];
        }
    }

    for y in 0..h {
        line[..w].copy_from_slice(&grid[y * w..(y + 1) * w]);
        distance_transform_1d(&line[..w], &mut out[..w], &mut v, &mut z);
        grid[y * w..(y + 1) * w].copy_from_slice(&out[..w]);
    }

    let reach = radius as f64 + 1.0;
    GrayImage::from_fn(width, height, |x, y| {
        let distance = grid[y as usize * w + x as usize].sqrt();
        let coverage = (reach - distance).clamp(0.0, 1.0);
        Luma([(coverage * 255.0).round() as u8])
    })
}

/// Surround `image` with `pad` transparent pixels on every side
pub fn pad_transparent(image: &RgbaImage, pad: u32) -> RgbaImage {
    let mut padded = RgbaImage::from_pixel(
        image.width() + pad * 2,
        image.height() + pad * 2,
        Rgba([0, 0, 0, 0]),
    );
    imageops::overlay(&mut padded, image, pad as i64, pad as i64);
    padded
}
