//! End-to-end composition scenarios.

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, Rgba, RgbaImage};
use rand::{rngs::StdRng, SeedableRng};

use mood_collage::{
    color::Color,
    composition::canvas,
    config::{Config, PipelineConfig},
    error::StageError,
    pipeline::{stages, Stage, StageContext, StageResult},
    template::{self, Background, Layout},
    CompositionEngine,
};

fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let photo = RgbaImage::from_fn(width, height, |x, y| {
        // A faint pattern so the backdrop is not perfectly uniform
        let wobble = ((x + y) % 3) as u8;
        Rgba([
            color[0].saturating_sub(wobble),
            color[1].saturating_add(wobble),
            color[2],
            color[3],
        ])
    });
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(photo.as_raw(), width, height, ColorType::Rgba8)
        .unwrap();
    bytes
}

fn count_pixels(canvas: &RgbaImage, region: (u32, u32, u32, u32), color: Rgba<u8>) -> usize {
    let (x0, y0, x1, y1) = region;
    (y0..y1.min(canvas.height()))
        .flat_map(|y| (x0..x1.min(canvas.width())).map(move |x| (x, y)))
        .filter(|&(x, y)| *canvas.get_pixel(x, y) == color)
        .count()
}

struct BrokenFilter;

impl Stage for BrokenFilter {
    fn name(&self) -> &str {
        stages::FILTER
    }

    fn description(&self) -> &str {
        "Fails on every photo"
    }

    fn apply(&self, _image: &RgbaImage, _context: &mut StageContext<'_>) -> StageResult {
        Err(StageError::recoverable(stages::FILTER, "injected failure"))
    }
}

#[test]
fn magazine_with_three_photos() {
    let engine = CompositionEngine::new(Config::default());
    let template = template::select("Editorial magazine look", 3);
    let photos = vec![
        png_bytes(64, 48, [200, 40, 40, 255]),
        png_bytes(52, 60, [40, 160, 60, 255]),
        png_bytes(50, 50, [40, 60, 180, 255]),
    ];
    let palette = mood_collage::color::parse_palette(&["#FFFFFF", "#000000"]);
    assert_eq!(palette.len(), 2);

    let composition = engine
        .compose(&photos, &template, &palette, &mut StdRng::seed_from_u64(11))
        .unwrap();

    assert_eq!(composition.canvas.dimensions(), (3000, 4000));
    assert!(composition.skipped.is_empty());

    // z 1, 4, 5 for slots 0, 2, 1
    let order: Vec<usize> = composition.layers.iter().map(|l| l.slot).collect();
    assert_eq!(order, vec![0, 2, 1]);

    // Headline in white over the hero photo
    let headline = count_pixels(
        &composition.canvas,
        (150, 150, 2200, 520),
        Rgba([255, 255, 255, 255]),
    );
    assert!(headline > 500, "headline pixels: {}", headline);

    // Caption in dark slate above the right-hand photo
    let caption = count_pixels(
        &composition.canvas,
        (1550, 2300, 3000, 2460),
        Rgba([0x2D, 0x34, 0x36, 255]),
    );
    assert!(caption > 100, "caption pixels: {}", caption);

    let png = composition.to_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3000, 4000));
}

#[test]
fn doodle_with_four_photos_uses_three_slots() {
    let engine = CompositionEngine::new(Config::default());
    let template = template::select("something fun and playful", 4);
    assert_eq!(template.name, "Doodle");
    assert_eq!(template.placements.len(), 3);

    let photos: Vec<Vec<u8>> = (0..4)
        .map(|i| png_bytes(40 + i * 4, 40, [220, 100 + i as u8 * 20, 90, 255]))
        .collect();
    let palette = vec![Color::from_u32(0x48DBFB), Color::from_u32(0xFF6B6B)];

    let composition = engine
        .compose(&photos, &template, &palette, &mut StdRng::seed_from_u64(5))
        .unwrap();

    assert_eq!(composition.canvas.dimensions(), (3000, 3000));
    assert_eq!(composition.layers.len(), 3);
    assert!(composition.layers.iter().all(|l| l.slot < 3));

    // Heart keeps its own color
    let heart = count_pixels(
        &composition.canvas,
        (2300, 300, 2850, 850),
        Rgba([0xFF, 0x6B, 0x6B, 255]),
    );
    assert!(heart > 1000, "heart pixels: {}", heart);

    // Uncolored squiggle picks up the first palette entry
    let squiggle = count_pixels(
        &composition.canvas,
        (1100, 150, 1900, 500),
        Rgba([0x48, 0xDB, 0xFB, 255]),
    );
    assert!(squiggle > 1000, "squiggle pixels: {}", squiggle);
}

#[test]
fn undecodable_photos_still_render_background_and_decorations() {
    let mut config = Config::default();
    config.composition.seed = Some(3);
    let engine = CompositionEngine::new(config);

    let photos = vec![b"not a jpeg".to_vec(), Vec::new()];
    let png = engine
        .create_collage(&photos, "retro film roll", &["#E67E22"], "Nostalgia")
        .unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (3000, 4200));
    // Black filmstrip background where the photos would have been
    let middle = decoded.get_pixel(1500, 800);
    assert!(middle[0] < 20 && middle[1] < 20 && middle[2] < 20);

    let decoded = image::DynamicImage::ImageRgb8(decoded).to_rgba8();
    let scene = count_pixels(&decoded, (200, 4100, 1200, 4200), Rgba([255, 255, 255, 255]));
    assert!(scene > 500, "scene label pixels: {}", scene);
    let stock = count_pixels(&decoded, (2300, 4100, 3000, 4200), Rgba([0xE6, 0x7E, 0x22, 255]));
    assert!(stock > 500, "film stock label pixels: {}", stock);
}

#[test]
fn failing_filter_keeps_photo_at_its_placement() {
    let mut config = Config::default();
    config.composition.texture_opacity = 0.0;
    let mut engine = CompositionEngine::new(config);
    assert!(engine.pipeline_mut().replace_stage(Box::new(BrokenFilter)));

    // Filmstrip slot 1 is vintage, unrotated and shadowless
    let template = template::select("film", 2);
    assert_eq!(template.placements[1].y, 1500);

    let photos = vec![
        png_bytes(260, 120, [40, 40, 200, 255]),
        png_bytes(260, 120, [255, 0, 0, 255]),
    ];
    let composition = engine
        .compose(&photos, &template, &[], &mut StdRng::seed_from_u64(1))
        .unwrap();

    assert_eq!(composition.layers.len(), 2);
    for layer in &composition.layers {
        assert_eq!(layer.recovered_stages, vec!["filter".to_string()]);
    }

    let slot = &composition.layers[1];
    assert_eq!((slot.x, slot.y), (200, 1500));
    assert_eq!((slot.width, slot.height), (2600, 1200));

    // Still red: sepia would have pulled green up towards red
    let centre = composition.canvas.get_pixel(1500, 2100);
    assert!(centre[0] > 200 && centre[1] < 80 && centre[2] < 80, "{:?}", centre);

    // Just outside the slot the background is untouched
    assert_eq!(composition.canvas.get_pixel(150, 1450).0, [0, 0, 0, 255]);
}

#[test]
fn gradient_background_runs_top_to_bottom() {
    let template = Layout::Doodle.template(0);
    let Background::Gradient { top, bottom } = template.background else {
        panic!("doodle layout should use a gradient");
    };

    let canvas = canvas::create_background(template.canvas_width, template.canvas_height, &template.background);
    let last = template.canvas_height - 1;
    assert_eq!(*canvas.get_pixel(0, 0), top.rgba());
    assert_eq!(*canvas.get_pixel(1234, last), bottom.rgba());

    // Green falls monotonically from F9 to EB
    let greens: Vec<u8> = (0..template.canvas_height)
        .step_by(100)
        .map(|y| canvas.get_pixel(10, y)[1])
        .collect();
    assert!(greens.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn resize_to_fit_respects_box_and_aspect() {
    let config = PipelineConfig::default();
    let cases = [(640, 480, 300, 300), (90, 160, 1200, 900), (1000, 10, 50, 50)];

    for (width, height, box_width, box_height) in cases {
        let photo = RgbaImage::from_pixel(width, height, Rgba([120, 120, 120, 255]));
        let fitted = stages::resize_to_fit(&photo, box_width, box_height, &config);
        let (w, h) = fitted.dimensions();

        assert!(w <= box_width && h <= box_height);
        assert!(w == box_width || h == box_height);

        let expected = width as f64 / height as f64;
        let actual = w as f64 / h as f64;
        // Rounding to whole pixels moves the ratio by at most one pixel's worth
        assert!((expected - actual).abs() <= expected / h as f64 + 1.0 / h as f64);
    }
}

#[test]
fn every_layout_trims_to_photo_count() {
    for layout in Layout::ALL {
        for photos in 0..7 {
            let template = layout.template(photos);
            assert_eq!(template.placements.len(), photos.min(layout.capacity()));
        }
    }
}
