use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    color::{parse_palette, Color},
    config::Config,
    decoration::DecorationRenderer,
    error::{EncodeError, Result},
    pipeline::{BorderKeySegmenter, PhotoLayer, PhotoPipeline, Segmenter},
    template::{self, Placement, Template},
};

use super::{analysis::StyleAnalysis, canvas};

/// Where one processed photo ended up on the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub slot: usize,
    pub z_index: i32,
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// Stages that failed softly for this photo
    pub recovered_stages: Vec<String>,
}

impl From<&PhotoLayer> for LayerInfo {
    fn from(layer: &PhotoLayer) -> Self {
        let (x, y) = layer.position();
        Self {
            slot: layer.slot,
            z_index: layer.placement.z_index,
            x,
            y,
            width: layer.image.width(),
            height: layer.image.height(),
            recovered_stages: layer
                .recovered
                .iter()
                .map(|err| err.stage().to_string())
                .collect(),
        }
    }
}

/// A composed collage before flattening and encoding
#[derive(Debug, Clone)]
pub struct Composition {
    pub template: Template,
    pub canvas: image::RgbaImage,

    /// Pasted layers, bottom to top
    pub layers: Vec<LayerInfo>,

    /// Slots whose photo could not be decoded or processed
    pub skipped: Vec<usize>,
}

impl Composition {
    /// Flatten over white and encode as PNG
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let flat = canvas::flatten(&self.canvas);
        Ok(canvas::encode_png(&flat)?)
    }
}

/// Stable sort by `z_index`; equal depths keep their slot order
pub fn stack_layers(layers: &mut [PhotoLayer]) {
    layers.sort_by_key(|layer| layer.placement.z_index);
}

/// Main composition engine that turns photos and a style into a collage
///
/// The engine follows a clear pipeline:
/// 1. Template Selection - Pick a layout from the style label
/// 2. Background - Paint the canvas
/// 3. Photo Processing - Run every photo through its slot's effect chain
/// 4. Layering - Stack processed photos by depth and paste them
/// 5. Finishing - Paper grain and decorations
/// 6. Output - Flatten and encode PNG
pub struct CompositionEngine {
    config: Config,
    pipeline: PhotoPipeline,
    decorations: DecorationRenderer,
    pool: Option<rayon::ThreadPool>,
}

impl CompositionEngine {
    /// Create an engine using the built-in border-key segmenter
    pub fn new(config: Config) -> Self {
        Self::with_segmenter(config, Arc::new(BorderKeySegmenter::default()))
    }

    /// Create an engine with a custom background-removal collaborator
    pub fn with_segmenter(config: Config, segmenter: Arc<dyn Segmenter>) -> Self {
        let pipeline = PhotoPipeline::with_segmenter(config.pipeline.clone(), segmenter);
        let decorations = DecorationRenderer::new(config.decoration.clone());

        let pool = if config.pipeline.parallel {
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.pipeline.processing_threads)
                .thread_name(|index| format!("collage-worker-{}", index))
                .build()
                .map_err(|e| warn!("Falling back to the global thread pool: {}", e))
                .ok()
        } else {
            None
        };

        Self {
            config,
            pipeline,
            decorations,
            pool,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the photo pipeline, e.g. to replace a stage
    pub fn pipeline_mut(&mut self) -> &mut PhotoPipeline {
        &mut self.pipeline
    }

    /// Full request: select a template for `style` and render a PNG.
    ///
    /// `emotion` is accepted for callers that carry it but does not influence
    /// rendering. Palette entries that are not hex colors are ignored.
    pub fn create_collage<B, S>(
        &self,
        photos: &[B],
        style: &str,
        palette: &[S],
        emotion: &str,
    ) -> Result<Vec<u8>>
    where
        B: AsRef<[u8]> + Sync,
        S: AsRef<str>,
    {
        info!("🎨 Creating collage for {} photo(s)", photos.len());
        info!("   Style: {}", style);
        debug!("   Emotion: {} (not used for rendering)", emotion);

        let template = template::select(style, photos.len());
        let palette = parse_palette(palette);
        let mut rng = self.request_rng();

        self.render_png(photos, &template, &palette, &mut rng)
    }

    /// Same as [`create_collage`](Self::create_collage) with fields taken from
    /// an upstream style analysis
    pub fn compose_from_analysis<B>(&self, photos: &[B], analysis: &StyleAnalysis) -> Result<Vec<u8>>
    where
        B: AsRef<[u8]> + Sync,
    {
        self.create_collage(
            photos,
            &analysis.collage_style,
            &analysis.color_palette,
            &analysis.dominant_emotion,
        )
    }

    /// Compose and encode in one step
    pub fn render_png<B>(
        &self,
        photos: &[B],
        template: &Template,
        palette: &[Color],
        rng: &mut StdRng,
    ) -> Result<Vec<u8>>
    where
        B: AsRef<[u8]> + Sync,
    {
        let composition = self.compose(photos, template, palette, rng)?;

        // ==========================================
        // STEP 6: OUTPUT
        // ==========================================
        let png = composition.to_png()?;
        info!("🎉 Collage complete: {} bytes of PNG", png.len());
        Ok(png)
    }

    /// Build the collage canvas for a template.
    ///
    /// Photos pair with placements by index; extra photos or extra placements
    /// are ignored. Photos that fail to decode are skipped.
    pub fn compose<B>(
        &self,
        photos: &[B],
        template: &Template,
        palette: &[Color],
        rng: &mut StdRng,
    ) -> Result<Composition>
    where
        B: AsRef<[u8]> + Sync,
    {
        if template.canvas_width == 0 || template.canvas_height == 0 {
            return Err(EncodeError::InvalidCanvas {
                width: template.canvas_width,
                height: template.canvas_height,
            }
            .into());
        }

        info!(
            "🖼️  Composing '{}' on a {}x{} canvas",
            template.name, template.canvas_width, template.canvas_height
        );

        // ==========================================
        // STEP 2: BACKGROUND
        // ==========================================
        let mut canvas = canvas::create_background(
            template.canvas_width,
            template.canvas_height,
            &template.background,
        );

        // ==========================================
        // STEP 3: PHOTO PROCESSING
        // ==========================================
        let slot_count = photos.len().min(template.placements.len());
        let seeds: Vec<u64> = (0..slot_count).map(|_| rng.gen()).collect();
        let results = self.process_photos(photos, &template.placements[..slot_count], &seeds);

        let mut layers = Vec::with_capacity(slot_count);
        let mut skipped = Vec::new();
        for (slot, result) in results.into_iter().enumerate() {
            match result {
                Ok(layer) => layers.push(layer),
                Err(err) => {
                    warn!("Skipping slot {}: {}", slot, err);
                    skipped.push(slot);
                }
            }
        }
        info!(
            "   Processed {} photo(s), skipped {}",
            layers.len(),
            skipped.len()
        );

        // ==========================================
        // STEP 4: LAYERING
        // ==========================================
        stack_layers(&mut layers);
        canvas::paste_layers(&mut canvas, &layers);
        for layer in &layers {
            debug!(
                "   slot {} at {:?}, z {}",
                layer.slot,
                layer.position(),
                layer.placement.z_index
            );
        }

        // ==========================================
        // STEP 5: FINISHING
        // ==========================================
        let composition_config = &self.config.composition;
        canvas::apply_texture(
            &mut canvas,
            composition_config.texture_opacity,
            composition_config.texture_noise_max,
            rng,
        );
        self.decorations
            .render(&mut canvas, &template.decorations, palette, rng);
        debug!("   Drew {} decoration(s)", template.decorations.len());

        Ok(Composition {
            template: template.clone(),
            canvas,
            layers: layers.iter().map(LayerInfo::from).collect(),
            skipped,
        })
    }

    /// Run the pipeline for each slot, in parallel when configured.
    ///
    /// Results come back in slot order regardless of scheduling, and every
    /// slot owns an RNG seeded up front, so the output does not depend on
    /// thread timing.
    fn process_photos<B>(
        &self,
        photos: &[B],
        placements: &[Placement],
        seeds: &[u64],
    ) -> Vec<Result<PhotoLayer>>
    where
        B: AsRef<[u8]> + Sync,
    {
        let pipeline = &self.pipeline;
        let run = |slot: usize| {
            let mut rng = StdRng::seed_from_u64(seeds[slot]);
            pipeline.process(slot, photos[slot].as_ref(), &placements[slot], &mut rng)
        };

        if !self.config.pipeline.parallel || placements.len() < 2 {
            return (0..placements.len()).map(run).collect();
        }

        debug!("Processing {} photos in parallel", placements.len());
        match &self.pool {
            Some(pool) => pool.install(|| (0..placements.len()).into_par_iter().map(run).collect()),
            None => (0..placements.len()).into_par_iter().map(run).collect(),
        }
    }

    /// RNG for one request: fixed when the config carries a seed
    fn request_rng(&self) -> StdRng {
        match self.config.composition.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Background, FrameStyle};
    use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let photo = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(photo.as_raw(), width, height, ColorType::Rgba8)
            .unwrap();
        bytes
    }

    fn small_template(placements: Vec<Placement>) -> Template {
        Template {
            name: "Test".to_string(),
            canvas_width: 200,
            canvas_height: 160,
            background: Background::Solid { color: Color::WHITE },
            placements,
            decorations: Vec::new(),
        }
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.composition.texture_opacity = 0.0;
        config
    }

    fn layer(slot: usize, z_index: i32) -> PhotoLayer {
        PhotoLayer {
            slot,
            image: RgbaImage::new(1, 1),
            placement: Placement::new(0, 0, 1, 1).z(z_index),
            origin_shift: (0, 0),
            recovered: Vec::new(),
        }
    }

    #[test]
    fn test_stack_layers_is_stable() {
        let mut layers = vec![layer(0, 3), layer(1, 1), layer(2, 3), layer(3, 1), layer(4, 2)];
        stack_layers(&mut layers);
        let order: Vec<usize> = layers.iter().map(|l| l.slot).collect();
        assert_eq!(order, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_higher_z_is_drawn_on_top() {
        let engine = CompositionEngine::new(quiet_config());
        let template = small_template(vec![
            Placement::new(20, 20, 80, 80).z(2).without_shadow(),
            Placement::new(60, 60, 80, 80).z(1).without_shadow(),
        ]);
        let photos = vec![png_bytes(40, 40, [200, 0, 0, 255]), png_bytes(40, 40, [0, 0, 200, 255])];

        let composition = engine
            .compose(&photos, &template, &[], &mut StdRng::seed_from_u64(1))
            .unwrap();

        let order: Vec<usize> = composition.layers.iter().map(|l| l.slot).collect();
        assert_eq!(order, vec![1, 0]);
        // Overlap shows the first photo, which sits higher
        let overlap = composition.canvas.get_pixel(80, 80);
        assert!(overlap[0] > overlap[2]);
    }

    #[test]
    fn test_undecodable_photo_is_skipped() {
        let engine = CompositionEngine::new(quiet_config());
        let template = small_template(vec![
            Placement::new(0, 0, 50, 50),
            Placement::new(100, 0, 50, 50).frame(FrameStyle::Border),
        ]);
        let photos = vec![b"garbage".to_vec(), png_bytes(30, 30, [10, 200, 10, 255])];

        let composition = engine
            .compose(&photos, &template, &[], &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(composition.skipped, vec![0]);
        assert_eq!(composition.layers.len(), 1);
        assert_eq!(composition.layers[0].slot, 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let photos = vec![
            png_bytes(30, 20, [200, 60, 60, 255]),
            png_bytes(20, 30, [60, 200, 60, 255]),
            png_bytes(25, 25, [60, 60, 200, 255]),
        ];
        let template = small_template(vec![
            Placement::new(10, 10, 60, 60).random_rotation(),
            Placement::new(70, 30, 60, 60).random_rotation().z(2),
            Placement::new(120, 60, 60, 60).random_rotation().z(1),
        ]);

        let render = |parallel: bool| {
            let mut config = Config::default();
            config.pipeline.parallel = parallel;
            config.pipeline.processing_threads = 3;
            CompositionEngine::new(config)
                .compose(&photos, &template, &[], &mut StdRng::seed_from_u64(42))
                .unwrap()
                .canvas
        };
        assert_eq!(render(true), render(false));
    }

    #[test]
    fn test_zero_sized_canvas_is_rejected() {
        let engine = CompositionEngine::new(quiet_config());
        let mut template = small_template(Vec::new());
        template.canvas_width = 0;
        let photos: Vec<Vec<u8>> = Vec::new();
        assert!(engine
            .compose(&photos, &template, &[], &mut StdRng::seed_from_u64(1))
            .is_err());
    }

    #[test]
    fn test_seeded_requests_are_reproducible() {
        let mut config = Config::default();
        config.composition.seed = Some(7);
        let engine = CompositionEngine::new(config);
        let photos = vec![png_bytes(16, 16, [120, 80, 40, 255])];

        let first = engine.create_collage(&photos, "doodle", &["#FF6B6B"], "Joy").unwrap();
        let second = engine.create_collage(&photos, "doodle", &["#FF6B6B"], "Calm").unwrap();
        assert_eq!(first, second);
    }
}
