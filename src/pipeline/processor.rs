use std::sync::Arc;

use image::RgbaImage;
use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

use crate::{
    config::PipelineConfig,
    error::{DecodeError, Result, StageError},
    template::Placement,
};

use super::{
    segment::{BorderKeySegmenter, Segmenter},
    stages::{
        CutoutStage, FilterStage, FrameStage, GradeStage, OutlineStage, ResizeStage, RotateStage,
        ShadowStage,
    },
    traits::{Stage, StageContext},
};

/// A processed photo ready to be pasted onto the canvas
#[derive(Debug, Clone)]
pub struct PhotoLayer {
    /// Index of the placement (and the input photo) this layer belongs to
    pub slot: usize,

    pub image: RgbaImage,
    pub placement: Placement,

    /// Padding added by outline and shadow; the layer is pasted this far up
    /// and left of the placement so the photo itself lands on (x, y)
    pub origin_shift: (i32, i32),

    /// Stages that failed softly and were skipped
    pub recovered: Vec<StageError>,
}

impl PhotoLayer {
    /// Canvas position of the layer's top-left corner
    pub fn position(&self) -> (i64, i64) {
        (
            self.placement.x as i64 - self.origin_shift.0 as i64,
            self.placement.y as i64 - self.origin_shift.1 as i64,
        )
    }
}

/// Decodes and transforms one photo for one placement
pub struct PhotoPipeline {
    config: PipelineConfig,
    stages: Vec<Box<dyn Stage>>,
}

impl PhotoPipeline {
    /// Pipeline with the built-in border-key segmenter
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_segmenter(config, Arc::new(BorderKeySegmenter::default()))
    }

    pub fn with_segmenter(config: PipelineConfig, segmenter: Arc<dyn Segmenter>) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(CutoutStage::new(segmenter)),
            Box::new(GradeStage::new()),
            Box::new(ResizeStage::new()),
            Box::new(FilterStage::new()),
            Box::new(FrameStage::new()),
            Box::new(RotateStage::new()),
            Box::new(OutlineStage::new()),
            Box::new(ShadowStage::new()),
        ];

        Self { config, stages }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Names of the stages, in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Swap in a stage with the same name. Returns false if no stage matched.
    pub fn replace_stage(&mut self, stage: Box<dyn Stage>) -> bool {
        match self.stages.iter().position(|s| s.name() == stage.name()) {
            Some(index) => {
                self.stages[index] = stage;
                true
            }
            None => false,
        }
    }

    /// Decode raw bytes into straight-alpha RGBA
    pub fn decode(index: usize, bytes: &[u8]) -> std::result::Result<RgbaImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty { index });
        }

        image::load_from_memory(bytes)
            .map(|decoded| decoded.to_rgba8())
            .map_err(|e| DecodeError::Unreadable {
                index,
                reason: e.to_string(),
            })
    }

    /// Decode and run every applicable stage.
    ///
    /// A recoverable stage error keeps the image as it was before that stage
    /// and processing continues; a fatal one drops the photo.
    pub fn process(
        &self,
        slot: usize,
        bytes: &[u8],
        placement: &Placement,
        rng: &mut StdRng,
    ) -> Result<PhotoLayer> {
        let decoded = Self::decode(slot, bytes)?;
        debug!(
            "Photo {}: decoded {}x{}",
            slot,
            decoded.width(),
            decoded.height()
        );

        let mut context = StageContext {
            placement,
            config: &self.config,
            rng,
            is_cutout: false,
            origin_shift: (0, 0),
        };

        let mut image = decoded;
        let mut recovered = Vec::new();

        for stage in &self.stages {
            if !stage.applies_to(&context) {
                trace!("Photo {}: skipping {}", slot, stage.name());
                continue;
            }

            match stage.apply(&image, &mut context) {
                Ok(next) => {
                    trace!(
                        "Photo {}: {} -> {}x{}",
                        slot,
                        stage.name(),
                        next.width(),
                        next.height()
                    );
                    image = next;
                }
                Err(err) if err.is_fatal() => {
                    warn!("Photo {} dropped: {}", slot, err);
                    return Err(err.into());
                }
                Err(err) => {
                    warn!("Photo {}: {}, continuing without it", slot, err);
                    recovered.push(err);
                }
            }
        }

        Ok(PhotoLayer {
            slot,
            image,
            placement: placement.clone(),
            origin_shift: context.origin_shift,
            recovered,
        })
    }
}
