use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the collage engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-photo processing settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Canvas-level settings
    #[serde(default)]
    pub composition: CompositionConfig,

    /// Overlay rendering settings
    #[serde(default)]
    pub decoration: DecorationConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        self.composition.validate()?;
        self.decoration.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Photo pipeline configuration
///
/// The grading and resampling factors follow PIL `ImageEnhance` semantics:
/// 1.0 leaves the image untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CLAHE clip limit, as a multiple of the mean histogram bin
    pub clahe_clip_limit: f32,

    /// CLAHE tile grid size per axis
    pub clahe_tiles: u32,

    /// Sharpness factor applied during tone grading
    pub grade_sharpness: f32,

    /// Saturation factor applied during tone grading
    pub grade_saturation: f32,

    /// Sharpness applied before an upscale
    pub upscale_presharpen: f32,

    /// Sharpness applied after an upscale
    pub upscale_postsharpen: f32,

    /// Contrast applied after an upscale
    pub upscale_contrast: f32,

    /// Width of the `border` frame in pixels
    pub border_width: u32,

    /// Polaroid side and top margin as a fraction of photo width
    pub polaroid_side_ratio: f32,

    /// Polaroid bottom margin as a fraction of photo height
    pub polaroid_bottom_ratio: f32,

    /// Maximum tilt in degrees when a placement leaves rotation unspecified
    pub rotation_jitter: f32,

    /// Gaussian sigma of the drop shadow
    pub shadow_blur_radius: f32,

    /// Shadow offset to the lower right, in pixels
    pub shadow_offset: u32,

    /// Peak shadow alpha
    pub shadow_opacity: u8,

    /// Upper bound on one segmentation call
    pub cutout_timeout_ms: u64,

    /// Run per-photo pipelines in parallel
    pub parallel: bool,

    /// Worker threads for parallel processing
    pub processing_threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            grade_sharpness: 1.2,
            grade_saturation: 1.05,
            upscale_presharpen: 1.3,
            upscale_postsharpen: 1.15,
            upscale_contrast: 1.03,
            border_width: 10,
            polaroid_side_ratio: 0.05,
            polaroid_bottom_ratio: 0.15,
            rotation_jitter: 8.0,
            shadow_blur_radius: 15.0,
            shadow_offset: 10,
            shadow_opacity: 65,
            cutout_timeout_ms: 10_000,
            parallel: true,
            processing_threads: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if self.clahe_clip_limit < 1.0 {
            return Err(invalid("pipeline.clahe_clip_limit", self.clahe_clip_limit).into());
        }

        if self.clahe_tiles == 0 {
            return Err(invalid("pipeline.clahe_tiles", self.clahe_tiles).into());
        }

        let factors = [
            ("pipeline.grade_sharpness", self.grade_sharpness),
            ("pipeline.grade_saturation", self.grade_saturation),
            ("pipeline.upscale_presharpen", self.upscale_presharpen),
            ("pipeline.upscale_postsharpen", self.upscale_postsharpen),
            ("pipeline.upscale_contrast", self.upscale_contrast),
        ];
        for (key, value) in factors {
            if !(0.0..=4.0).contains(&value) {
                return Err(invalid(key, value).into());
            }
        }

        for (key, value) in [
            ("pipeline.polaroid_side_ratio", self.polaroid_side_ratio),
            ("pipeline.polaroid_bottom_ratio", self.polaroid_bottom_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(key, value).into());
            }
        }

        if !(0.0..=45.0).contains(&self.rotation_jitter) {
            return Err(invalid("pipeline.rotation_jitter", self.rotation_jitter).into());
        }

        if self.shadow_blur_radius < 0.0 {
            return Err(invalid("pipeline.shadow_blur_radius", self.shadow_blur_radius).into());
        }

        if self.shadow_offset as f32 > self.shadow_blur_radius * 2.0 {
            return Err(invalid(
                "pipeline.shadow_offset",
                format!("{} (must fit inside 2x blur radius)", self.shadow_offset),
            )
            .into());
        }

        if self.processing_threads == 0 {
            return Err(invalid("pipeline.processing_threads", self.processing_threads).into());
        }

        Ok(())
    }
}

/// Canvas composition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Blend weight of the paper-grain texture
    pub texture_opacity: f32,

    /// Noise samples are drawn from `0..texture_noise_max`
    pub texture_noise_max: u8,

    /// Fixed seed for reproducible renders
    pub seed: Option<u64>,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            texture_opacity: 0.045,
            texture_noise_max: 50,
            seed: None,
        }
    }
}

impl CompositionConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.texture_opacity) {
            return Err(invalid("composition.texture_opacity", self.texture_opacity).into());
        }

        if self.texture_noise_max == 0 {
            return Err(invalid("composition.texture_noise_max", self.texture_noise_max).into());
        }

        Ok(())
    }
}

/// Decoration rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    /// Preferred TrueType font for text decorations
    pub font_path: Option<PathBuf>,

    /// Fonts tried, in order, when `font_path` is missing or unreadable
    pub system_fonts: Vec<PathBuf>,

    pub tape_width: u32,
    pub tape_height: u32,
    pub tape_alpha: u8,

    pub swatch_size: u32,
    pub swatch_spacing: u32,

    /// Alpha of the black text drop shadow
    pub text_shadow_alpha: u8,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            system_fonts: [
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
                "/Library/Fonts/Arial.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
                "C:\\Windows\\Fonts\\arial.ttf",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            tape_width: 360,
            tape_height: 90,
            tape_alpha: 170,
            swatch_size: 120,
            swatch_spacing: 30,
            text_shadow_alpha: 80,
        }
    }
}

impl DecorationConfig {
    fn validate(&self) -> Result<()> {
        if self.tape_width == 0 || self.tape_height == 0 {
            return Err(invalid(
                "decoration.tape_size",
                format!("{}x{}", self.tape_width, self.tape_height),
            )
            .into());
        }

        if self.swatch_size == 0 {
            return Err(invalid("decoration.swatch_size", self.swatch_size).into());
        }

        Ok(())
    }
}
