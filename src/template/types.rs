use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Frame drawn around a photo after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStyle {
    #[default]
    None,
    /// Instant-photo frame with a tall bottom margin
    Polaroid,
    /// Uniform solid border
    Border,
}

/// Per-slot color filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    None,
    Vintage,
    Bw,
    Vibrant,
    Soft,
    Luxury,
    Watercolor,
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Vintage => "vintage",
            FilterKind::Bw => "bw",
            FilterKind::Vibrant => "vibrant",
            FilterKind::Soft => "soft",
            FilterKind::Luxury => "luxury",
            FilterKind::Watercolor => "watercolor",
        }
    }
}

/// Sticker-style outline that follows the cutout silhouette
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub width: u32,
    pub color: Color,
}

impl Default for Outline {
    fn default() -> Self {
        Self {
            width: 20,
            color: Color::WHITE,
        }
    }
}

/// A rectangular slot in a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,

    /// Degrees counter-clockwise; `None` picks a random tilt
    pub rotation: Option<f32>,

    pub frame: FrameStyle,
    pub filter: FilterKind,

    /// Lowest is drawn first
    pub z_index: i32,

    pub use_cutout: bool,
    pub use_outline: bool,
    pub no_shadow: bool,
    pub outline: Outline,
}

impl Placement {
    /// Create a slot with no effects at the given box
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: Some(0.0),
            frame: FrameStyle::None,
            filter: FilterKind::None,
            z_index: 0,
            use_cutout: false,
            use_outline: false,
            no_shadow: false,
            outline: Outline::default(),
        }
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn random_rotation(mut self) -> Self {
        self.rotation = None;
        self
    }

    pub fn frame(mut self, frame: FrameStyle) -> Self {
        self.frame = frame;
        self
    }

    pub fn filter(mut self, filter: FilterKind) -> Self {
        self.filter = filter;
        self
    }

    pub fn z(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn cutout(mut self) -> Self {
        self.use_cutout = true;
        self
    }

    pub fn outlined(mut self, width: u32, color: Color) -> Self {
        self.use_outline = true;
        self.outline = Outline { width, color };
        self
    }

    pub fn without_shadow(mut self) -> Self {
        self.no_shadow = true;
        self
    }
}

/// Canvas background
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    Solid { color: Color },
    /// Interpolated row by row from `top` to `bottom`
    Gradient { top: Color, bottom: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoodleShape {
    Heart,
    Star,
    Squiggle,
    Circle,
}

/// Non-photo overlay element
///
/// A `None` color resolves to the first palette entry at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decoration {
    Doodle {
        shape: DoodleShape,
        x: i32,
        y: i32,
        size: u32,
        color: Option<Color>,
    },
    Text {
        content: String,
        x: i32,
        y: i32,
        font_size: u32,
        color: Option<Color>,
    },
    WashiTape {
        x: i32,
        y: i32,
        rotation: f32,
        color: Option<Color>,
    },
    ColorSwatch {
        x: i32,
        y: i32,
    },
}

impl Decoration {
    pub fn kind(&self) -> &'static str {
        match self {
            Decoration::Doodle { .. } => "doodle",
            Decoration::Text { .. } => "text",
            Decoration::WashiTape { .. } => "washi_tape",
            Decoration::ColorSwatch { .. } => "color_swatch",
        }
    }
}

/// The complete declarative composition for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: Background,
    pub placements: Vec<Placement>,
    pub decorations: Vec<Decoration>,
}

impl Template {
    /// Drop slots beyond what the photos can fill
    pub fn truncated(mut self, photo_count: usize) -> Self {
        self.placements.truncate(photo_count);
        self
    }
}
