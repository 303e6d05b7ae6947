use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::template::types::{
    Background, Decoration, DoodleShape, FilterKind, FrameStyle, Placement, Template,
};

/// The built-in layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Scrapbook,
    Magazine,
    Moodboard,
    Filmstrip,
    Doodle,
}

/// Keyword groups in priority order; the first group with a keyword inside the
/// lower-cased style label wins.
const KEYWORD_GROUPS: &[(&[&str], Layout)] = &[
    (&["cutout", "sticker", "scrapbook", "memory", "casual"], Layout::Scrapbook),
    (&["magazine", "editorial", "fashion"], Layout::Magazine),
    (&["mood", "aesthetic", "pinterest"], Layout::Moodboard),
    (&["film", "story", "sequence"], Layout::Filmstrip),
    (&["doodle", "fun", "playful"], Layout::Doodle),
];

const DEFAULT_LAYOUT: Layout = Layout::Moodboard;

/// Map a free-text style label onto a layout
pub fn classify(style: &str) -> Layout {
    let style = style.to_lowercase();

    KEYWORD_GROUPS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| style.contains(keyword)))
        .map(|(_, layout)| *layout)
        .unwrap_or(DEFAULT_LAYOUT)
}

/// Select the layout for `style` and trim it to `photo_count` slots
pub fn select(style: &str, photo_count: usize) -> Template {
    let layout = classify(style);
    tracing::debug!("Style '{}' resolved to {} layout", style, layout.name());
    layout.template(photo_count)
}

impl Layout {
    pub const ALL: [Layout; 5] = [
        Layout::Scrapbook,
        Layout::Magazine,
        Layout::Moodboard,
        Layout::Filmstrip,
        Layout::Doodle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Layout::Scrapbook => "Scrapbook",
            Layout::Magazine => "Magazine",
            Layout::Moodboard => "Moodboard",
            Layout::Filmstrip => "Filmstrip",
            Layout::Doodle => "Doodle",
        }
    }

    /// Number of photo slots the full layout declares
    pub fn capacity(&self) -> usize {
        self.full_template().placements.len()
    }

    /// Build the layout with at most `photo_count` placements
    pub fn template(&self, photo_count: usize) -> Template {
        self.full_template().truncated(photo_count)
    }

    fn full_template(&self) -> Template {
        match self {
            Layout::Scrapbook => scrapbook(),
            Layout::Magazine => magazine(),
            Layout::Moodboard => moodboard(),
            Layout::Filmstrip => filmstrip(),
            Layout::Doodle => doodle(),
        }
    }
}

// Sticker hero cut out of its background, surrounded by tilted polaroids.
fn scrapbook() -> Template {
    let placements = vec![
        Placement::new(150, 150, 2500, 3000)
            .z(1)
            .cutout()
            .outlined(24, Color::WHITE),
        Placement::new(1800, 250, 850, 1100)
            .rotation(4.0)
            .frame(FrameStyle::Polaroid)
            .filter(FilterKind::Luxury)
            .z(5),
        Placement::new(150, 2500, 800, 1050)
            .rotation(-6.0)
            .frame(FrameStyle::Polaroid)
            .filter(FilterKind::Luxury)
            .z(4),
        Placement::new(1950, 2400, 700, 900)
            .rotation(8.0)
            .frame(FrameStyle::Polaroid)
            .filter(FilterKind::Soft)
            .z(3),
    ];

    let decorations = vec![
        Decoration::WashiTape {
            x: 1900,
            y: 200,
            rotation: 4.0,
            color: Some(Color::from_u32(0xDCDDE1)),
        },
        Decoration::WashiTape {
            x: 250,
            y: 2450,
            rotation: -6.0,
            color: None,
        },
        Decoration::Text {
            content: "COLLECTED MOMENTS".to_string(),
            x: 100,
            y: 3600,
            font_size: 180,
            color: Some(Color::from_u32(0x2F3640)),
        },
    ];

    Template {
        name: Layout::Scrapbook.name().to_string(),
        canvas_width: 2800,
        canvas_height: 3800,
        background: Background::Solid {
            color: Color::from_u32(0xF5F6FA),
        },
        placements,
        decorations,
    }
}

fn magazine() -> Template {
    let placements = vec![
        Placement::new(0, 0, 3000, 2200)
            .filter(FilterKind::Luxury)
            .z(1),
        Placement::new(150, 2300, 1300, 1500)
            .frame(FrameStyle::Border)
            .filter(FilterKind::Bw)
            .z(5),
        Placement::new(1550, 2500, 1300, 1300)
            .frame(FrameStyle::Border)
            .filter(FilterKind::Vibrant)
            .z(4),
    ];

    let decorations = vec![
        Decoration::Text {
            content: "THE NEW ERA".to_string(),
            x: 150,
            y: 150,
            font_size: 320,
            color: Some(Color::WHITE),
        },
        Decoration::Text {
            content: "STUDIO COLLECTION // 2025".to_string(),
            x: 1550,
            y: 2320,
            font_size: 75,
            color: Some(Color::from_u32(0x2D3436)),
        },
    ];

    Template {
        name: Layout::Magazine.name().to_string(),
        canvas_width: 3000,
        canvas_height: 4000,
        background: Background::Solid { color: Color::WHITE },
        placements,
        decorations,
    }
}

fn moodboard() -> Template {
    let placements = vec![
        Placement::new(100, 100, 1700, 2200)
            .filter(FilterKind::Soft)
            .z(1),
        Placement::new(1900, 150, 950, 1400)
            .filter(FilterKind::Watercolor)
            .z(2),
        Placement::new(100, 2400, 1700, 500)
            .filter(FilterKind::Luxury)
            .z(3),
        Placement::new(1900, 1650, 950, 1250)
            .frame(FrameStyle::Border)
            .filter(FilterKind::Vibrant)
            .z(4),
    ];

    let decorations = vec![
        Decoration::Text {
            content: "AESTHETIC STUDIO".to_string(),
            x: 100,
            y: 2850,
            font_size: 120,
            color: Some(Color::from_u32(0x636E72)),
        },
        Decoration::ColorSwatch { x: 2860, y: 100 },
    ];

    Template {
        name: Layout::Moodboard.name().to_string(),
        canvas_width: 3000,
        canvas_height: 3000,
        background: Background::Solid {
            color: Color::from_u32(0xF8F9FA),
        },
        placements,
        decorations,
    }
}

fn filmstrip() -> Template {
    let placements = vec![
        Placement::new(200, 200, 2600, 1200)
            .filter(FilterKind::Luxury)
            .z(1)
            .without_shadow(),
        Placement::new(200, 1500, 2600, 1200)
            .filter(FilterKind::Vintage)
            .z(2)
            .without_shadow(),
        Placement::new(200, 2800, 2600, 1200)
            .filter(FilterKind::Luxury)
            .z(3)
            .without_shadow(),
    ];

    let decorations = vec![
        Decoration::Text {
            content: "KODAK PORTRA 400".to_string(),
            x: 2300,
            y: 4100,
            font_size: 60,
            color: Some(Color::from_u32(0xE67E22)),
        },
        Decoration::Text {
            content: "SCENE 001".to_string(),
            x: 200,
            y: 4100,
            font_size: 60,
            color: Some(Color::WHITE),
        },
    ];

    Template {
        name: Layout::Filmstrip.name().to_string(),
        canvas_width: 3000,
        canvas_height: 4200,
        background: Background::Solid { color: Color::BLACK },
        placements,
        decorations,
    }
}

fn doodle() -> Template {
    let placements = vec![
        Placement::new(500, 500, 2000, 2000)
            .rotation(-3.0)
            .filter(FilterKind::Vibrant)
            .z(5)
            .cutout(),
        Placement::new(100, 1800, 1200, 1100)
            .rotation(6.0)
            .frame(FrameStyle::Border)
            .filter(FilterKind::Soft)
            .z(2),
        Placement::new(1700, 1800, 1200, 1100)
            .rotation(-6.0)
            .frame(FrameStyle::Border)
            .filter(FilterKind::Vibrant)
            .z(3),
    ];

    let decorations = vec![
        Decoration::Doodle {
            shape: DoodleShape::Heart,
            x: 2400,
            y: 400,
            size: 350,
            color: Some(Color::from_u32(0xFF6B6B)),
        },
        Decoration::Doodle {
            shape: DoodleShape::Star,
            x: 400,
            y: 400,
            size: 300,
            color: Some(Color::from_u32(0xF1C40F)),
        },
        Decoration::Doodle {
            shape: DoodleShape::Squiggle,
            x: 1200,
            y: 250,
            size: 600,
            color: None,
        },
        Decoration::Text {
            content: "STAY WILD".to_string(),
            x: 800,
            y: 2750,
            font_size: 280,
            color: Some(Color::from_u32(0xFC5C65)),
        },
    ];

    Template {
        name: Layout::Doodle.name().to_string(),
        canvas_width: 3000,
        canvas_height: 3000,
        background: Background::Gradient {
            top: Color::from_u32(0xFFF9FF),
            bottom: Color::from_u32(0xFDEBF3),
        },
        placements,
        decorations,
    }
}
