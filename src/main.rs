use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};

use mood_collage::{
    composition::{CompositionEngine, StyleAnalysis},
    config::Config,
    error::CollageError,
    template,
};

#[derive(Parser)]
#[command(
    name = "mood-collage",
    version,
    about = "Compose photos into a styled collage",
    long_about = "Mood-Collage picks a layout from a free-text style label, runs every photo through an effect pipeline and composites the results with hand-drawn decorations into a single PNG."
)]
struct Cli {
    /// Photo files (JPEG or PNG), in slot order
    photos: Vec<PathBuf>,

    /// Style label, e.g. "editorial magazine" or "retro film"
    #[arg(short, long)]
    style: Option<String>,

    /// Comma separated hex colors
    #[arg(short, long, value_delimiter = ',')]
    palette: Option<Vec<String>>,

    /// Dominant emotion label
    #[arg(short, long)]
    emotion: Option<String>,

    /// JSON style analysis providing style, palette and emotion
    #[arg(short, long)]
    analysis: Option<PathBuf>,

    /// Output PNG path (default: collage_<timestamp>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print the selected template as JSON and exit
    #[arg(long)]
    dump_template: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Analysis file first, then explicit flags on top
    fn style_analysis(&self) -> Result<StyleAnalysis> {
        let mut analysis = match &self.analysis {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read analysis {:?}", path))?;
                StyleAnalysis::from_json(&json).map_err(friendly)?
            }
            None => StyleAnalysis::default(),
        };

        if let Some(style) = &self.style {
            analysis.collage_style = style.clone();
        }
        if let Some(palette) = &self.palette {
            analysis.color_palette = palette.clone();
        }
        if let Some(emotion) = &self.emotion {
            analysis.dominant_emotion = emotion.clone();
        }
        Ok(analysis)
    }
}

/// Report library errors in their user-facing wording
fn friendly(err: CollageError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting Mood-Collage v{}", env!("CARGO_PKG_VERSION"));

    let analysis = cli.style_analysis()?;

    if cli.dump_template {
        let template = template::select(&analysis.collage_style, cli.photos.len());
        println!("{}", serde_json::to_string_pretty(&template)?);
        return Ok(());
    }

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path).map_err(friendly)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    if cli.seed.is_some() {
        config.composition.seed = cli.seed;
    }

    // Unreadable files keep their slot and are skipped like undecodable ones
    let photos: Vec<Vec<u8>> = cli
        .photos
        .iter()
        .map(|path| {
            std::fs::read(path).unwrap_or_else(|e| {
                warn!("Could not read {:?}: {}", path, e);
                Vec::new()
            })
        })
        .collect();

    let output = cli.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!(
            "collage_{}.png",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ))
    });

    let engine = CompositionEngine::new(config);
    let png = engine
        .compose_from_analysis(&photos, &analysis)
        .map_err(friendly)?;

    std::fs::write(&output, png).with_context(|| format!("Failed to write {:?}", output))?;
    info!("Collage saved to: {:?}", output);
    Ok(())
}
