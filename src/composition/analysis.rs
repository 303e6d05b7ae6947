use serde::{Deserialize, Serialize};

use crate::{
    color::{parse_palette, Color},
    error::{CollageError, Result},
};

/// Style metadata produced upstream for a batch of photos.
///
/// Field names follow the JSON the analysis service emits. Missing fields take
/// the same defaults the service falls back to when its own call fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleAnalysis {
    pub collage_style: String,
    pub color_palette: Vec<String>,
    pub dominant_emotion: String,
}

impl Default for StyleAnalysis {
    fn default() -> Self {
        Self {
            collage_style: "moodboard".to_string(),
            color_palette: vec!["#FFFFFF".to_string(), "#000000".to_string()],
            dominant_emotion: "Joy".to_string(),
        }
    }
}

impl StyleAnalysis {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CollageError::generic(format!("Invalid style analysis: {}", e)))
    }

    /// Parsed palette; invalid entries are dropped
    pub fn palette(&self) -> Vec<Color> {
        parse_palette(&self.color_palette)
    }
}
