use thiserror::Error;

/// Main error type for the mood-collage library
#[derive(Error, Debug)]
pub enum CollageError {
    #[error("Photo decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Pipeline stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Color error: {0}")]
    Color(#[from] ColorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// A photo's bytes could not be turned into pixels
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Photo {index} is empty")]
    Empty { index: usize },

    #[error("Photo {index} could not be decoded: {reason}")]
    Unreadable { index: usize, reason: String },
}

/// Failure inside a single pipeline stage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// The stage failed but the photo survives with its pre-stage pixels
    #[error("Stage '{stage}' failed, keeping previous image: {reason}")]
    Recoverable { stage: String, reason: String },

    /// The photo cannot continue through the pipeline
    #[error("Stage '{stage}' failed fatally: {reason}")]
    Fatal { stage: String, reason: String },
}

impl StageError {
    pub fn recoverable<S: Into<String>, R: Into<String>>(stage: S, reason: R) -> Self {
        Self::Recoverable {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    pub fn fatal<S: Into<String>, R: Into<String>>(stage: S, reason: R) -> Self {
        Self::Fatal {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    pub fn stage(&self) -> &str {
        match self {
            Self::Recoverable { stage, .. } | Self::Fatal { stage, .. } => stage,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

/// Final bitmap serialization failed
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("PNG encoding failed: {reason}")]
    PngFailed { reason: String },

    #[error("Canvas has invalid dimensions: {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Hex color parsing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("Invalid hex color: '{value}'")]
    InvalidHex { value: String },
}

/// Convenience type alias for Results using CollageError
pub type Result<T> = std::result::Result<T, CollageError>;

impl CollageError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether composition can carry on past this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Decode(_) => true,
            Self::Stage(err) => !err.is_fatal(),
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode(DecodeError::Unreadable { index, .. }) => {
                format!("Photo #{} is not a readable JPEG or PNG image and was left out.", index + 1)
            }
            Self::Encode(_) => {
                "The collage was composed but could not be saved as PNG.".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Color(ColorError::InvalidHex { value }) => {
                format!("'{}' is not a color. Use hex notation such as #FF6B6B.", value)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        let decode: CollageError = DecodeError::Empty { index: 0 }.into();
        assert!(decode.is_recoverable());

        let soft: CollageError = StageError::recoverable("filter", "boom").into();
        assert!(soft.is_recoverable());

        let hard: CollageError = StageError::fatal("decode", "boom").into();
        assert!(!hard.is_recoverable());

        let encode: CollageError = EncodeError::PngFailed { reason: "disk".into() }.into();
        assert!(!encode.is_recoverable());
    }

    #[test]
    fn test_user_message_numbers_photos_from_one() {
        let err: CollageError = DecodeError::Unreadable {
            index: 2,
            reason: "bad magic".into(),
        }
        .into();
        assert!(err.user_message().contains("#3"));
    }
}
