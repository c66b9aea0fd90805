//! Error types for VoiceLens

use std::io;
use thiserror::Error;

/// Main error type for VoiceLens
#[derive(Error, Debug)]
pub enum VoiceLensError {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Text transform error: {0}")]
    Transform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for VoiceLens operations
pub type Result<T> = std::result::Result<T, VoiceLensError>;

impl From<String> for VoiceLensError {
    fn from(s: String) -> Self {
        VoiceLensError::Other(s)
    }
}

impl From<&str> for VoiceLensError {
    fn from(s: &str) -> Self {
        VoiceLensError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for VoiceLensError {
    fn from(e: serde_json::Error) -> Self {
        VoiceLensError::Persistence(format!("JSON error: {}", e))
    }
}

impl From<reqwest::Error> for VoiceLensError {
    fn from(e: reqwest::Error) -> Self {
        VoiceLensError::Transform(e.to_string())
    }
}
