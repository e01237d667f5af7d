//! Error types for spanish-practice

use std::io;
use thiserror::Error;

/// Main error type for the practice tools
#[derive(Error, Debug)]
pub enum PracticeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Speech backend error: {0}")]
    Speech(String),

    #[error("Failed to generate audio after {attempts} attempts: first error: {first}; final error: {last}")]
    Synthesis {
        attempts: usize,
        first: String,
        last: String,
    },

    #[error("Audio processing error: {0}")]
    Audio(String),

    #[error("Language model error: {0}")]
    Model(String),

    #[error("Model response contained no complete practice items ({rejected} rejected)")]
    NoItems { rejected: usize },

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for practice operations
pub type Result<T> = std::result::Result<T, PracticeError>;

impl From<String> for PracticeError {
    fn from(s: String) -> Self {
        PracticeError::Other(s)
    }
}

impl From<&str> for PracticeError {
    fn from(s: &str) -> Self {
        PracticeError::Other(s.to_string())
    }
}

impl From<hound::Error> for PracticeError {
    fn from(e: hound::Error) -> Self {
        PracticeError::Audio(format!("WAV error: {}", e))
    }
}
