//! Error types for parlo.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParloError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Recognition engine errors
    #[error("Recognition timed out after {timeout_ms}ms")]
    RecognitionTimeout { timeout_ms: u64 },

    #[error("Recognition engine unavailable: {message}")]
    RecognitionUnavailable { message: String },

    // Translation engine errors
    #[error("Translation timed out after {timeout_ms}ms")]
    TranslationTimeout { timeout_ms: u64 },

    #[error("Translation engine unavailable: {message}")]
    TranslationUnavailable { message: String },

    // Synthesis engine errors
    #[error("Synthesis timed out after {timeout_ms}ms")]
    SynthesisTimeout { timeout_ms: u64 },

    #[error("Synthesis engine unavailable: {message}")]
    SynthesisUnavailable { message: String },

    // Playback errors
    #[error("Playback failed: {message}")]
    Playback { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ParloError {
    /// Returns true for failures that are worth retrying.
    ///
    /// Engine timeouts and unavailability are transient: the same call may
    /// succeed a moment later. Everything else (configuration, device
    /// acquisition, I/O) fails the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ParloError::RecognitionTimeout { .. }
                | ParloError::RecognitionUnavailable { .. }
                | ParloError::TranslationTimeout { .. }
                | ParloError::TranslationUnavailable { .. }
                | ParloError::SynthesisTimeout { .. }
                | ParloError::SynthesisUnavailable { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ParloError>;
