//! Error types and reporting for pipeline stages.

use std::fmt;

/// Errors that can occur during stage processing.
#[derive(Debug, Clone)]
pub enum StageError {
    /// Recoverable error that allows the stage to continue processing.
    /// The affected item is dropped; subsequent items are unaffected.
    Recoverable(String),
    /// Fatal error that requires the stage to shut down.
    Fatal(String),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            StageError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for StageError {}

/// Trait for reporting stage errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a stage.
    fn report(&self, stage: &str, error: &StageError);
}

/// Error reporter that logs through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &StageError) {
        match error {
            StageError::Recoverable(_) => log::warn!("[{}] {}", stage, error),
            StageError::Fatal(_) => log::error!("[{}] {}", stage, error),
        }
    }
}
