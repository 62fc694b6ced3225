use crate::error::{ParloError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for text-to-speech synthesis engines.
pub trait SynthesisEngine: Send + Sync {
    /// Synthesize text into encoded audio bytes (WAV/MP3, decoded by the sink).
    ///
    /// # Returns
    /// Audio bytes, or `SynthesisTimeout`/`SynthesisUnavailable`
    fn synthesize(&self, text: &str, target_lang: &str) -> Result<Vec<u8>>;

    /// Engine name for logging.
    fn name(&self) -> &'static str;
}

/// Mock synthesis engine for testing.
///
/// Returns the text's UTF-8 bytes so a recording sink can assert on what
/// would have been spoken.
pub struct MockSynthesisEngine {
    fail_always: bool,
    calls: AtomicUsize,
}

impl MockSynthesisEngine {
    /// Create a new mock synthesis engine.
    pub fn new() -> Self {
        Self {
            fail_always: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to fail on every call
    pub fn with_failure(mut self) -> Self {
        self.fail_always = true;
        self
    }

    /// Number of times `synthesize` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSynthesisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisEngine for MockSynthesisEngine {
    fn synthesize(&self, text: &str, _target_lang: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_always {
            return Err(ParloError::SynthesisUnavailable {
                message: "mock synthesis failure".to_string(),
            });
        }

        Ok(text.as_bytes().to_vec())
    }

    fn name(&self) -> &'static str {
        "mock-synthesis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_returns_text_bytes() {
        let engine = MockSynthesisEngine::new();

        let audio = engine.synthesize("hola mundo", "es").unwrap();
        assert_eq!(audio, b"hola mundo");
        assert_eq!(engine.call_count(), 1);
    }

    #[test]
    fn test_mock_failure() {
        let engine = MockSynthesisEngine::new().with_failure();

        match engine.synthesize("hola", "es") {
            Err(ParloError::SynthesisUnavailable { message }) => {
                assert_eq!(message, "mock synthesis failure");
            }
            other => panic!("Expected SynthesisUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_trait_is_object_safe() {
        let engine: Box<dyn SynthesisEngine> = Box::new(MockSynthesisEngine::new());
        assert_eq!(engine.name(), "mock-synthesis");
        assert!(engine.synthesize("x", "es").is_ok());
    }
}
