use crate::error::{ParloError, Result};
use crate::pipeline::types::AudioSegment;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Trait for speech-to-text recognition engines.
///
/// This trait allows swapping implementations (real engine vs mock).
pub trait RecognitionEngine: Send + Sync {
    /// Transcribe an utterance to source-language text.
    ///
    /// # Arguments
    /// * `segment` - One utterance of 16-bit PCM mono audio
    /// * `source_lang` - Language code the audio is expected to be in
    ///
    /// # Returns
    /// Recognized text, or `RecognitionTimeout`/`RecognitionUnavailable`
    fn recognize(&self, segment: &AudioSegment, source_lang: &str) -> Result<String>;

    /// Engine name for logging.
    fn name(&self) -> &'static str;
}

/// What the mock answers with.
#[derive(Debug, Clone)]
enum MockResponse {
    /// The same text for every segment.
    Fixed(String),
    /// Text derived from the segment's utterance number, so each segment
    /// produces distinct output.
    EchoSequence,
}

/// Mock recognition engine for testing
pub struct MockRecognitionEngine {
    response: MockResponse,
    fail_on_sequence: Option<u64>,
    fail_always: bool,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl MockRecognitionEngine {
    /// Create a mock that answers "mock transcript" for every segment.
    pub fn new() -> Self {
        Self {
            response: MockResponse::Fixed("mock transcript".to_string()),
            fail_on_sequence: None,
            fail_always: false,
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = MockResponse::Fixed(response.to_string());
        self
    }

    /// Configure the mock to answer "utterance N" for segment N.
    pub fn echoing_sequence(mut self) -> Self {
        self.response = MockResponse::EchoSequence;
        self
    }

    /// Configure the mock to fail on every call
    pub fn with_failure(mut self) -> Self {
        self.fail_always = true;
        self
    }

    /// Configure the mock to fail only for one utterance number.
    pub fn failing_on_sequence(mut self, sequence: u64) -> Self {
        self.fail_on_sequence = Some(sequence);
        self
    }

    /// Add artificial latency to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of times `recognize` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockRecognitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionEngine for MockRecognitionEngine {
    fn recognize(&self, segment: &AudioSegment, _source_lang: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        if self.fail_always || self.fail_on_sequence == Some(segment.sequence) {
            return Err(ParloError::RecognitionUnavailable {
                message: "mock recognition failure".to_string(),
            });
        }

        match &self.response {
            MockResponse::Fixed(text) => Ok(text.clone()),
            MockResponse::EchoSequence => Ok(format!("utterance {}", segment.sequence)),
        }
    }

    fn name(&self) -> &'static str {
        "mock-recognition"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn segment(sequence: u64) -> AudioSegment {
        AudioSegment {
            samples: vec![3000i16; 1600],
            sample_rate: 16000,
            sequence,
            captured_at: Instant::now(),
            avg_energy: 0.09,
        }
    }

    #[test]
    fn test_mock_returns_fixed_response() {
        let engine = MockRecognitionEngine::new().with_response("hello there");

        let result = engine.recognize(&segment(0), "en").unwrap();
        assert_eq!(result, "hello there");
        assert_eq!(engine.call_count(), 1);
    }

    #[test]
    fn test_mock_echoes_sequence() {
        let engine = MockRecognitionEngine::new().echoing_sequence();

        assert_eq!(engine.recognize(&segment(0), "en").unwrap(), "utterance 0");
        assert_eq!(engine.recognize(&segment(7), "en").unwrap(), "utterance 7");
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn test_mock_failure() {
        let engine = MockRecognitionEngine::new().with_failure();

        match engine.recognize(&segment(0), "en") {
            Err(ParloError::RecognitionUnavailable { message }) => {
                assert_eq!(message, "mock recognition failure");
            }
            other => panic!("Expected RecognitionUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_mock_fails_only_on_configured_sequence() {
        let engine = MockRecognitionEngine::new()
            .echoing_sequence()
            .failing_on_sequence(1);

        assert!(engine.recognize(&segment(0), "en").is_ok());
        assert!(engine.recognize(&segment(1), "en").is_err());
        assert!(engine.recognize(&segment(2), "en").is_ok());
    }

    #[test]
    fn test_engine_trait_is_object_safe() {
        let engine: Box<dyn RecognitionEngine> =
            Box::new(MockRecognitionEngine::new().with_response("boxed"));

        assert_eq!(engine.name(), "mock-recognition");
        assert_eq!(engine.recognize(&segment(0), "en").unwrap(), "boxed");
    }
}
