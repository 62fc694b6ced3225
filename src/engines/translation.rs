use crate::error::{ParloError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Trait for text translation engines.
pub trait TranslationEngine: Send + Sync {
    /// Translate text between two languages.
    ///
    /// # Returns
    /// Translated text, or `TranslationTimeout`/`TranslationUnavailable`
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;

    /// Engine name for logging.
    fn name(&self) -> &'static str;
}

/// Mock translation engine for testing.
///
/// Answers `"[target] text"` so outputs are distinct per input and the
/// language routing is visible in assertions.
pub struct MockTranslationEngine {
    fail_always: bool,
    fail_on_text: Option<String>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl MockTranslationEngine {
    /// Create a new mock translation engine.
    pub fn new() -> Self {
        Self {
            fail_always: false,
            fail_on_text: None,
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to fail on every call
    pub fn with_failure(mut self) -> Self {
        self.fail_always = true;
        self
    }

    /// Configure the mock to fail when the input contains the given text.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_on_text = Some(text.to_string());
        self
    }

    /// Add artificial latency to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of times `translate` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTranslationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationEngine for MockTranslationEngine {
    fn translate(&self, text: &str, _source_lang: &str, target_lang: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let should_fail = self.fail_always
            || self
                .fail_on_text
                .as_deref()
                .is_some_and(|needle| text.contains(needle));
        if should_fail {
            return Err(ParloError::TranslationUnavailable {
                message: "mock translation failure".to_string(),
            });
        }

        Ok(format!("[{}] {}", target_lang, text))
    }

    fn name(&self) -> &'static str {
        "mock-translation"
    }
}
