//! Translator stage: transcripts → target-language translations.

use crate::cache::{CacheKey, ResultCache};
use crate::engines::retry::{RetryPolicy, call_with_timeout, run_with_retry};
use crate::engines::translation::TranslationEngine;
use crate::error::ParloError;
use crate::pipeline::error::StageError;
use crate::pipeline::event::{self, PipelineEvent};
use crate::pipeline::stage::Stage;
use crate::pipeline::types::{Transcript, Translation};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::time::Duration;

/// Translates transcripts, consulting the result cache first.
///
/// A cache hit returns immediately with no engine call — the fast path for
/// repeated phrases. A miss goes to the engine under the same timeout/retry
/// policy as recognition, and the result is stored before being passed on.
/// The cache's lock is internal to get/put, so it is never held across the
/// engine call.
pub struct TranslatorStage {
    engine: Arc<dyn TranslationEngine>,
    cache: Arc<ResultCache>,
    source_lang: String,
    target_lang: String,
    timeout: Duration,
    retry: RetryPolicy,
    event_tx: Option<Sender<PipelineEvent>>,
}

impl TranslatorStage {
    /// Creates the stage.
    pub fn new(
        engine: Arc<dyn TranslationEngine>,
        cache: Arc<ResultCache>,
        source_lang: String,
        target_lang: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            engine,
            cache,
            source_lang,
            target_lang,
            timeout,
            retry,
            event_tx: None,
        }
    }

    /// Attaches a progress event sender.
    pub fn with_event_sender(mut self, tx: Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn build_translation(&self, input: &Transcript, text: String, from_cache: bool) -> Translation {
        event::emit(
            &self.event_tx,
            PipelineEvent::Translated {
                sequence: input.sequence,
                text: text.clone(),
                from_cache,
            },
        );
        Translation {
            text,
            source_lang: self.source_lang.clone(),
            target_lang: self.target_lang.clone(),
            sequence: input.sequence,
            captured_at: input.captured_at,
            from_cache,
        }
    }
}

impl Stage for TranslatorStage {
    type Input = Transcript;
    type Output = Translation;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StageError> {
        let key = CacheKey::new(&input.text, &self.source_lang, &self.target_lang);

        if let Some(cached) = self.cache.get(&key) {
            log::debug!("segment {} translated from cache", input.sequence);
            return Ok(Some(self.build_translation(&input, cached, true)));
        }

        let timeout_ms = self.timeout.as_millis() as u64;
        let result = run_with_retry(&self.retry, || {
            let engine = Arc::clone(&self.engine);
            let text = input.text.clone();
            let source = self.source_lang.clone();
            let target = self.target_lang.clone();
            call_with_timeout(
                self.timeout,
                ParloError::TranslationTimeout { timeout_ms },
                move || engine.translate(&text, &source, &target),
            )
        });

        match result {
            Ok(translated) => {
                self.cache.put(key, translated.clone());
                Ok(Some(self.build_translation(&input, translated, false)))
            }
            Err(e) => {
                event::emit(
                    &self.event_tx,
                    PipelineEvent::ItemDropped {
                        stage: self.name(),
                        sequence: input.sequence,
                        reason: e.to_string(),
                    },
                );
                Err(StageError::Recoverable(format!(
                    "segment {} dropped: {}",
                    input.sequence, e
                )))
            }
        }
    }

    fn name(&self) -> &'static str {
        "translator"
    }
}
