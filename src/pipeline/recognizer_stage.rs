//! Recognizer stage: utterance segments → source-language transcripts.

use crate::engines::recognition::RecognitionEngine;
use crate::engines::retry::{RetryPolicy, call_with_timeout, run_with_retry};
use crate::error::ParloError;
use crate::pipeline::error::StageError;
use crate::pipeline::event::{self, PipelineEvent};
use crate::pipeline::stage::Stage;
use crate::pipeline::types::{AudioSegment, Transcript};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::time::Duration;

/// Calls the external recognition engine with a hard timeout and bounded
/// retries. A segment whose retries are exhausted is dropped, never allowed
/// to stall the segments behind it.
pub struct RecognizerStage {
    engine: Arc<dyn RecognitionEngine>,
    source_lang: String,
    timeout: Duration,
    retry: RetryPolicy,
    event_tx: Option<Sender<PipelineEvent>>,
}

impl RecognizerStage {
    /// Creates the stage.
    pub fn new(
        engine: Arc<dyn RecognitionEngine>,
        source_lang: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            engine,
            source_lang,
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
}

impl Stage for RecognizerStage {
    type Input = AudioSegment;
    type Output = Transcript;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StageError> {
        let sequence = input.sequence;
        let captured_at = input.captured_at;
        let segment = Arc::new(input);
        let timeout_ms = self.timeout.as_millis() as u64;

        let result = run_with_retry(&self.retry, || {
            let engine = Arc::clone(&self.engine);
            let segment = Arc::clone(&segment);
            let lang = self.source_lang.clone();
            call_with_timeout(
                self.timeout,
                ParloError::RecognitionTimeout { timeout_ms },
                move || engine.recognize(&segment, &lang),
            )
        });

        match result {
            Ok(text) if text.trim().is_empty() => {
                // The engine heard nothing intelligible; not an error.
                log::debug!("segment {} produced an empty transcript", sequence);
                Ok(None)
            }
            Ok(text) => {
                event::emit(
                    &self.event_tx,
                    PipelineEvent::Transcribed {
                        sequence,
                        text: text.clone(),
                    },
                );
                Ok(Some(Transcript {
                    text,
                    source_lang: self.source_lang.clone(),
                    sequence,
                    captured_at,
                }))
            }
            Err(e) => {
                event::emit(
                    &self.event_tx,
                    PipelineEvent::ItemDropped {
                        stage: self.name(),
                        sequence,
                        reason: e.to_string(),
                    },
                );
                Err(StageError::Recoverable(format!(
                    "segment {} dropped: {}",
                    sequence, e
                )))
            }
        }
    }

    fn name(&self) -> &'static str {
        "recognizer"
    }
}
