//! Speaker stage: translations → synthesized audio → playback.

use crate::engines::playback::AudioSink;
use crate::engines::retry::{RetryPolicy, call_with_timeout, run_with_retry};
use crate::engines::synthesis::SynthesisEngine;
use crate::error::ParloError;
use crate::pipeline::error::StageError;
use crate::pipeline::event::{self, PipelineEvent};
use crate::pipeline::stage::Stage;
use crate::pipeline::types::Translation;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::time::Duration;

/// Terminal stage: synthesizes each translation and plays it.
///
/// Playback blocks until the utterance finishes, so consecutive outputs never
/// overlap. Synthesis failures follow the timeout/retry/drop policy; playback
/// failures drop the item but never take the pipeline down.
pub struct SpeakerStage {
    engine: Arc<dyn SynthesisEngine>,
    sink: Box<dyn AudioSink>,
    timeout: Duration,
    retry: RetryPolicy,
    event_tx: Option<Sender<PipelineEvent>>,
}

impl SpeakerStage {
    /// Creates the stage.
    pub fn new(
        engine: Arc<dyn SynthesisEngine>,
        sink: Box<dyn AudioSink>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            engine,
            sink,
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

    fn drop_item(&self, sequence: u64, error: &ParloError) -> StageError {
        event::emit(
            &self.event_tx,
            PipelineEvent::ItemDropped {
                stage: self.name(),
                sequence,
                reason: error.to_string(),
            },
        );
        StageError::Recoverable(format!("segment {} dropped: {}", sequence, error))
    }
}

impl Stage for SpeakerStage {
    type Input = Translation;
    type Output = ();

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StageError> {
        let timeout_ms = self.timeout.as_millis() as u64;

        let synthesized = run_with_retry(&self.retry, || {
            let engine = Arc::clone(&self.engine);
            let text = input.text.clone();
            let lang = input.target_lang.clone();
            call_with_timeout(
                self.timeout,
                ParloError::SynthesisTimeout { timeout_ms },
                move || engine.synthesize(&text, &lang),
            )
        });

        let audio = match synthesized {
            Ok(audio) => audio,
            Err(e) => return Err(self.drop_item(input.sequence, &e)),
        };

        // Playback deliberately runs without a timeout: blocking until the
        // utterance finishes is what keeps outputs from overlapping.
        if let Err(e) = self.sink.play(&audio) {
            return Err(self.drop_item(input.sequence, &e));
        }

        event::emit(
            &self.event_tx,
            PipelineEvent::Spoken {
                sequence: input.sequence,
            },
        );
        Ok(Some(()))
    }

    fn name(&self) -> &'static str {
        "speaker"
    }
}
