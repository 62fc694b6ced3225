//! Progress events emitted by the pipeline.
//!
//! Observability hook for front-ends and tests: every stage reports what it
//! just did through an optional, non-blocking event channel.

/// One pipeline progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The segmenter emitted an utterance.
    SegmentCaptured { sequence: u64, duration_ms: u32 },
    /// The recognizer produced source-language text.
    Transcribed { sequence: u64, text: String },
    /// The translator produced target-language text.
    Translated {
        sequence: u64,
        text: String,
        from_cache: bool,
    },
    /// Playback of an utterance completed.
    Spoken { sequence: u64 },
    /// An item was abandoned after its stage's failure policy was exhausted.
    ItemDropped {
        stage: &'static str,
        sequence: u64,
        reason: String,
    },
}

impl PipelineEvent {
    /// The utterance number this event refers to.
    pub fn sequence(&self) -> u64 {
        match self {
            PipelineEvent::SegmentCaptured { sequence, .. }
            | PipelineEvent::Transcribed { sequence, .. }
            | PipelineEvent::Translated { sequence, .. }
            | PipelineEvent::Spoken { sequence }
            | PipelineEvent::ItemDropped { sequence, .. } => *sequence,
        }
    }
}

/// Sends an event without blocking; a full or missing channel drops it.
pub(crate) fn emit(tx: &Option<crossbeam_channel::Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = tx {
        let _ = tx.try_send(event);
    }
}
