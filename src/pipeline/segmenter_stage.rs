//! Segmenter stage: raw audio frames → utterance segments.

use crate::audio::segmenter::{Segmenter, SegmenterConfig};
use crate::pipeline::error::StageError;
use crate::pipeline::event::{self, PipelineEvent};
use crate::pipeline::stage::Stage;
use crate::pipeline::types::{AudioFrame, AudioSegment};
use crossbeam_channel::Sender;

/// Wraps the [`Segmenter`] state machine as a pipeline stage.
pub struct SegmenterStage {
    segmenter: Segmenter,
    event_tx: Option<Sender<PipelineEvent>>,
}

impl SegmenterStage {
    /// Creates the stage with the given segmentation config.
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            segmenter: Segmenter::new(config),
            event_tx: None,
        }
    }

    /// Attaches a progress event sender.
    pub fn with_event_sender(mut self, tx: Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn announce(&self, segment: &AudioSegment) {
        log::debug!(
            "segment {} captured ({}ms, energy {:.3})",
            segment.sequence,
            segment.duration_ms(),
            segment.avg_energy
        );
        event::emit(
            &self.event_tx,
            PipelineEvent::SegmentCaptured {
                sequence: segment.sequence,
                duration_ms: segment.duration_ms(),
            },
        );
    }
}

impl Stage for SegmenterStage {
    type Input = AudioFrame;
    type Output = AudioSegment;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StageError> {
        let segment = self.segmenter.push_frame(&input);
        if let Some(ref segment) = segment {
            self.announce(segment);
        }
        Ok(segment)
    }

    fn flush(&mut self) -> Option<Self::Output> {
        let segment = self.segmenter.flush();
        if let Some(ref segment) = segment {
            self.announce(segment);
        }
        segment
    }

    fn name(&self) -> &'static str {
        "segmenter"
    }
}
