//! Silence-based utterance segmentation.
//!
//! Accumulates raw audio frames into discrete utterances using RMS energy
//! thresholding. A segment is emitted when trailing silence exceeds the
//! configured gap, or when the hard duration cap is reached during
//! continuous speech. Silence timing is derived from accumulated sample
//! counts, so segmentation is deterministic regardless of scheduling.

use crate::audio::energy::{AmbientTracker, calculate_rms};
use crate::defaults;
use crate::pipeline::types::{AudioFrame, AudioSegment};
use std::time::Instant;

/// Configuration for the segmenter.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Sample rate for duration calculations.
    pub sample_rate: u32,
    /// RMS threshold for detecting speech (0.0 to 1.0).
    pub energy_threshold: f32,
    /// Adapt the threshold to ambient noise instead of keeping it static.
    pub dynamic_energy: bool,
    /// Trailing silence that ends an utterance (milliseconds).
    pub silence_duration_ms: u32,
    /// Hard cap on utterance duration (milliseconds).
    pub phrase_time_limit_ms: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            energy_threshold: defaults::ENERGY_THRESHOLD,
            dynamic_energy: defaults::DYNAMIC_ENERGY,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            phrase_time_limit_ms: defaults::PHRASE_TIME_LIMIT_MS,
        }
    }
}

/// Utterance segmenter state machine.
///
/// Frames before the first voiced frame are discarded, so pure silence never
/// produces a segment. Pauses shorter than the silence gap are folded back
/// into the utterance when speech resumes; the trailing silence that closes
/// an utterance is not part of the emitted segment.
pub struct Segmenter {
    config: SegmenterConfig,
    threshold: f32,
    ambient: Option<AmbientTracker>,
    /// Samples of the in-progress utterance, including folded-in pauses.
    voiced: Vec<i16>,
    /// Silence accumulated since the last voiced frame.
    pending_silence: Vec<i16>,
    started_at: Option<Instant>,
    energy_sum: f32,
    energy_frames: u32,
    next_sequence: u64,
}

impl Segmenter {
    /// Creates a segmenter with the given configuration.
    pub fn new(config: SegmenterConfig) -> Self {
        let ambient = config.dynamic_energy.then(|| {
            let frame_ms = 1000 * defaults::CHUNK_SIZE as u64 / config.sample_rate.max(1) as u64;
            let calibration_frames = u64::from(defaults::CALIBRATION_MS) / frame_ms.max(1);
            AmbientTracker::new(
                defaults::ENERGY_MULTIPLIER,
                defaults::MIN_ENERGY_THRESHOLD,
                calibration_frames,
            )
        });
        Self {
            config,
            threshold: config.energy_threshold,
            ambient,
            voiced: Vec::new(),
            pending_silence: Vec::new(),
            started_at: None,
            energy_sum: 0.0,
            energy_frames: 0,
            next_sequence: 0,
        }
    }

    /// Feeds one frame; returns a segment when an utterance just completed.
    pub fn push_frame(&mut self, frame: &AudioFrame) -> Option<AudioSegment> {
        let level = calculate_rms(&frame.samples);
        let is_voiced = level > self.threshold;

        // Adapt the threshold only outside active speech, so the ambient
        // estimate cannot drift upward mid-utterance.
        if !is_voiced && let Some(ref mut ambient) = self.ambient {
            self.threshold = ambient.observe_silence(level);
        }

        if is_voiced {
            if self.started_at.is_none() {
                self.started_at = Some(frame.timestamp);
            }
            // A pause shorter than the gap is part of the utterance.
            self.voiced.append(&mut self.pending_silence);
            self.voiced.extend_from_slice(&frame.samples);
            self.energy_sum += level;
            self.energy_frames += 1;

            if self.duration_ms(self.voiced.len()) >= self.config.phrase_time_limit_ms {
                return self.emit();
            }
        } else if self.started_at.is_some() {
            self.pending_silence.extend_from_slice(&frame.samples);
            if self.duration_ms(self.pending_silence.len()) >= self.config.silence_duration_ms {
                return self.emit();
            }
        }
        // Leading silence: nothing collected yet, frame is discarded.

        None
    }

    /// Flushes the in-progress utterance, if it contains voiced audio.
    ///
    /// Called on shutdown so words spoken right before stop are not lost.
    pub fn flush(&mut self) -> Option<AudioSegment> {
        self.emit()
    }

    /// Current speech threshold (static, or the adaptive value).
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn duration_ms(&self, samples: usize) -> u32 {
        (samples as u64 * 1000 / self.config.sample_rate as u64) as u32
    }

    fn emit(&mut self) -> Option<AudioSegment> {
        let started_at = self.started_at.take()?;
        self.pending_silence.clear();

        if self.voiced.is_empty() {
            return None;
        }

        let samples = std::mem::take(&mut self.voiced);
        let avg_energy = if self.energy_frames > 0 {
            self.energy_sum / self.energy_frames as f32
        } else {
            0.0
        };
        self.energy_sum = 0.0;
        self.energy_frames = 0;

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        Some(AudioSegment {
            samples,
            sample_rate: self.config.sample_rate,
            sequence,
            captured_at: started_at,
            avg_energy,
        })
    }
}
