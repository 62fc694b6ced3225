//! Data types that flow between pipeline stages.

use std::time::Instant;

/// A frame of raw audio samples with timing information.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
    /// Timestamp when this frame was captured.
    pub timestamp: Instant,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
}

impl AudioFrame {
    /// Creates a new audio frame.
    pub fn new(samples: Vec<i16>, timestamp: Instant, sequence: u64) -> Self {
        Self {
            samples,
            timestamp,
            sequence,
        }
    }

    /// Returns the duration of this frame in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        (self.samples.len() as u64 * 1000 / sample_rate as u64) as u32
    }
}

/// One contiguous utterance bounded by silence, ready for recognition.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    /// Concatenated PCM samples of the voiced span.
    pub samples: Vec<i16>,
    /// Sample rate the samples were captured at.
    pub sample_rate: u32,
    /// Monotonic utterance number, assigned by the segmenter.
    pub sequence: u64,
    /// Timestamp of the first voiced frame. Carried downstream so outputs
    /// can be related back to when the words were spoken.
    pub captured_at: Instant,
    /// Average normalized RMS over the voiced frames.
    pub avg_energy: f32,
}

impl AudioSegment {
    /// Returns the duration of this segment in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        (self.samples.len() as u64 * 1000 / self.sample_rate as u64) as u32
    }
}

/// Source-language text produced by the recognizer.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Recognized text.
    pub text: String,
    /// Language the text is in.
    pub source_lang: String,
    /// Utterance number of the originating segment.
    pub sequence: u64,
    /// Capture timestamp of the originating segment.
    pub captured_at: Instant,
}

/// Target-language text produced by the translator.
#[derive(Debug, Clone)]
pub struct Translation {
    /// Translated text.
    pub text: String,
    /// Language the transcript was in.
    pub source_lang: String,
    /// Language of the translated text.
    pub target_lang: String,
    /// Utterance number of the originating segment.
    pub sequence: u64,
    /// Capture timestamp of the originating segment.
    pub captured_at: Instant,
    /// Whether this came from the result cache rather than an engine call.
    pub from_cache: bool,
}
