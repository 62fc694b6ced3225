//! Default configuration constants for parlo.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default capture chunk size in samples per frame.
pub const CHUNK_SIZE: usize = 1024;

/// Default speech energy threshold.
///
/// This RMS-based threshold (0.0 to 1.0) determines when audio is considered speech.
/// A value of 0.02 is tuned for typical microphone input levels and provides
/// good sensitivity while filtering out background noise.
pub const ENERGY_THRESHOLD: f32 = 0.02;

/// Default silence duration in milliseconds before an utterance is considered ended.
///
/// 800ms allows for natural pauses in speech without splitting a phrase in two.
pub const SILENCE_DURATION_MS: u32 = 800;

/// Default hard cap on utterance duration in milliseconds.
///
/// Continuous speech with no pause is cut into segments of at most this length
/// so the segmenter never buffers unboundedly.
pub const PHRASE_TIME_LIMIT_MS: u32 = 5000;

/// Whether the energy threshold adapts to ambient noise by default.
pub const DYNAMIC_ENERGY: bool = true;

/// Multiplier applied to the ambient noise estimate to derive the speech threshold.
pub const ENERGY_MULTIPLIER: f32 = 2.5;

/// Floor for the adaptive speech threshold (never goes below this).
pub const MIN_ENERGY_THRESHOLD: f32 = 0.01;

/// Duration of the initial ambient-noise calibration window in milliseconds.
///
/// During this window the ambient estimate learns faster so the adaptive
/// threshold settles quickly after startup.
pub const CALIBRATION_MS: u32 = 2000;

/// Default source language code (the language being spoken).
pub const SOURCE_LANGUAGE: &str = "en";

/// Default target language code (the language being spoken back).
pub const TARGET_LANGUAGE: &str = "es";

/// Default maximum number of entries kept in the translation result cache.
pub const CACHE_MAX_ENTRIES: usize = 100;

/// Hard upper bound on a single external engine call.
///
/// Enforced by the calling stage, independent of the engine's own behavior,
/// so one slow call can never stall the pipeline indefinitely.
pub const ENGINE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of attempts for a failing engine call (first try included).
pub const MAX_ATTEMPTS: u32 = 3;

/// Initial delay between engine retries; doubles after each failed attempt.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Capacity of the raw-audio queue (frames).
///
/// The only queue with a drop-oldest overload policy, since audio capture
/// cannot be paused without losing real-time correctness.
pub const FRAME_BUFFER: usize = 32;

/// Capacity of the segment queue (utterances awaiting recognition).
pub const SEGMENT_BUFFER: usize = 8;

/// Capacity of the transcript queue (source text awaiting translation).
pub const TRANSCRIPT_BUFFER: usize = 8;

/// Capacity of the translation queue (target text awaiting synthesis).
pub const TRANSLATION_BUFFER: usize = 8;

/// Interval at which the capture loop polls the audio source.
pub const CAPTURE_POLL_INTERVAL: Duration = Duration::from_millis(16);
