//! Pipeline orchestration: queues, workers, and lifecycle.
//!
//! Wires the four stages together with bounded channels and runs one worker
//! per stage:
//!
//! ```text
//! Microphone → Q1 → Segmenter → Q2 → Recognizer → Q3 → Translator → Q4 → Speaker
//! ```
//!
//! Every queue applies backpressure by blocking its producer when full,
//! except Q1: raw audio capture cannot pause, so under sustained overload the
//! oldest frame is evicted instead. Because each stage has exactly one worker
//! and each queue is FIFO, utterances are spoken in the order they were
//! spoken into the microphone.

use crate::audio::segmenter::SegmenterConfig;
use crate::audio::source::AudioSource;
use crate::cache::ResultCache;
use crate::config::Config;
use crate::defaults;
use crate::engines::playback::AudioSink;
use crate::engines::recognition::RecognitionEngine;
use crate::engines::retry::RetryPolicy;
use crate::engines::synthesis::SynthesisEngine;
use crate::engines::translation::TranslationEngine;
use crate::error::{ParloError, Result};
use crate::languages;
use crate::pipeline::error::{ErrorReporter, LogReporter};
use crate::pipeline::event::PipelineEvent;
use crate::pipeline::recognizer_stage::RecognizerStage;
use crate::pipeline::segmenter_stage::SegmenterStage;
use crate::pipeline::speaker_stage::SpeakerStage;
use crate::pipeline::stage::StageRunner;
use crate::pipeline::state::{PipelineState, StateCell};
use crate::pipeline::translator_stage::TranslatorStage;
use crate::pipeline::types::AudioFrame;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Language spoken into the microphone.
    pub source_lang: String,
    /// Language spoken back out.
    pub target_lang: String,
    /// Segmentation configuration.
    pub segmenter: SegmenterConfig,
    /// Hard upper bound on each external engine call.
    pub engine_timeout: Duration,
    /// Retry policy for transient engine failures.
    pub retry: RetryPolicy,
    /// Maximum entries in the translation result cache.
    pub cache_max_entries: usize,
    /// Channel buffer sizes.
    pub frame_buffer: usize,
    pub segment_buffer: usize,
    pub transcript_buffer: usize,
    pub translation_buffer: usize,
    /// Interval the capture loop sleeps when no audio is buffered.
    pub capture_poll_interval: Duration,
    /// Optional progress event sender (non-blocking).
    pub event_tx: Option<Sender<PipelineEvent>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_lang: defaults::SOURCE_LANGUAGE.to_string(),
            target_lang: defaults::TARGET_LANGUAGE.to_string(),
            segmenter: SegmenterConfig::default(),
            engine_timeout: defaults::ENGINE_TIMEOUT,
            retry: RetryPolicy::default(),
            cache_max_entries: defaults::CACHE_MAX_ENTRIES,
            frame_buffer: defaults::FRAME_BUFFER,
            segment_buffer: defaults::SEGMENT_BUFFER,
            transcript_buffer: defaults::TRANSCRIPT_BUFFER,
            translation_buffer: defaults::TRANSLATION_BUFFER,
            capture_poll_interval: defaults::CAPTURE_POLL_INTERVAL,
            event_tx: None,
        }
    }
}

impl PipelineConfig {
    /// Builds a pipeline config from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_lang: config.languages.source.clone(),
            target_lang: config.languages.target.clone(),
            segmenter: SegmenterConfig {
                sample_rate: config.audio.sample_rate,
                energy_threshold: config.audio.energy_threshold,
                dynamic_energy: config.audio.dynamic_energy,
                silence_duration_ms: config.audio.silence_duration_ms,
                phrase_time_limit_ms: config.audio.phrase_time_limit_ms,
            },
            engine_timeout: Duration::from_millis(config.engine.timeout_ms),
            retry: RetryPolicy {
                max_attempts: config.engine.max_attempts,
                initial_delay: Duration::from_millis(config.engine.retry_delay_ms),
            },
            cache_max_entries: config.cache.max_entries,
            ..Self::default()
        }
    }

    /// Checks the configuration before any worker is spawned.
    fn validate(&self) -> Result<()> {
        if !languages::is_supported(&self.source_lang) {
            return Err(ParloError::ConfigInvalidValue {
                key: "source_lang".to_string(),
                message: format!("unknown language code '{}'", self.source_lang),
            });
        }
        if !languages::is_supported(&self.target_lang) {
            return Err(ParloError::ConfigInvalidValue {
                key: "target_lang".to_string(),
                message: format!("unknown language code '{}'", self.target_lang),
            });
        }
        if self.segmenter.sample_rate == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "segmenter.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.segmenter.energy_threshold <= 0.0 || self.segmenter.energy_threshold >= 1.0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "segmenter.energy_threshold".to_string(),
                message: "must be between 0.0 and 1.0 exclusive".to_string(),
            });
        }
        if self.segmenter.silence_duration_ms == 0 || self.segmenter.phrase_time_limit_ms == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "segmenter".to_string(),
                message: "durations must be positive".to_string(),
            });
        }
        if self.engine_timeout.is_zero() {
            return Err(ParloError::ConfigInvalidValue {
                key: "engine_timeout".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "retry.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.cache_max_entries == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "cache_max_entries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let buffers = [
            self.frame_buffer,
            self.segment_buffer,
            self.transcript_buffer,
            self.translation_buffer,
        ];
        if buffers.contains(&0) {
            return Err(ParloError::ConfigInvalidValue {
                key: "buffers".to_string(),
                message: "queue capacities must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    state: Arc<StateCell>,
    capture: Option<JoinHandle<()>>,
    runners: Vec<StageRunner>,
    dropped_frames: Arc<AtomicU64>,
}

impl PipelineHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state.load()
    }

    /// Returns true while the pipeline is accepting audio.
    pub fn is_running(&self) -> bool {
        self.state.load() == PipelineState::Running
    }

    /// Raw audio frames evicted under Q1 overload so far.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Stops the pipeline gracefully.
    ///
    /// Stops accepting audio, lets every in-flight item drain through to
    /// playback, waits for all workers to exit, then reports `Stopped`.
    pub fn stop(mut self) {
        self.state
            .transition(PipelineState::Running, PipelineState::Draining);

        if let Some(capture) = self.capture.take()
            && capture.join().is_err()
        {
            log::error!("capture thread panicked");
        }
        for runner in self.runners.drain(..) {
            if let Err(msg) = runner.join() {
                log::error!("{}", msg);
            }
        }

        self.state.store(PipelineState::Stopped);
    }
}

/// The streaming translation pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
    cache: Arc<ResultCache>,
}

impl Pipeline {
    /// Creates a pipeline, validating the configuration.
    ///
    /// Invalid configuration is fatal here: the pipeline never starts.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(ResultCache::new(config.cache_max_entries));
        Ok(Self {
            config,
            error_reporter: Arc::new(LogReporter),
            cache,
        })
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// The translation result cache (for statistics).
    pub fn cache(&self) -> Arc<ResultCache> {
        Arc::clone(&self.cache)
    }

    /// Starts the pipeline.
    ///
    /// # Arguments
    /// * `source` - Audio input device
    /// * `recognition` - Speech-to-text engine
    /// * `translation` - Text translation engine
    /// * `synthesis` - Text-to-speech engine
    /// * `output` - Audio output device
    ///
    /// # Errors
    /// Fails if the audio source cannot start (capture is pipeline-fatal);
    /// no worker is spawned in that case.
    pub fn start(
        self,
        mut source: Box<dyn AudioSource>,
        recognition: Arc<dyn RecognitionEngine>,
        translation: Arc<dyn TranslationEngine>,
        synthesis: Arc<dyn SynthesisEngine>,
        output: Box<dyn AudioSink>,
    ) -> Result<PipelineHandle> {
        source.start()?;

        let state = Arc::new(StateCell::new(PipelineState::Running));
        let dropped_frames = Arc::new(AtomicU64::new(0));

        let (frame_tx, frame_rx) = bounded(self.config.frame_buffer);
        let (segment_tx, segment_rx) = bounded(self.config.segment_buffer);
        let (transcript_tx, transcript_rx) = bounded(self.config.transcript_buffer);
        let (translation_tx, translation_rx) = bounded(self.config.translation_buffer);

        let mut segmenter_stage = SegmenterStage::new(self.config.segmenter);
        let mut recognizer_stage = RecognizerStage::new(
            recognition,
            self.config.source_lang.clone(),
            self.config.engine_timeout,
            self.config.retry,
        );
        let mut translator_stage = TranslatorStage::new(
            translation,
            Arc::clone(&self.cache),
            self.config.source_lang.clone(),
            self.config.target_lang.clone(),
            self.config.engine_timeout,
            self.config.retry,
        );
        let mut speaker_stage = SpeakerStage::new(
            synthesis,
            output,
            self.config.engine_timeout,
            self.config.retry,
        );

        if let Some(ref event_tx) = self.config.event_tx {
            segmenter_stage = segmenter_stage.with_event_sender(event_tx.clone());
            recognizer_stage = recognizer_stage.with_event_sender(event_tx.clone());
            translator_stage = translator_stage.with_event_sender(event_tx.clone());
            speaker_stage = speaker_stage.with_event_sender(event_tx.clone());
        }

        let runners = vec![
            StageRunner::spawn(
                segmenter_stage,
                frame_rx.clone(),
                segment_tx,
                self.error_reporter.clone(),
            ),
            StageRunner::spawn(
                recognizer_stage,
                segment_rx,
                transcript_tx,
                self.error_reporter.clone(),
            ),
            StageRunner::spawn(
                translator_stage,
                transcript_rx,
                translation_tx,
                self.error_reporter.clone(),
            ),
            StageRunner::spawn_terminal(speaker_stage, translation_rx, self.error_reporter.clone()),
        ];

        // Capture loop. Exits when stop is requested or the source reports
        // exhaustion; dropping frame_tx then propagates shutdown stage by
        // stage (each worker flushes and hangs up its own output).
        let capture_state = Arc::clone(&state);
        let capture_dropped = Arc::clone(&dropped_frames);
        let poll_interval = self.config.capture_poll_interval;
        let capture = thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || {
                let mut sequence = 0u64;
                while capture_state.load() == PipelineState::Running {
                    match source.read_chunk() {
                        Ok(Some(samples)) if samples.is_empty() => {
                            thread::sleep(poll_interval);
                        }
                        Ok(Some(samples)) => {
                            let frame = AudioFrame::new(samples, Instant::now(), sequence);
                            sequence += 1;
                            let evicted = send_or_drop_oldest(&frame_tx, &frame_rx, frame);
                            if evicted > 0 {
                                let total = capture_dropped
                                    .fetch_add(evicted as u64, Ordering::Relaxed)
                                    + evicted as u64;
                                log::warn!(
                                    "raw audio queue full: evicted {} oldest frame(s) ({} total)",
                                    evicted,
                                    total
                                );
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            log::warn!("audio read failed: {}", e);
                            thread::sleep(poll_interval);
                        }
                    }
                }
                if let Err(e) = source.stop() {
                    log::warn!("failed to stop audio source: {}", e);
                }
            })?;

        Ok(PipelineHandle {
            state,
            capture: Some(capture),
            runners,
            dropped_frames,
        })
    }
}

/// Sends a frame to Q1, evicting the oldest queued frame when full.
///
/// Raw audio is the one queue where blocking is wrong: capture cannot pause,
/// so under sustained overload the oldest audio is the least valuable.
/// Returns the number of frames evicted.
fn send_or_drop_oldest(
    tx: &Sender<AudioFrame>,
    rx: &Receiver<AudioFrame>,
    frame: AudioFrame,
) -> usize {
    let mut frame = frame;
    let mut evicted = 0;
    loop {
        match tx.try_send(frame) {
            Ok(()) => return evicted,
            Err(TrySendError::Full(returned)) => {
                if rx.try_recv().is_ok() {
                    evicted += 1;
                }
                frame = returned;
            }
            Err(TrySendError::Disconnected(_)) => return evicted,
        }
    }
}
