//! End-to-end pipeline tests with mock source, engines, and sink.
//!
//! No audio hardware and no network: the source is scripted PCM, the engines
//! are deterministic mocks, and the sink records what would have been spoken.

use crossbeam_channel::Receiver;
use parlo::audio::segmenter::SegmenterConfig;
use parlo::audio::source::MockAudioSource;
use parlo::engines::playback::MockAudioSink;
use parlo::engines::recognition::MockRecognitionEngine;
use parlo::engines::retry::RetryPolicy;
use parlo::engines::synthesis::MockSynthesisEngine;
use parlo::engines::translation::MockTranslationEngine;
use parlo::pipeline::{Pipeline, PipelineConfig, PipelineEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 100ms of audio per frame at 16kHz.
const FRAME: usize = 1600;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn voiced_frames(count: usize) -> Vec<Vec<i16>> {
    // RMS ~0.09, well above the 0.02 threshold.
    vec![vec![3000i16; FRAME]; count]
}

fn silent_frames(count: usize) -> Vec<Vec<i16>> {
    vec![vec![0i16; FRAME]; count]
}

/// One utterance: `voiced` frames of speech followed by enough silence to
/// close the segment (gap threshold is 300ms in `test_config`).
fn utterance(voiced: usize) -> Vec<Vec<i16>> {
    let mut chunks = voiced_frames(voiced);
    chunks.extend(silent_frames(4));
    chunks
}

fn test_config() -> PipelineConfig {
    PipelineConfig {
        segmenter: SegmenterConfig {
            sample_rate: 16000,
            energy_threshold: 0.02,
            dynamic_energy: false,
            silence_duration_ms: 300,
            phrase_time_limit_ms: 5000,
        },
        engine_timeout: Duration::from_secs(1),
        retry: RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
        },
        capture_poll_interval: Duration::from_millis(1),
        // Scripted sources deliver frames faster than real time; a roomy Q1
        // keeps these tests exercising ordering, not the overload policy.
        frame_buffer: 64,
        ..Default::default()
    }
}

/// Receives events until `spoken` utterances have completed playback, with a
/// deadline so a wedged pipeline fails the test instead of hanging it.
fn wait_for_spoken(events: &Receiver<PipelineEvent>, spoken: usize) -> Vec<PipelineEvent> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut seen = Vec::new();
    let mut spoken_count = 0;
    while spoken_count < spoken {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .unwrap_or(Duration::ZERO);
        match events.recv_timeout(remaining) {
            Ok(event) => {
                if matches!(event, PipelineEvent::Spoken { .. }) {
                    spoken_count += 1;
                }
                seen.push(event);
            }
            Err(_) => panic!(
                "timed out waiting for {} spoken utterances, saw: {:?}",
                spoken, seen
            ),
        }
    }
    seen
}

fn played_texts(log: &parlo::engines::playback::PlaybackLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

#[test]
fn utterances_are_spoken_in_capture_order() {
    init_logging();

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut config = test_config();
    config.event_tx = Some(event_tx);

    // Three utterances of different lengths, then the source closes.
    let mut chunks = Vec::new();
    chunks.extend(utterance(10));
    chunks.extend(utterance(5));
    chunks.extend(utterance(8));

    let sink = MockAudioSink::new();
    let log = sink.log();

    let pipeline = Pipeline::new(config).unwrap();
    let handle = pipeline
        .start(
            Box::new(MockAudioSource::new().with_chunks(chunks).holding_open()),
            Arc::new(
                MockRecognitionEngine::new()
                    .echoing_sequence()
                    .with_latency(Duration::from_millis(10)),
            ),
            Arc::new(MockTranslationEngine::new()),
            Arc::new(MockSynthesisEngine::new()),
            Box::new(sink),
        )
        .unwrap();

    wait_for_spoken(&event_rx, 3);
    handle.stop();

    assert_eq!(
        played_texts(&log),
        vec![
            "[es] utterance 0".to_string(),
            "[es] utterance 1".to_string(),
            "[es] utterance 2".to_string(),
        ]
    );
}

#[test]
fn failed_segment_does_not_block_subsequent_segments() {
    init_logging();

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut config = test_config();
    config.event_tx = Some(event_tx);

    let mut chunks = Vec::new();
    for _ in 0..3 {
        chunks.extend(utterance(5));
    }

    let sink = MockAudioSink::new();
    let log = sink.log();

    let pipeline = Pipeline::new(config).unwrap();
    let handle = pipeline
        .start(
            Box::new(MockAudioSource::new().with_chunks(chunks).holding_open()),
            Arc::new(
                MockRecognitionEngine::new()
                    .echoing_sequence()
                    .failing_on_sequence(1),
            ),
            Arc::new(MockTranslationEngine::new()),
            Arc::new(MockSynthesisEngine::new()),
            Box::new(sink),
        )
        .unwrap();

    let events = wait_for_spoken(&event_rx, 2);
    handle.stop();

    // Utterance 1 was dropped after exhausted retries; 0 and 2 still played,
    // in order.
    assert_eq!(
        played_texts(&log),
        vec![
            "[es] utterance 0".to_string(),
            "[es] utterance 2".to_string(),
        ]
    );
    assert!(events.iter().any(|e| matches!(
        e,
        PipelineEvent::ItemDropped {
            stage: "recognizer",
            sequence: 1,
            ..
        }
    )));
}

#[test]
fn repeated_phrase_is_served_from_cache() {
    init_logging();

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut config = test_config();
    config.event_tx = Some(event_tx);

    let mut chunks = Vec::new();
    chunks.extend(utterance(5));
    chunks.extend(utterance(5));

    let translation_engine = Arc::new(MockTranslationEngine::new());
    let sink = MockAudioSink::new();
    let log = sink.log();

    let pipeline = Pipeline::new(config).unwrap();
    let cache = pipeline.cache();
    let handle = pipeline
        .start(
            Box::new(MockAudioSource::new().with_chunks(chunks).holding_open()),
            // Same phrase recognized for both utterances.
            Arc::new(MockRecognitionEngine::new().with_response("good morning")),
            translation_engine.clone(),
            Arc::new(MockSynthesisEngine::new()),
            Box::new(sink),
        )
        .unwrap();

    let events = wait_for_spoken(&event_rx, 2);
    handle.stop();

    // Both utterances spoken, but the engine translated only once.
    assert_eq!(played_texts(&log).len(), 2);
    assert_eq!(translation_engine.call_count(), 1);

    let cache_flags: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Translated { from_cache, .. } => Some(*from_cache),
            _ => None,
        })
        .collect();
    assert_eq!(cache_flags, vec![false, true]);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn stop_drains_in_flight_items_including_segmenter_flush() {
    init_logging();

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut config = test_config();
    config.event_tx = Some(event_tx);

    // One complete utterance, then speech still in progress (no closing
    // silence) when stop arrives.
    let mut chunks = Vec::new();
    chunks.extend(utterance(5));
    chunks.extend(voiced_frames(5));

    let sink = MockAudioSink::new();
    let log = sink.log();

    let pipeline = Pipeline::new(config).unwrap();
    let handle = pipeline
        .start(
            Box::new(MockAudioSource::new().with_chunks(chunks).holding_open()),
            Arc::new(MockRecognitionEngine::new().echoing_sequence()),
            Arc::new(MockTranslationEngine::new()),
            Arc::new(MockSynthesisEngine::new()),
            Box::new(sink),
        )
        .unwrap();

    // First utterance plays while the second is still being spoken into the
    // microphone.
    wait_for_spoken(&event_rx, 1);
    assert!(handle.is_running());
    handle.stop();

    // stop() returns only after the flushed second utterance made it all the
    // way through playback.
    assert_eq!(
        played_texts(&log),
        vec![
            "[es] utterance 0".to_string(),
            "[es] utterance 1".to_string(),
        ]
    );
}

#[test]
fn sustained_overload_evicts_oldest_frames_not_memory() {
    init_logging();

    let mut config = test_config();
    // Short phrases so continuous speech produces many segments, and a small
    // raw-audio queue so overload shows quickly.
    config.segmenter.phrase_time_limit_ms = 500;
    config.frame_buffer = 8;

    let sink = MockAudioSink::new();

    let pipeline = Pipeline::new(config).unwrap();
    let handle = pipeline
        .start(
            // 100 frames arrive as fast as the capture loop can read them.
            Box::new(
                MockAudioSource::new()
                    .with_chunks(voiced_frames(100))
                    .holding_open(),
            ),
            // Slow recognition backs the pipeline up to Q1.
            Arc::new(
                MockRecognitionEngine::new()
                    .with_response("overloaded")
                    .with_latency(Duration::from_millis(50)),
            ),
            Arc::new(MockTranslationEngine::new()),
            Arc::new(MockSynthesisEngine::new()),
            Box::new(sink),
        )
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while handle.dropped_frames() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    let dropped = handle.dropped_frames();
    handle.stop();

    assert!(
        dropped > 0,
        "expected Q1 to evict oldest frames under overload"
    );
}

#[test]
fn playback_failure_does_not_stop_the_pipeline() {
    init_logging();

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut config = test_config();
    config.event_tx = Some(event_tx);

    let mut chunks = Vec::new();
    chunks.extend(utterance(5));
    chunks.extend(utterance(5));

    let pipeline = Pipeline::new(config).unwrap();
    let handle = pipeline
        .start(
            Box::new(MockAudioSource::new().with_chunks(chunks).holding_open()),
            Arc::new(MockRecognitionEngine::new().echoing_sequence()),
            Arc::new(MockTranslationEngine::new()),
            Arc::new(MockSynthesisEngine::new()),
            Box::new(MockAudioSink::new().with_failure()),
        )
        .unwrap();

    // Both utterances are dropped at the speaker, and the pipeline stays up
    // for each of them rather than dying on the first.
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut dropped = 0;
    while dropped < 2 {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .unwrap_or(Duration::ZERO);
        match event_rx.recv_timeout(remaining) {
            Ok(PipelineEvent::ItemDropped {
                stage: "speaker", ..
            }) => dropped += 1,
            Ok(_) => {}
            Err(_) => panic!("timed out waiting for speaker drops"),
        }
    }
    assert!(handle.is_running());
    handle.stop();
}
