//! Audio output devices.

use crate::error::Result;
use std::sync::{Arc, Mutex};

/// Trait for audio output devices.
///
/// `play` blocks until playback completes, so consecutive utterances never
/// overlap. The pipeline's final stage relies on this to keep spoken output
/// serialized.
pub trait AudioSink: Send {
    /// Play encoded audio bytes, blocking until done.
    fn play(&mut self, audio: &[u8]) -> Result<()>;
}

/// Shared record of everything a [`MockAudioSink`] has played.
pub type PlaybackLog = Arc<Mutex<Vec<Vec<u8>>>>;

/// Mock audio sink that records playback instead of producing sound.
pub struct MockAudioSink {
    played: PlaybackLog,
    fail_always: bool,
}

impl MockAudioSink {
    /// Create a new mock sink.
    pub fn new() -> Self {
        Self {
            played: Arc::new(Mutex::new(Vec::new())),
            fail_always: false,
        }
    }

    /// Configure the sink to fail on every play
    pub fn with_failure(mut self) -> Self {
        self.fail_always = true;
        self
    }

    /// Handle for inspecting what was played after the sink has been moved
    /// into the pipeline.
    pub fn log(&self) -> PlaybackLog {
        Arc::clone(&self.played)
    }
}

impl Default for MockAudioSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for MockAudioSink {
    fn play(&mut self, audio: &[u8]) -> Result<()> {
        if self.fail_always {
            return Err(crate::error::ParloError::Playback {
                message: "mock playback failure".to_string(),
            });
        }
        if let Ok(mut played) = self.played.lock() {
            played.push(audio.to_vec());
        }
        Ok(())
    }
}

/// Real audio sink backed by rodio.
///
/// The output stream is opened per utterance and dropped when playback
/// finishes, so the struct stays `Send` and the device is released between
/// utterances.
#[cfg(feature = "devices")]
pub struct RodioSink;

#[cfg(feature = "devices")]
impl RodioSink {
    /// Create a new rodio-backed sink.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "devices")]
impl Default for RodioSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "devices")]
impl AudioSink for RodioSink {
    fn play(&mut self, audio: &[u8]) -> Result<()> {
        use crate::error::ParloError;

        let stream_handle = rodio::OutputStreamBuilder::open_default_stream().map_err(|e| {
            ParloError::Playback {
                message: format!("failed to open output stream: {}", e),
            }
        })?;
        let sink = rodio::Sink::connect_new(stream_handle.mixer());

        let cursor = std::io::Cursor::new(audio.to_vec());
        let decoder = rodio::Decoder::new(cursor).map_err(|e| ParloError::Playback {
            message: format!("failed to decode audio: {}", e),
        })?;

        sink.append(decoder);
        sink.sleep_until_end();
        Ok(())
    }
}
