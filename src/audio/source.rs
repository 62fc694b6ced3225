use crate::defaults;
use crate::error::{ParloError, Result};
use std::collections::VecDeque;

/// Trait for audio input devices.
///
/// This trait allows swapping implementations (real microphone vs mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read the samples captured since the last call.
    ///
    /// # Returns
    /// - `Ok(Some(samples))` - captured samples (possibly empty if nothing
    ///   has arrived yet)
    /// - `Ok(None)` - the source is exhausted and will never produce more
    /// - `Err(_)` - a read failure; the caller may retry
    fn read_chunk(&mut self) -> Result<Option<Vec<i16>>>;
}

/// Configuration for audio source initialization
#[derive(Debug, Clone)]
pub struct AudioSourceConfig {
    pub sample_rate: u32,
    pub chunk_size: usize,
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            chunk_size: defaults::CHUNK_SIZE,
        }
    }
}

/// Mock audio source scripted from sample chunks, for testing.
///
/// Yields its chunks in order, then reports exhaustion — or, with
/// `holding_open`, reports an empty read forever so the pipeline keeps
/// running until explicitly stopped.
#[derive(Debug, Clone, Default)]
pub struct MockAudioSource {
    chunks: VecDeque<Vec<i16>>,
    holding_open: bool,
    is_started: bool,
    should_fail_start: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a mock source with no scripted audio.
    pub fn new() -> Self {
        Self {
            error_message: "mock audio error".to_string(),
            ..Self::default()
        }
    }

    /// Script the chunks this source will yield, in order.
    pub fn with_chunks(mut self, chunks: Vec<Vec<i16>>) -> Self {
        self.chunks = chunks.into();
        self
    }

    /// Keep the source open after the script runs out, reporting empty reads
    /// instead of exhaustion.
    pub fn holding_open(mut self) -> Self {
        self.holding_open = true;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Check if the source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(ParloError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<Option<Vec<i16>>> {
        match self.chunks.pop_front() {
            Some(chunk) => Ok(Some(chunk)),
            None if self.holding_open => Ok(Some(Vec::new())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_yields_chunks_in_order() {
        let mut source =
            MockAudioSource::new().with_chunks(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);

        source.start().unwrap();
        assert!(source.is_started());

        assert_eq!(source.read_chunk().unwrap(), Some(vec![1, 2]));
        assert_eq!(source.read_chunk().unwrap(), Some(vec![3, 4]));
        assert_eq!(source.read_chunk().unwrap(), Some(vec![5, 6]));
        assert_eq!(source.read_chunk().unwrap(), None);
    }

    #[test]
    fn test_mock_source_holding_open_reports_empty() {
        let mut source = MockAudioSource::new()
            .with_chunks(vec![vec![1]])
            .holding_open();

        assert_eq!(source.read_chunk().unwrap(), Some(vec![1]));
        assert_eq!(source.read_chunk().unwrap(), Some(vec![]));
        assert_eq!(source.read_chunk().unwrap(), Some(vec![]));
    }

    #[test]
    fn test_mock_source_start_failure() {
        let mut source = MockAudioSource::new().with_start_failure();

        match source.start() {
            Err(ParloError::AudioCapture { message }) => {
                assert_eq!(message, "mock audio error");
            }
            other => panic!("Expected AudioCapture error, got {:?}", other),
        }
        assert!(!source.is_started());
    }

    #[test]
    fn test_mock_source_stop_clears_started() {
        let mut source = MockAudioSource::new();
        source.start().unwrap();
        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn test_source_config_default() {
        let config = AudioSourceConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.chunk_size, 1024);
    }
}
