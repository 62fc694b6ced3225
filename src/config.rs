use crate::defaults;
use crate::error::{ParloError, Result};
use crate::languages;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub languages: LanguageConfig,
    pub audio: AudioConfig,
    pub engine: EngineConfig,
    pub cache: CacheConfig,
}

/// Language pair configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language being spoken into the microphone.
    pub source: String,
    /// Language spoken back through the output device.
    pub target: String,
}

/// Audio capture and segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub chunk_size: usize,
    /// RMS threshold (0.0 to 1.0) above which a frame counts as speech.
    pub energy_threshold: f32,
    /// Adapt the threshold to ambient noise instead of using a static value.
    pub dynamic_energy: bool,
    pub silence_duration_ms: u32,
    pub phrase_time_limit_ms: u32,
}

/// External engine call configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

/// Translation result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            source: defaults::SOURCE_LANGUAGE.to_string(),
            target: defaults::TARGET_LANGUAGE.to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            chunk_size: defaults::CHUNK_SIZE,
            energy_threshold: defaults::ENERGY_THRESHOLD,
            dynamic_energy: defaults::DYNAMIC_ENERGY,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            phrase_time_limit_ms: defaults::PHRASE_TIME_LIMIT_MS,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: defaults::ENGINE_TIMEOUT.as_millis() as u64,
            max_attempts: defaults::MAX_ATTEMPTS,
            retry_delay_ms: defaults::RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: defaults::CACHE_MAX_ENTRIES,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Only falls back to defaults when the file is missing; invalid TOML is
    /// still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PARLO_SOURCE_LANG → languages.source
    /// - PARLO_TARGET_LANG → languages.target
    /// - PARLO_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(source) = std::env::var("PARLO_SOURCE_LANG")
            && !source.is_empty()
        {
            self.languages.source = source;
        }

        if let Ok(target) = std::env::var("PARLO_TARGET_LANG")
            && !target.is_empty()
        {
            self.languages.target = target;
        }

        if let Ok(device) = std::env::var("PARLO_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Validate the configuration.
    ///
    /// Invalid configuration is fatal: the pipeline refuses to start rather
    /// than running with a language no engine understands or a threshold that
    /// can never trigger.
    pub fn validate(&self) -> Result<()> {
        if !languages::is_supported(&self.languages.source) {
            return Err(ParloError::ConfigInvalidValue {
                key: "languages.source".to_string(),
                message: format!("unknown language code '{}'", self.languages.source),
            });
        }
        if !languages::is_supported(&self.languages.target) {
            return Err(ParloError::ConfigInvalidValue {
                key: "languages.target".to_string(),
                message: format!("unknown language code '{}'", self.languages.target),
            });
        }
        if self.audio.sample_rate == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.chunk_size == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.chunk_size".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.energy_threshold <= 0.0 || self.audio.energy_threshold >= 1.0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.energy_threshold".to_string(),
                message: "must be between 0.0 and 1.0 exclusive".to_string(),
            });
        }
        if self.audio.silence_duration_ms == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.silence_duration_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.phrase_time_limit_ms == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "audio.phrase_time_limit_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.engine.timeout_ms == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "engine.timeout_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.engine.max_attempts == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "engine.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.cache.max_entries == 0 {
            return Err(ParloError::ConfigInvalidValue {
                key: "cache.max_entries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
