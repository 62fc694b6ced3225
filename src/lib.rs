//! parlo - real-time speech-to-speech translation
//!
//! Listens → recognizes → translates → speaks, continuously: a staged
//! pipeline that segments a live audio stream on silence, transcribes each
//! utterance, translates it (through a bounded LRU result cache), and plays
//! the synthesized translation — all while new audio keeps arriving.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cache;
pub mod config;
pub mod defaults;
pub mod engines;
pub mod error;
pub mod languages;
pub mod pipeline;

// Core traits (source → stages → sink)
pub use audio::source::AudioSource;
pub use engines::playback::AudioSink;
pub use engines::recognition::RecognitionEngine;
pub use engines::synthesis::SynthesisEngine;
pub use engines::translation::TranslationEngine;

// Pipeline
pub use pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use pipeline::state::PipelineState;

// Error handling
pub use error::{ParloError, Result};

// Config
pub use config::Config;

// Cache
pub use cache::{CacheKey, CacheStats, ResultCache};

// Stage framework (for advanced users)
pub use pipeline::error::{ErrorReporter, StageError};
pub use pipeline::event::PipelineEvent;
pub use pipeline::stage::Stage;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        // In a git repo build, GIT_HASH is set → expect "0.1.0+<hash>"
        // In CI without git, expect plain "0.1.0"
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(
                hash_part.len(),
                7,
                "Git hash should be 7 chars, got: {}",
                hash_part
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
