//! External engine boundaries.
//!
//! Recognition, translation, and synthesis are black boxes behind one-method
//! traits, so tests run against mocks with no network access. The calling
//! stage owns the timeout and retry policy; the engines themselves only
//! report success or failure.

pub mod playback;
pub mod recognition;
pub mod retry;
pub mod synthesis;
pub mod translation;

pub use playback::{AudioSink, MockAudioSink, PlaybackLog};
pub use recognition::{MockRecognitionEngine, RecognitionEngine};
pub use retry::{RetryPolicy, call_with_timeout, run_with_retry};
pub use synthesis::{MockSynthesisEngine, SynthesisEngine};
pub use translation::{MockTranslationEngine, TranslationEngine};

#[cfg(feature = "devices")]
pub use playback::RodioSink;
