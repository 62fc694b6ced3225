//! Audio input: capture sources, energy measurement, and utterance segmentation.

#[cfg(feature = "devices")]
pub mod capture;
pub mod energy;
pub mod segmenter;
pub mod source;

#[cfg(feature = "devices")]
pub use capture::CpalSource;
pub use energy::{AmbientTracker, calculate_rms};
pub use segmenter::{Segmenter, SegmenterConfig};
pub use source::{AudioSource, MockAudioSource};
