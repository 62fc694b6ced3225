//! Streaming translation pipeline.
//!
//! A multi-stage pipeline where each stage runs in its own thread, connected
//! by bounded crossbeam channels for backpressure. Shutdown propagates as a
//! poison signal: closing the raw-audio queue makes each stage flush,
//! forward the closure, and exit in turn.

pub mod error;
pub mod event;
pub mod orchestrator;
pub mod recognizer_stage;
pub mod segmenter_stage;
pub mod speaker_stage;
pub mod stage;
pub mod state;
pub mod translator_stage;
pub mod types;

pub use error::{ErrorReporter, LogReporter, StageError};
pub use event::PipelineEvent;
pub use orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use recognizer_stage::RecognizerStage;
pub use segmenter_stage::SegmenterStage;
pub use speaker_stage::SpeakerStage;
pub use stage::{Stage, StageRunner};
pub use state::{PipelineState, StateCell};
pub use translator_stage::TranslatorStage;
pub use types::{AudioFrame, AudioSegment, Transcript, Translation};
