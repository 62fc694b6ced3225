//! Pipeline lifecycle state.
//!
//! The state machine is:
//!
//! ```text
//! Stopped ──start──▶ Running ──stop──▶ Draining ──workers exited──▶ Stopped
//! ```
//!
//! During `Draining` the capture loop has stopped accepting audio, but items
//! already inside the queues keep flowing until every stage has exited.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle states of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelineState {
    /// No workers running.
    Stopped = 0,
    /// All stage workers running, audio being accepted.
    Running = 1,
    /// Stop requested: no new audio, in-flight items draining.
    Draining = 2,
}

impl PipelineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PipelineState::Running,
            2 => PipelineState::Draining,
            _ => PipelineState::Stopped,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineState::Stopped => "stopped",
            PipelineState::Running => "running",
            PipelineState::Draining => "draining",
        };
        write!(f, "{}", label)
    }
}

/// The single synchronization point for lifecycle state.
///
/// Shared by the handle and every worker; the only cross-cutting mutable
/// state besides the queues and the result cache.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    /// Creates a cell in the given state.
    pub fn new(state: PipelineState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    /// Reads the current state.
    pub fn load(&self) -> PipelineState {
        PipelineState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Unconditionally sets the state.
    pub fn store(&self, state: PipelineState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Atomically moves `from → to`. Returns false if the state was not `from`.
    pub fn transition(&self, from: PipelineState, to: PipelineState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(PipelineState::Stopped)
    }
}
