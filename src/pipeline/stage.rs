//! Core stage abstraction and runner for the streaming pipeline.

use crate::pipeline::error::{ErrorReporter, StageError};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A processing stage in the streaming pipeline.
///
/// Each stage receives input, processes it, and produces output.
/// Stages run in their own threads and are connected by bounded channels.
pub trait Stage: Send + 'static {
    /// The input type this stage receives.
    type Input: Send + 'static;
    /// The output type this stage produces.
    type Output: Send + 'static;

    /// Processes a single input item.
    ///
    /// Returns:
    /// - `Ok(Some(output))` - Successfully processed and produced output
    /// - `Ok(None)` - Successfully processed but no output (e.g., still accumulating)
    /// - `Err(StageError)` - Processing failed
    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StageError>;

    /// Called once when the upstream channel closes, before shutdown.
    ///
    /// A stage that accumulates state across inputs (like the segmenter)
    /// returns its final item here so nothing in flight is lost on stop.
    fn flush(&mut self) -> Option<Self::Output> {
        None
    }

    /// Returns the name of this stage for logging and error reporting.
    fn name(&self) -> &'static str;

    /// Called when the stage is shutting down.
    fn shutdown(&mut self) {}
}

/// Runs a stage in a dedicated thread.
pub struct StageRunner {
    /// Handle to the spawned thread.
    handle: Option<JoinHandle<()>>,
    /// Name of the stage (cached for error reporting).
    stage_name: &'static str,
}

impl StageRunner {
    /// Spawns a stage in a dedicated thread.
    ///
    /// The stage exits when its input channel disconnects (the shutdown
    /// signal): it flushes, then drops its output sender, propagating the
    /// disconnect downstream.
    pub fn spawn<S: Stage>(
        mut stage: S,
        input_rx: Receiver<S::Input>,
        output_tx: Sender<S::Output>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let stage_name = stage.name();

        let handle = thread::spawn(move || {
            Self::run_stage(&mut stage, input_rx, Some(output_tx), error_reporter);
        });

        Self {
            handle: Some(handle),
            stage_name,
        }
    }

    /// Spawns a terminal stage (one with no downstream consumer).
    ///
    /// Outputs are discarded, so the stage's `Output` is typically `()`.
    pub fn spawn_terminal<S: Stage>(
        mut stage: S,
        input_rx: Receiver<S::Input>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let stage_name = stage.name();

        let handle = thread::spawn(move || {
            Self::run_stage(&mut stage, input_rx, None, error_reporter);
        });

        Self {
            handle: Some(handle),
            stage_name,
        }
    }

    /// Main processing loop for the stage.
    fn run_stage<S: Stage>(
        stage: &mut S,
        input_rx: Receiver<S::Input>,
        output_tx: Option<Sender<S::Output>>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) {
        let stage_name = stage.name();

        while let Ok(input) = input_rx.recv() {
            match stage.process(input) {
                Ok(Some(output)) => {
                    if let Some(ref tx) = output_tx
                        && tx.send(output).is_err()
                    {
                        // Downstream hung up, shutdown
                        break;
                    }
                }
                Ok(None) => {
                    // No output produced, continue
                }
                Err(StageError::Recoverable(msg)) => {
                    // Report but continue processing
                    error_reporter.report(stage_name, &StageError::Recoverable(msg));
                }
                Err(StageError::Fatal(msg)) => {
                    // Report and shutdown
                    error_reporter.report(stage_name, &StageError::Fatal(msg.clone()));
                    break;
                }
            }
        }

        // Upstream closed (or downstream gone): emit any accumulated item,
        // then clean up. Dropping output_tx propagates shutdown downstream.
        if let Some(output) = stage.flush()
            && let Some(ref tx) = output_tx
        {
            let _ = tx.send(output);
        }
        stage.shutdown();
    }

    /// Waits for the stage thread to complete.
    pub fn join(mut self) -> Result<(), String> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| format!("Stage '{}' thread panicked", self.stage_name))
        } else {
            Ok(())
        }
    }

    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        self.stage_name
    }
}
