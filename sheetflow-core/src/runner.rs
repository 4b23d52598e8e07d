//! Pipeline runner
//!
//! Executes the ordered steps on a background task, streaming lifecycle
//! events to subscribers. The first failing step aborts the run; a
//! successful run finishes by copying the mutated destination file into
//! the output location.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info};

use crate::broadcast::EventBroadcaster;
use crate::domain::event::PipelineEvent;
use crate::domain::paths::SheetPaths;
use crate::domain::step::Step;
use crate::error::PipelineError;
use crate::paths::PathManager;
use crate::registry::PipelineRegistry;
use crate::transfer::StepExecutor;

/// Drives pipeline runs against the current path state
pub struct PipelineRunner {
    registry: Arc<PipelineRegistry>,
    paths: Arc<PathManager>,
    executor: Arc<dyn StepExecutor>,
    events: EventBroadcaster,
    running: AtomicBool,
}

impl PipelineRunner {
    pub fn new(
        registry: Arc<PipelineRegistry>,
        paths: Arc<PathManager>,
        executor: Arc<dyn StepExecutor>,
        events: EventBroadcaster,
    ) -> Self {
        Self {
            registry,
            paths,
            executor,
            events,
            running: AtomicBool::new(false),
        }
    }

    /// Starts one pipeline run on a background task
    ///
    /// With `step_order` present the registry is reordered first; a
    /// rejected order emits `pipeline_error` and starts nothing. A
    /// missing upload emits a single `step_error` naming the first step
    /// and starts nothing. Only one run may be in flight at a time.
    ///
    /// Every failure is surfaced as exactly one event; the caller has
    /// nothing to await.
    pub fn start(self: &Arc<Self>, step_order: Option<Vec<String>>) {
        if let Some(order) = step_order {
            if let Err(e) = self.registry.reorder(&order) {
                error!("rejected pipeline start: {e}");
                self.events.send(PipelineEvent::pipeline_error(e.to_string()));
                return;
            }
        }

        // Snapshot order and paths now; later reorders and uploads must
        // not affect this run.
        let steps = self.registry.snapshot();

        let Some(paths) = self.paths.snapshot() else {
            if let Some(first) = steps.first() {
                self.events.send(PipelineEvent::step_error(
                    first.id,
                    PipelineError::MissingInput.to_string(),
                ));
            }
            return;
        };

        if self.running.swap(true, Ordering::SeqCst) {
            self.events.send(PipelineEvent::pipeline_error(
                "a pipeline run is already in progress",
            ));
            return;
        }

        let runner = Arc::clone(self);
        tokio::spawn(async move {
            runner.run(&steps, &paths);
            runner.running.store(false, Ordering::SeqCst);
        });
    }

    /// Runs all steps sequentially, then finalizes the output artifact
    fn run(&self, steps: &[Step], paths: &SheetPaths) {
        info!("starting pipeline run with {} step(s)", steps.len());

        for step in steps {
            debug!("executing step '{}'", step.id);
            self.events.send(PipelineEvent::StepStart { step_id: step.id });

            match self.executor.execute(step.id, paths) {
                Ok(()) => {
                    self.events
                        .send(PipelineEvent::StepComplete { step_id: step.id });
                }
                Err(e) => {
                    error!("error in step '{}': {e}", step.id);
                    self.events
                        .send(PipelineEvent::step_error(step.id, e.to_string()));
                    return;
                }
            }
        }

        self.finalize(paths);
    }

    /// Copies the mutated destination to the output path
    ///
    /// Step success only guarantees each step's own save, so the file
    /// is re-checked here.
    fn finalize(&self, paths: &SheetPaths) {
        if !paths.destination.exists() {
            error!("destination file not found after pipeline execution");
            self.events
                .send(PipelineEvent::pipeline_error("failed to generate output file"));
            return;
        }

        match fs::copy(&paths.destination, &paths.output) {
            Ok(_) => {
                info!("copied final result to {}", paths.output.display());
                self.events.send(PipelineEvent::PipelineComplete {
                    output_file: paths.output_file_name(),
                });
            }
            Err(e) => {
                error!("error creating output file: {e}");
                self.events.send(PipelineEvent::pipeline_error(
                    PipelineError::OutputCopy(e.to_string()).to_string(),
                ));
            }
        }
    }
}
