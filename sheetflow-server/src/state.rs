//! Shared application state

use std::sync::Arc;

use sheetflow_core::broadcast::EventBroadcaster;
use sheetflow_core::paths::PathManager;
use sheetflow_core::registry::PipelineRegistry;
use sheetflow_core::runner::PipelineRunner;
use sheetflow_core::transfer::WorkbookStepExecutor;

use crate::config::ServerConfig;

/// State shared by every request handler and WebSocket session
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub paths: Arc<PathManager>,
    pub registry: Arc<PipelineRegistry>,
    pub runner: Arc<PipelineRunner>,
    pub events: EventBroadcaster,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let config = Arc::new(config);
        let events = EventBroadcaster::default();
        let paths = Arc::new(PathManager::new(
            config.output_dir.clone(),
            config.backup_dir.clone(),
        ));
        let registry = Arc::new(PipelineRegistry::new());
        let runner = Arc::new(PipelineRunner::new(
            Arc::clone(&registry),
            Arc::clone(&paths),
            Arc::new(WorkbookStepExecutor),
            events.clone(),
        ));

        Self {
            config,
            paths,
            registry,
            runner,
            events,
        }
    }
}
