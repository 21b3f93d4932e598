// Application state for HTTP handlers
use crate::application::orchestrator::ModeOrchestrator;
use crate::application::status_service::StatusService;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: ModeOrchestrator,
    pub status_service: StatusService,
}
