// Application layer - Orchestration use cases and the driver seam
pub mod orchestrator;
pub mod relay_driver;
pub mod status_service;
