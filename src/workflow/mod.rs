pub mod classify;
pub mod collection;
pub mod dashboard;
pub mod orchestrator;
