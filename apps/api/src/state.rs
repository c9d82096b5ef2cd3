use crate::analysis::workflow::Workflow;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable after startup; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Workflow,
    pub config: Config,
}
