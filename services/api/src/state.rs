//! Shared Application State
//!
//! Holds the reasoning-service client and the read-only pipeline settings.
//! Every request builds its own orchestrator run, so no run state is shared.

use learnpath_core::{AgentClient, Orchestrator, PipelineSettings};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn AgentClient>,
    pub settings: Arc<PipelineSettings>,
}

impl AppState {
    pub fn new(client: Arc<dyn AgentClient>, settings: PipelineSettings) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
        }
    }

    /// An orchestrator over the shared client and settings.
    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.client.clone(), &self.settings)
    }
}
