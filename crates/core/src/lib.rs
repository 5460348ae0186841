pub mod agent_client;
pub mod agents;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod retry;
pub mod search;

pub use agent_client::{AgentClient, AgentRequest, OpenAICompatibleClient, Tool};
pub use config::{Config, ConfigError};
pub use error::{AgentError, ParseFailure, Role, ServiceError, ServiceErrorKind};
pub use models::{LearningPlan, Module, ModulePlan, ProjectIdea, Provenance, Resource, Topic};
pub use orchestrator::{Orchestrator, PipelineFailure, PipelineSettings, RunContext, RunOutcome};
pub use progress::{ProgressEvent, Stage};
pub use retry::RetryPolicy;
