//! Agent Wrappers
//!
//! Each agent pairs the shared [`AgentClient`](crate::agent_client::AgentClient)
//! with a fixed role instruction and the parser for its expected output. They
//! classify failures as [`AgentError`](crate::error::AgentError) and leave
//! every abort/continue decision to the orchestrator.

pub mod curriculum;
pub mod project_planner;
pub mod resource_finder;

pub use curriculum::CurriculumAgent;
pub use project_planner::ProjectPlannerAgent;
pub use resource_finder::ResourceFinderAgent;
