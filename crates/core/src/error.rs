//! Error Taxonomy
//!
//! Typed errors for every failure the pipeline can classify. Agent wrappers
//! return [`AgentError`]; only the orchestrator decides whether one aborts a
//! run or degrades a single section of the plan.

use serde::Serialize;
use std::fmt;

/// The three agent roles the pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Curriculum,
    ResourceFinder,
    ProjectPlanner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Curriculum => "curriculum_agent",
            Role::ResourceFinder => "resource_finder_agent",
            Role::ProjectPlanner => "project_planner_agent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad classification of a reasoning-service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    /// Transport-level failure (DNS, connection reset, TLS).
    Network,
    /// Quota exhausted or rate limit hit.
    RateLimited,
    /// The call exceeded its bounded wait.
    Timeout,
    /// The service answered with neither text nor a tool call.
    EmptyResponse,
    /// The service rejected the request for any other reason.
    Rejected,
    /// The request could not be built or the response could not be decoded.
    Protocol,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceErrorKind::Network => "network failure",
            ServiceErrorKind::RateLimited => "rate limited",
            ServiceErrorKind::Timeout => "timed out",
            ServiceErrorKind::EmptyResponse => "empty response",
            ServiceErrorKind::Rejected => "request rejected",
            ServiceErrorKind::Protocol => "protocol error",
        };
        f.write_str(s)
    }
}

/// A failed call to the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} call failed after {attempts} attempt(s): {kind}: {message}")]
pub struct ServiceError {
    pub role: Role,
    pub attempts: u32,
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(role: Role, kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            role,
            attempts: 1,
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(role: Role, waited: std::time::Duration) -> Self {
        Self::new(
            role,
            ServiceErrorKind::Timeout,
            format!("no response within {}ms", waited.as_millis()),
        )
    }
}

/// Agent text that could not be interpreted as the expected record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse agent output: {reason}")]
pub struct ParseFailure {
    pub reason: String,
    pub raw_text: String,
}

impl ParseFailure {
    pub fn new(reason: impl Into<String>, raw_text: &str) -> Self {
        Self {
            reason: reason.into(),
            raw_text: raw_text.to_string(),
        }
    }
}

/// What an agent wrapper returns when it cannot produce its record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Parse(#[from] ParseFailure),
}

/// A topic that is blank after trimming.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("topic must not be empty")]
pub struct EmptyTopic;
