//! Learning Plan Data Model
//!
//! The records produced by the agents and the `LearningPlan` the orchestrator
//! assembles from them. A plan is only ever handed out fully populated.

use crate::error::EmptyTopic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user-supplied learning topic, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmptyTopic> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptyTopic);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = EmptyTopic;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Topic::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of the curriculum, positioned by its 1-based `index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub index: usize,
    pub title: String,
    pub description: String,
}

/// An external reference attached to a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    pub note: String,
}

/// The capstone project suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIdea {
    pub title: String,
    pub description: String,
}

impl ProjectIdea {
    /// Stand-in used when the project planner could not produce an idea.
    pub fn placeholder() -> Self {
        Self {
            title: "Capstone project unavailable".to_string(),
            description: "Could not generate project idea.".to_string(),
        }
    }
}

/// Where the content of a plan section came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// Parsed from the agent's own answer.
    Agent,
    /// Empty or placeholder content substituted after a failure.
    Fallback { reason: String },
}

impl Provenance {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Provenance::Fallback { .. })
    }
}

/// A module together with the resources found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePlan {
    #[serde(flatten)]
    pub module: Module,
    pub resources: Vec<Resource>,
    pub resources_source: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    #[serde(flatten)]
    pub idea: ProjectIdea,
    pub source: Provenance,
}

/// The finished curriculum returned by a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPlan {
    pub topic: Topic,
    pub modules: Vec<ModulePlan>,
    pub project: ProjectSection,
    pub generated_at: DateTime<Utc>,
}

impl LearningPlan {
    /// True when any section was filled with fallback content.
    pub fn is_degraded(&self) -> bool {
        self.project.source.is_fallback()
            || self.modules.iter().any(|m| m.resources_source.is_fallback())
    }

    /// Human-readable names of the sections that used fallback content.
    pub fn degraded_sections(&self) -> Vec<String> {
        let mut sections: Vec<String> = self
            .modules
            .iter()
            .filter(|m| m.resources_source.is_fallback())
            .map(|m| format!("resources for module {}", m.module.index))
            .collect();
        if self.project.source.is_fallback() {
            sections.push("capstone project".to_string());
        }
        sections
    }
}
