//! API Models
//!
//! Request and response bodies for the REST and WebSocket surfaces, with
//! `utoipa` schemas for the OpenAPI documentation. Conversions to and from the
//! core plan types live here so the core crate stays free of web concerns.

use chrono::{DateTime, Utc};
use learnpath_core::{
    AgentError, LearningPlan, Module, ModulePlan, PipelineFailure, ProjectIdea, Provenance,
    Resource, Topic,
    models::ProjectSection,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug)]
pub struct CreatePlanPayload {
    #[schema(example = "Learn Python for Data Analysis")]
    pub topic: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ResourceResponse {
    pub title: String,
    #[schema(example = "https://pandas.pydata.org/docs/getting_started/")]
    pub url: String,
    pub note: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ModuleResponse {
    #[schema(example = 1)]
    pub index: usize,
    pub title: String,
    pub description: String,
    pub resources: Vec<ResourceResponse>,
    /// Set when the resources could not be found; holds the reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_fallback: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ProjectResponse {
    pub title: String,
    pub description: String,
    /// Set when a placeholder replaced the generated project; holds the reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// A completed learning plan.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct PlanResponse {
    #[schema(example = "Learn Python for Data Analysis")]
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub modules: Vec<ModuleResponse>,
    pub project: ProjectResponse,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default)]
    pub degraded_sections: Vec<String>,
}

/// Why a run stopped without a plan.
#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct FailureResponse {
    #[schema(example = "resources")]
    pub stage: String,
    pub module: Option<usize>,
    /// `parse` or the service error kind, e.g. `rate_limited`.
    #[schema(example = "rate_limited")]
    pub kind: String,
    pub message: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

fn fallback_reason(source: &Provenance) -> Option<String> {
    match source {
        Provenance::Agent => None,
        Provenance::Fallback { reason } => Some(reason.clone()),
    }
}

fn provenance(fallback: Option<String>) -> Provenance {
    match fallback {
        None => Provenance::Agent,
        Some(reason) => Provenance::Fallback { reason },
    }
}

impl From<&LearningPlan> for PlanResponse {
    fn from(plan: &LearningPlan) -> Self {
        Self {
            topic: plan.topic.to_string(),
            generated_at: plan.generated_at,
            modules: plan
                .modules
                .iter()
                .map(|m| ModuleResponse {
                    index: m.module.index,
                    title: m.module.title.clone(),
                    description: m.module.description.clone(),
                    resources: m
                        .resources
                        .iter()
                        .map(|r| ResourceResponse {
                            title: r.title.clone(),
                            url: r.url.clone(),
                            note: r.note.clone(),
                        })
                        .collect(),
                    resources_fallback: fallback_reason(&m.resources_source),
                })
                .collect(),
            project: ProjectResponse {
                title: plan.project.idea.title.clone(),
                description: plan.project.idea.description.clone(),
                fallback: fallback_reason(&plan.project.source),
            },
            degraded: plan.is_degraded(),
            degraded_sections: plan.degraded_sections(),
        }
    }
}

impl TryFrom<PlanResponse> for LearningPlan {
    type Error = learnpath_core::error::EmptyTopic;

    fn try_from(body: PlanResponse) -> Result<Self, Self::Error> {
        let mut modules: Vec<ModulePlan> = body
            .modules
            .into_iter()
            .map(|m| ModulePlan {
                module: Module {
                    index: m.index,
                    title: m.title,
                    description: m.description,
                },
                resources: m
                    .resources
                    .into_iter()
                    .map(|r| Resource {
                        title: r.title,
                        url: r.url,
                        note: r.note,
                    })
                    .collect(),
                resources_source: provenance(m.resources_fallback),
            })
            .collect();
        modules.sort_by_key(|m| m.module.index);

        Ok(LearningPlan {
            topic: Topic::new(body.topic)?,
            modules,
            project: ProjectSection {
                idea: ProjectIdea {
                    title: body.project.title,
                    description: body.project.description,
                },
                source: provenance(body.project.fallback),
            },
            generated_at: body.generated_at,
        })
    }
}

impl From<&PipelineFailure> for FailureResponse {
    fn from(failure: &PipelineFailure) -> Self {
        let kind = match &failure.error {
            AgentError::Parse(_) => "parse".to_string(),
            AgentError::Service(e) => serde_json::to_value(e.kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| e.kind.to_string()),
        };
        Self {
            stage: failure.stage.to_string(),
            module: failure.module,
            kind,
            message: failure.to_string(),
        }
    }
}
