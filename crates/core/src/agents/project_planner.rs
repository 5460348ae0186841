//! Project Planner Agent
//!
//! Proposes one capstone project spanning the whole module list.

use crate::agent_client::{AgentClient, AgentRequest};
use crate::error::{AgentError, Role};
use crate::models::{Module, ProjectIdea};
use crate::parser::parse_project;
use std::sync::Arc;

pub struct ProjectPlannerAgent {
    client: Arc<dyn AgentClient>,
    instruction: String,
}

impl ProjectPlannerAgent {
    pub fn new(client: Arc<dyn AgentClient>, instruction: String) -> Self {
        Self {
            client,
            instruction,
        }
    }

    /// Sees module titles and descriptions only, never their resources.
    pub async fn plan_project(&self, modules: &[Module]) -> Result<ProjectIdea, AgentError> {
        let raw = self
            .client
            .invoke(AgentRequest {
                role: Role::ProjectPlanner,
                instruction: self.instruction.clone(),
                payload: modules_payload(modules),
                tool: None,
            })
            .await?;

        Ok(parse_project(&raw)?)
    }
}

fn modules_payload(modules: &[Module]) -> String {
    modules
        .iter()
        .map(|m| {
            if m.description.is_empty() {
                format!("- Module {}: {}", m.index, m.title)
            } else {
                format!("- Module {}: {} - {}", m.index, m.title, m.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_client::MockAgentClient;

    fn modules() -> Vec<Module> {
        vec![
            Module {
                index: 1,
                title: "HTML Basics".to_string(),
                description: "Page structure".to_string(),
            },
            Module {
                index: 2,
                title: "CSS Fundamentals".to_string(),
                description: String::new(),
            },
        ]
    }

    #[test]
    fn test_modules_payload_lists_every_module() {
        assert_eq!(
            modules_payload(&modules()),
            "- Module 1: HTML Basics - Page structure\n- Module 2: CSS Fundamentals"
        );
    }

    #[tokio::test]
    async fn test_plan_project_parses_title() {
        let mut client = MockAgentClient::new();
        client
            .expect_invoke()
            .withf(|req| {
                req.role == Role::ProjectPlanner
                    && req.tool.is_none()
                    && req.payload.contains("Module 2: CSS Fundamentals")
            })
            .times(1)
            .returning(|_| {
                Ok("Title: Portfolio Site\nBuild a portfolio with HTML and CSS.".to_string())
            });

        let agent = ProjectPlannerAgent::new(Arc::new(client), String::new());
        let idea = agent.plan_project(&modules()).await.unwrap();
        assert_eq!(idea.title, "Portfolio Site");
        assert_eq!(idea.description, "Build a portfolio with HTML and CSS.");
    }
}
