//! Resource Finder Agent
//!
//! Finds 2-3 resources for exactly one module, with web search enabled. Each
//! call covers a single module so it stays small and independently retryable.

use crate::agent_client::{AgentClient, AgentRequest, Tool};
use crate::error::{AgentError, Role};
use crate::models::{Module, Resource};
use crate::parser::parse_resources;
use std::sync::Arc;
use tracing::debug;

pub struct ResourceFinderAgent {
    client: Arc<dyn AgentClient>,
    instruction: String,
}

impl ResourceFinderAgent {
    pub fn new(client: Arc<dyn AgentClient>, instruction: String) -> Self {
        Self {
            client,
            instruction,
        }
    }

    /// Returns the resources in the order the agent ranked them.
    pub async fn find_resources(&self, module: &Module) -> Result<Vec<Resource>, AgentError> {
        let raw = self
            .client
            .invoke(AgentRequest {
                role: Role::ResourceFinder,
                instruction: self.instruction.clone(),
                payload: module_payload(module),
                tool: Some(Tool::WebSearch),
            })
            .await?;
        debug!(module = module.index, chars = raw.len(), "Resource finder answered");

        Ok(parse_resources(&raw)?)
    }
}

fn module_payload(module: &Module) -> String {
    if module.description.is_empty() {
        module.title.clone()
    } else {
        format!("{} - {}", module.title, module.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_client::MockAgentClient;

    fn module() -> Module {
        Module {
            index: 2,
            title: "NumPy Fundamentals".to_string(),
            description: "Arrays and vectorized math".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_resources_enables_search_for_one_module() {
        let mut client = MockAgentClient::new();
        client
            .expect_invoke()
            .withf(|req| {
                req.role == Role::ResourceFinder
                    && req.tool == Some(Tool::WebSearch)
                    && req.payload == "NumPy Fundamentals - Arrays and vectorized math"
            })
            .times(1)
            .returning(|_| {
                Ok(r#"[{"title": "NumPy quickstart", "url": "https://numpy.org/doc/stable/user/quickstart.html", "note": "Official intro."}]"#.to_string())
            });

        let agent = ResourceFinderAgent::new(Arc::new(client), String::new());
        let resources = agent.find_resources(&module()).await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].title, "NumPy quickstart");
    }

    #[tokio::test]
    async fn test_find_resources_without_urls_is_a_parse_failure() {
        let mut client = MockAgentClient::new();
        client
            .expect_invoke()
            .returning(|_| Ok("Sorry, the search tool is unavailable.".to_string()));

        let agent = ResourceFinderAgent::new(Arc::new(client), String::new());
        let err = agent.find_resources(&module()).await.unwrap_err();
        match err {
            AgentError::Parse(p) => assert_eq!(p.raw_text, "Sorry, the search tool is unavailable."),
            _ => panic!("Expected a parse failure"),
        }
    }

    #[test]
    fn test_payload_without_description_is_just_the_title() {
        let mut m = module();
        m.description.clear();
        assert_eq!(module_payload(&m), "NumPy Fundamentals");
    }
}
