//! Curriculum Agent
//!
//! Breaks a topic into an ordered list of modules.

use crate::agent_client::{AgentClient, AgentRequest};
use crate::error::{AgentError, Role};
use crate::models::{Module, Topic};
use crate::parser::parse_modules;
use std::sync::Arc;
use tracing::{debug, info};

pub struct CurriculumAgent {
    client: Arc<dyn AgentClient>,
    instruction: String,
}

impl CurriculumAgent {
    pub fn new(client: Arc<dyn AgentClient>, instruction: String) -> Self {
        Self {
            client,
            instruction,
        }
    }

    /// Asks for 5 to 7 ordered modules and parses them.
    ///
    /// Fewer than three usable modules surfaces as [`AgentError::Parse`].
    pub async fn generate_modules(&self, topic: &Topic) -> Result<Vec<Module>, AgentError> {
        let raw = self
            .client
            .invoke(AgentRequest {
                role: Role::Curriculum,
                instruction: self.instruction.clone(),
                payload: topic.to_string(),
                tool: None,
            })
            .await?;
        debug!(chars = raw.len(), "Curriculum agent answered");

        let modules = parse_modules(&raw)?;
        info!(count = modules.len(), "Curriculum parsed");
        Ok(modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_client::MockAgentClient;
    use crate::error::{ServiceError, ServiceErrorKind};

    #[tokio::test]
    async fn test_generate_modules_sends_topic_without_tools() {
        let mut client = MockAgentClient::new();
        client
            .expect_invoke()
            .withf(|req| {
                req.role == Role::Curriculum
                    && req.payload == "Rust Async"
                    && req.tool.is_none()
                    && req.instruction == "curriculum instruction"
            })
            .times(1)
            .returning(|_| Ok("1. Futures - Polling\n2. Tokio - Runtime\n3. Streams - Async iteration".to_string()));

        let agent = CurriculumAgent::new(Arc::new(client), "curriculum instruction".to_string());
        let modules = agent
            .generate_modules(&Topic::new("Rust Async").unwrap())
            .await
            .unwrap();

        assert_eq!(modules.len(), 3);
        assert_eq!(modules[1].title, "Tokio");
    }

    #[tokio::test]
    async fn test_generate_modules_classifies_parse_failure() {
        let mut client = MockAgentClient::new();
        client
            .expect_invoke()
            .returning(|_| Ok("1. Only one module".to_string()));

        let agent = CurriculumAgent::new(Arc::new(client), String::new());
        let err = agent
            .generate_modules(&Topic::new("x").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[tokio::test]
    async fn test_generate_modules_classifies_service_failure() {
        let mut client = MockAgentClient::new();
        client.expect_invoke().returning(|req| {
            Err(ServiceError::new(req.role, ServiceErrorKind::Network, "reset"))
        });

        let agent = CurriculumAgent::new(Arc::new(client), String::new());
        let err = agent
            .generate_modules(&Topic::new("x").unwrap())
            .await
            .unwrap_err();
        match err {
            AgentError::Service(e) => {
                assert_eq!(e.role, Role::Curriculum);
                assert_eq!(e.kind, ServiceErrorKind::Network);
            }
            _ => panic!("Expected a service failure"),
        }
    }
}
