//! Reasoning Service Client
//!
//! The uniform interface every agent uses to reach the language model: a role
//! instruction, a payload, optionally the web-search tool, and raw text back.
//! Structure is imposed by the caller's parser, not here.

use crate::config::Config;
use crate::error::{Role, ServiceError, ServiceErrorKind};
use crate::search::{GoogleSearch, SearchTool, WEB_SEARCH_TOOL, WebSearchArgs, format_hits};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, CreateChatCompletionRequestArgs,
        FunctionObjectArgs,
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

/// How many times the model may call tools before it must answer in text.
const MAX_TOOL_ROUNDS: usize = 3;

/// Capabilities an agent can enable for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    WebSearch,
}

/// One call to the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub role: Role,
    /// Fixed system instruction for the role; never user-supplied.
    pub instruction: String,
    pub payload: String,
    pub tool: Option<Tool>,
}

/// Contract for reaching the reasoning service.
///
/// Implementations make exactly one logical attempt per call and never retry;
/// retry policy belongs to the orchestrator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn invoke(&self, request: AgentRequest) -> Result<String, ServiceError>;
}

/// An `AgentClient` for any OpenAI-compatible chat-completions API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
    search: Option<Arc<dyn SearchTool>>,
}

impl OpenAICompatibleClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL of the service.
    /// * `model` - Model identifier (e.g. "gemini-2.0-flash").
    /// * `search` - Backend for the web-search tool, if one is configured.
    pub fn new(
        config: OpenAIConfig,
        model: String,
        search: Option<Arc<dyn SearchTool>>,
    ) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            search,
        }
    }

    /// Builds a client from the loaded application configuration.
    pub fn from_config(config: &Config, search: Option<Arc<dyn SearchTool>>) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.api_base());
        Self::new(openai_config, config.chat_model.clone(), search)
    }

    /// Builds the shared client, wiring Google search when it is configured.
    pub fn shared(config: &Config) -> Arc<dyn AgentClient> {
        let search = config.search.as_ref().map(|s| {
            Arc::new(GoogleSearch::new(s.api_key.clone(), s.engine_id.clone()))
                as Arc<dyn SearchTool>
        });
        if search.is_none() {
            warn!("SEARCH_API_KEY not set; resource finder will run without web search");
        }
        Arc::new(Self::from_config(config, search))
    }

    async fn run_tool(&self, call: &ChatCompletionMessageToolCall) -> String {
        if call.function.name != WEB_SEARCH_TOOL {
            return format!("Unknown tool: {}", call.function.name);
        }
        let Some(search) = &self.search else {
            return "Error performing search: no search backend configured".to_string();
        };
        let args: WebSearchArgs = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => return format!("Error performing search: invalid arguments: {}", e),
        };
        debug!(query = %args.query, "Running web search for the model");
        match search.search(&args.query).await {
            Ok(hits) => format_hits(&hits),
            Err(e) => {
                warn!(error = %e, query = %args.query, "Web search failed");
                format!("Error performing search: {:#}", e)
            }
        }
    }

    async fn converse(&self, request: &AgentRequest) -> Result<String, OpenAIError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.instruction.clone())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("User request: {}", request.payload))
                .build()?
                .into(),
        ];

        let tools = match (request.tool, &self.search) {
            (Some(Tool::WebSearch), Some(_)) => vec![web_search_tool()?],
            (Some(Tool::WebSearch), None) => {
                warn!(role = %request.role, "Web search requested but no search backend is configured");
                vec![]
            }
            (None, _) => vec![],
        };

        for round in 0..=MAX_TOOL_ROUNDS {
            let offer_tools = !tools.is_empty() && round < MAX_TOOL_ROUNDS;
            let mut args = CreateChatCompletionRequestArgs::default();
            args.model(&self.model).messages(messages.clone());
            if offer_tools {
                args.tools(tools.clone()).tool_choice("auto");
            }
            let response = self.client.chat().create(args.build()?).await?;

            let Some(choice) = response.choices.into_iter().next() else {
                return Ok(String::new());
            };

            match choice.message.tool_calls {
                Some(tool_calls) if offer_tools && !tool_calls.is_empty() => {
                    debug!(role = %request.role, round, calls = tool_calls.len(), "Model requested tools");
                    let mut results = Vec::with_capacity(tool_calls.len());
                    for call in &tool_calls {
                        results.push(self.run_tool(call).await);
                    }
                    messages.push(
                        ChatCompletionRequestAssistantMessageArgs::default()
                            .tool_calls(tool_calls.clone())
                            .build()?
                            .into(),
                    );
                    for (call, result) in tool_calls.iter().zip(results) {
                        messages.push(
                            ChatCompletionRequestToolMessageArgs::default()
                                .tool_call_id(call.id.clone())
                                .content(result)
                                .build()?
                                .into(),
                        );
                    }
                }
                _ => return Ok(choice.message.content.unwrap_or_default()),
            }
        }
        Ok(String::new())
    }
}

#[async_trait]
impl AgentClient for OpenAICompatibleClient {
    async fn invoke(&self, request: AgentRequest) -> Result<String, ServiceError> {
        debug!(role = %request.role, tool = ?request.tool, "Invoking reasoning service");
        let text = self
            .converse(&request)
            .await
            .map_err(|e| classify_openai_error(request.role, e))?;

        if text.trim().is_empty() {
            return Err(ServiceError::new(
                request.role,
                ServiceErrorKind::EmptyResponse,
                "LLM response had no text content",
            ));
        }
        Ok(text)
    }
}

/// Describes the `web_search` function to the model.
pub fn web_search_tool() -> Result<ChatCompletionTool, OpenAIError> {
    let mut parameters = serde_json::to_value(schemars::schema_for!(WebSearchArgs))
        .map_err(OpenAIError::JSONDeserialize)?;
    if let Some(obj) = parameters.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    ChatCompletionToolArgs::default()
        .function(
            FunctionObjectArgs::default()
                .name(WEB_SEARCH_TOOL)
                .description("Performs a web search and returns the top results.")
                .parameters(parameters)
                .build()?,
        )
        .build()
}

/// Maps a client-library error onto the pipeline's service error kinds.
pub fn classify_openai_error(role: Role, err: OpenAIError) -> ServiceError {
    let kind = match &err {
        OpenAIError::Reqwest(e) if e.is_timeout() => ServiceErrorKind::Timeout,
        OpenAIError::Reqwest(_) => ServiceErrorKind::Network,
        OpenAIError::JSONDeserialize(_) | OpenAIError::InvalidArgument(_) => {
            ServiceErrorKind::Protocol
        }
        OpenAIError::ApiError(_) => api_error_kind(&err.to_string()),
        _ => ServiceErrorKind::Rejected,
    };
    ServiceError::new(role, kind, err.to_string())
}

fn api_error_kind(message: &str) -> ServiceErrorKind {
    let lower = message.to_lowercase();
    if ["rate limit", "rate_limit", "quota", "resource_exhausted", "429"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        ServiceErrorKind::RateLimited
    } else if ["overloaded", "unavailable", "503", "502"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        ServiceErrorKind::Network
    } else {
        ServiceErrorKind::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_search_tool_schema_requires_query() {
        let tool = web_search_tool().unwrap();
        assert_eq!(tool.function.name, WEB_SEARCH_TOOL);
        let params = tool.function.parameters.unwrap();
        assert_eq!(params["type"], "object");
        assert!(params["properties"]["query"].is_object());
        assert_eq!(params["required"][0], "query");
        assert!(params.get("$schema").is_none());
    }

    #[test]
    fn test_classify_invalid_argument_as_protocol() {
        let err = classify_openai_error(
            Role::ProjectPlanner,
            OpenAIError::InvalidArgument("bad".to_string()),
        );
        assert_eq!(err.kind, ServiceErrorKind::Protocol);
        assert_eq!(err.role, Role::ProjectPlanner);
        assert_eq!(err.attempts, 1);
    }

    #[test]
    fn test_api_error_kinds() {
        assert_eq!(
            api_error_kind("Rate limit reached for gpt-4o"),
            ServiceErrorKind::RateLimited
        );
        assert_eq!(
            api_error_kind("You exceeded your current quota"),
            ServiceErrorKind::RateLimited
        );
        assert_eq!(
            api_error_kind("The model is overloaded"),
            ServiceErrorKind::Network
        );
        assert_eq!(
            api_error_kind("Invalid model name"),
            ServiceErrorKind::Rejected
        );
    }

    #[tokio::test]
    async fn test_run_tool_without_backend_reports_error_text() {
        let client = OpenAICompatibleClient::new(OpenAIConfig::new(), "m".to_string(), None);
        let call: ChatCompletionMessageToolCall = serde_json::from_value(serde_json::json!({
            "id": "call_1",
            "type": "function",
            "function": { "name": "web_search", "arguments": "{\"query\": \"pandas\"}" }
        }))
        .unwrap();
        let result = client.run_tool(&call).await;
        assert!(result.starts_with("Error performing search"));
    }
}
