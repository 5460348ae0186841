use std::path::PathBuf;
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported backend providers for the reasoning service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
}

/// Credentials for the web-search backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    pub api_key: String,
    pub engine_id: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub provider: Provider,
    pub api_key: String,
    pub api_base_override: Option<String>,
    pub chat_model: String,
    pub search: Option<SearchConfig>,
    /// `tracing-subscriber` filter directives, e.g. `info,hyper=warn`.
    pub log_filter: String,
    pub prompts_path: Option<PathBuf>,
    pub max_attempts: u32,
    pub call_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let provider_str = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "gemini" => Provider::Gemini,
            "openai" => Provider::OpenAI,
            other => {
                return Err(ConfigError::InvalidValue(
                    "LLM_PROVIDER".to_string(),
                    format!("'{}' is not one of 'gemini', 'openai'", other),
                ));
            }
        };

        let key_var = match provider {
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        };
        let api_key = std::env::var(key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingVar(format!(
                    "{} must be set for '{}' provider",
                    key_var,
                    provider_str.to_lowercase()
                ))
            })?;

        let api_base_override = std::env::var("LLM_API_BASE").ok();

        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| match provider {
            Provider::Gemini => "gemini-2.0-flash".to_string(),
            Provider::OpenAI => "gpt-4o".to_string(),
        });

        let search = match (
            std::env::var("SEARCH_API_KEY").ok(),
            std::env::var("SEARCH_ENGINE_ID").ok(),
        ) {
            (Some(api_key), Some(engine_id)) => Some(SearchConfig { api_key, engine_id }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingVar("SEARCH_ENGINE_ID".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingVar("SEARCH_API_KEY".to_string())),
        };

        let log_filter = std::env::var("RUST_LOG")
            .ok()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);

        let max_attempts = parse_var("MAX_ATTEMPTS", 3u32)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let call_timeout = Duration::from_secs(parse_var("CALL_TIMEOUT_SECS", 60u64)?);

        Ok(Self {
            provider,
            api_key,
            api_base_override,
            chat_model,
            search,
            log_filter,
            prompts_path,
            max_attempts,
            call_timeout,
        })
    }

    /// Base URL of the OpenAI-compatible endpoint for the configured provider.
    pub fn api_base(&self) -> &str {
        match (&self.api_base_override, &self.provider) {
            (Some(base), _) => base.as_str(),
            (None, Provider::Gemini) => GEMINI_API_BASE,
            (None, Provider::OpenAI) => OPENAI_API_BASE,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(name.to_string(), format!("'{}' is not a number", raw))
        }),
        Err(_) => Ok(default),
    }
}
