use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported backends for problem and feedback generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    /// A hosted prompt endpoint speaking `{"prompt"}` -> `{"bot": {"content"}}`.
    Endpoint,
    OpenAI,
    Gemini,
    /// Canned replies, no network.
    Static,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub prompt_endpoint_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub chat_model: String,
    pub log_level: Level,
    pub prompts_path: Option<PathBuf>,
    pub sampler_seed: Option<u64>,
    pub request_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str =
            std::env::var("CONTENT_PROVIDER").unwrap_or_else(|_| "endpoint".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "endpoint" => Provider::Endpoint,
            "openai" => Provider::OpenAI,
            "gemini" => Provider::Gemini,
            "static" => Provider::Static,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CONTENT_PROVIDER".to_string(),
                    format!(
                        "'{}' is not one of endpoint, openai, gemini, static",
                        other
                    ),
                ));
            }
        };

        let prompt_endpoint_url = std::env::var("PROMPT_ENDPOINT_URL").ok();
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();

        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);

        let sampler_seed = match std::env::var("SAMPLER_SEED") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("SAMPLER_SEED".to_string(), e.to_string())
            })?),
            Err(_) => None,
        };

        let timeout_str =
            std::env::var("REQUEST_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string());
        let request_timeout = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "REQUEST_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        match provider {
            Provider::Endpoint => {
                if prompt_endpoint_url.is_none() {
                    return Err(ConfigError::MissingVar(
                        "PROMPT_ENDPOINT_URL must be set for 'endpoint' provider".to_string(),
                    ));
                }
            }
            Provider::OpenAI => {
                if openai_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
                    ));
                }
            }
            Provider::Gemini => {
                if gemini_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "GEMINI_API_KEY must be set for 'gemini' provider".to_string(),
                    ));
                }
            }
            Provider::Static => {}
        }

        Ok(Self {
            bind_address,
            provider,
            prompt_endpoint_url,
            openai_api_key,
            gemini_api_key,
            chat_model,
            log_level,
            prompts_path,
            sampler_seed,
            request_timeout,
        })
    }
}
