//! Error types for client construction and chat calls

use async_openai::error::OpenAIError;
use thiserror::Error;

/// Raised while resolving settings or constructing a client.
///
/// None of these are transient: they have to be fixed in the deployment
/// environment or in the caller's configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing API key: PROXY_API_KEY not found in environment")]
    MissingApiKey,

    #[error("missing virtual key: PROXY_VIRTUAL_KEY not found in environment")]
    MissingVirtualKey,

    #[error("missing base URL: set llm.proxy_url or PROXY_BASE_URL")]
    MissingBaseUrl,

    #[error("model name must not be empty")]
    EmptyModel,

    #[error("max_tokens must be positive")]
    InvalidMaxTokens,

    #[error("invalid value for header {0}")]
    InvalidHeader(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors surfaced by chat operations on a constructed client
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("API error: {0}")]
    Api(#[from] OpenAIError),

    #[error("Received empty response from API")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_missing_value() {
        assert!(ConfigurationError::MissingApiKey
            .to_string()
            .contains("missing API key"));
        assert!(ConfigurationError::MissingVirtualKey
            .to_string()
            .contains("missing virtual key"));
        assert!(ConfigurationError::MissingBaseUrl
            .to_string()
            .contains("missing base URL"));
    }

    #[test]
    fn test_configuration_error_converts_into_chat_error() {
        let err: ChatError = ConfigurationError::MissingBaseUrl.into();
        assert!(matches!(
            err,
            ChatError::Configuration(ConfigurationError::MissingBaseUrl)
        ));
    }
}
