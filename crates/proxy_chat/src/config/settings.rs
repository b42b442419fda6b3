//! Caller configuration and the validated settings derived from it

use serde::{Deserialize, Serialize};
use std::fmt;

use super::env::{Environment, PROXY_API_KEY, PROXY_BASE_URL, PROXY_VIRTUAL_KEY};
use crate::error::ConfigurationError;

/// LLM section of the caller's configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Gateway base URL. Takes precedence over `PROXY_BASE_URL` when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 4096,
            proxy_url: None,
        }
    }
}

impl LlmConfig {
    /// Create a new LlmConfig for the given model
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            proxy_url: None,
        }
    }

    /// Set the gateway base URL
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }
}

/// Proxy credentials and endpoint, validated once at the process boundary.
///
/// Holding one of these means both keys were present and a non-empty base URL
/// was resolved.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySettings {
    api_key: String,
    virtual_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl ProxySettings {
    /// Resolve settings from the caller's config and an environment.
    ///
    /// Checks run in a fixed order and stop at the first failure: API key,
    /// virtual key, base URL, then the config's own fields.
    pub fn resolve(
        config: &LlmConfig,
        env: &impl Environment,
    ) -> Result<Self, ConfigurationError> {
        let api_key = env
            .var(PROXY_API_KEY)
            .ok_or(ConfigurationError::MissingApiKey)?;
        let virtual_key = env
            .var(PROXY_VIRTUAL_KEY)
            .ok_or(ConfigurationError::MissingVirtualKey)?;

        let base_url = config
            .proxy_url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| env.var(PROXY_BASE_URL).filter(|url| !url.is_empty()))
            .ok_or(ConfigurationError::MissingBaseUrl)?;

        if config.model.is_empty() {
            return Err(ConfigurationError::EmptyModel);
        }
        if config.max_tokens == 0 {
            return Err(ConfigurationError::InvalidMaxTokens);
        }

        Ok(Self {
            api_key,
            virtual_key,
            base_url,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn virtual_key(&self) -> &str {
        &self.virtual_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("api_key", &"<redacted>")
            .field("virtual_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
