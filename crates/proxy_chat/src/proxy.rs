//! Gateway-routed OpenAI chat client and its factory
//!
//! Requests go to the gateway's OpenAI-compatible endpoint. The virtual key is
//! the bearer credential and the gateway's own headers pick the upstream
//! provider.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::config::{Environment, LlmConfig, ProcessEnv, ProxySettings};
use crate::conversation::{AssistantChat, Conversation};
use crate::error::{ConfigurationError, Result};
use crate::model::{ChatClient, ChatClientOptions};

pub const HEADER_API_KEY: &str = "x-proxy-api-key";
pub const HEADER_PROVIDER: &str = "x-proxy-provider";
pub const HEADER_VIRTUAL_KEY: &str = "x-proxy-virtual-key";

/// Upstream provider the gateway should route to
pub const UPSTREAM_PROVIDER: &str = "openai";

/// Provider name reported by [`ProxyChatOpenAI::describe`]
pub const PROVIDER_NAME: &str = "openai_portkey";

/// Gateway headers attached to every request
pub fn proxy_headers(settings: &ProxySettings) -> BTreeMap<String, String> {
    BTreeMap::from([
        (HEADER_API_KEY.to_string(), settings.api_key().to_string()),
        (HEADER_PROVIDER.to_string(), UPSTREAM_PROVIDER.to_string()),
        (
            HEADER_VIRTUAL_KEY.to_string(),
            settings.virtual_key().to_string(),
        ),
    ])
}

/// Names of the gateway headers that carry credentials
pub fn sensitive_proxy_headers() -> BTreeSet<String> {
    BTreeSet::from([HEADER_API_KEY.to_string(), HEADER_VIRTUAL_KEY.to_string()])
}

/// OpenAI chat model reached through the gateway, with conversation support
#[derive(Debug)]
pub struct ProxyChatOpenAI {
    client: ChatClient,
    conversation: Conversation,
}

impl ProxyChatOpenAI {
    /// Build a client from already validated settings
    pub fn from_settings(
        settings: &ProxySettings,
        session_name: &str,
    ) -> std::result::Result<Self, ConfigurationError> {
        let options = ChatClientOptions {
            model_name: settings.model().to_string(),
            api_key: settings.virtual_key().to_string(),
            base_url: settings.base_url().to_string(),
            default_headers: proxy_headers(settings),
            sensitive_headers: sensitive_proxy_headers(),
            session_name: session_name.to_string(),
            max_tokens: settings.max_tokens(),
        };

        Ok(Self {
            client: ChatClient::new(options)?,
            conversation: Conversation::new(session_name),
        })
    }

    /// Set a system prompt for the conversation
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.conversation = self.conversation.with_system_prompt(prompt);
        self
    }

    /// The underlying chat client
    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        self.client.default_headers()
    }

    pub fn max_tokens(&self) -> u32 {
        self.client.max_tokens()
    }

    /// Send one user message and return the assistant's reply
    pub async fn assistant_chat(&mut self, message: &str) -> Result<String> {
        self.conversation.send(&self.client, message).await
    }

    /// Start the conversation over
    pub fn reset(&mut self) {
        self.conversation.reset();
    }
}

impl AssistantChat for ProxyChatOpenAI {
    fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    fn describe(&self) -> Map<String, Value> {
        let mut desc = self.client.describe();
        desc.extend(self.conversation.describe());
        desc.insert("model".to_string(), self.client.model_name().into());
        desc.insert("provider".to_string(), PROVIDER_NAME.into());
        desc
    }
}

/// Create a gateway-backed OpenAI chat client from the process environment.
///
/// Required environment variables:
/// - `PROXY_API_KEY`: gateway API key
/// - `PROXY_VIRTUAL_KEY`: gateway virtual key for OpenAI-compatible routing
///
/// Optional:
/// - `PROXY_BASE_URL`: gateway base URL, used when `config.proxy_url` is unset
pub fn create_proxy_openai_chat(
    config: &LlmConfig,
    session_name: &str,
) -> std::result::Result<ProxyChatOpenAI, ConfigurationError> {
    create_proxy_openai_chat_with_env(config, session_name, &ProcessEnv)
}

/// Create a gateway-backed OpenAI chat client, reading variables from `env`
pub fn create_proxy_openai_chat_with_env(
    config: &LlmConfig,
    session_name: &str,
    env: &impl Environment,
) -> std::result::Result<ProxyChatOpenAI, ConfigurationError> {
    let settings = ProxySettings::resolve(config, env)?;
    let chat = ProxyChatOpenAI::from_settings(&settings, session_name)?;

    info!(
        "Using proxied OpenAI-compatible model: {} via {} for session: {}",
        settings.model(),
        settings.base_url(),
        session_name
    );

    Ok(chat)
}
