//! Chat client for OpenAI-compatible APIs reached through a gateway

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CompletionUsage,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ChatError, ConfigurationError, Result};

/// Construction parameters for a [`ChatClient`]
#[derive(Clone, PartialEq, Eq)]
pub struct ChatClientOptions {
    pub model_name: String,
    /// Bearer credential sent in `Authorization`
    pub api_key: String,
    pub base_url: String,
    /// Headers attached to every request
    pub default_headers: BTreeMap<String, String>,
    /// Names of default headers whose values are credentials
    pub sensitive_headers: BTreeSet<String>,
    pub session_name: String,
    pub max_tokens: u32,
}

impl ChatClientOptions {
    /// Create options with no extra headers
    pub fn new(
        model_name: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            default_headers: BTreeMap::new(),
            sensitive_headers: BTreeSet::new(),
            session_name: String::new(),
            max_tokens,
        }
    }

    /// Set the session label
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Add a default header carrying a credential
    pub fn with_sensitive_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.sensitive_headers.insert(name.clone());
        self.default_headers.insert(name, value.into());
        self
    }
}

// Header values carry credentials; only their names are printed.
impl fmt::Debug for ChatClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClientOptions")
            .field("model_name", &self.model_name)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
            .field("session_name", &self.session_name)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Token counts reported by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Accumulate another usage report into this one
    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

impl From<CompletionUsage> for TokenUsage {
    fn from(usage: CompletionUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

/// Response from a single chat completion
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Option<TokenUsage>,
    /// Total request time (seconds)
    pub total_time: f64,
}

/// Client for an OpenAI-compatible chat completion endpoint.
///
/// Construction performs no network I/O; the first request opens the
/// connection.
#[derive(Debug)]
pub struct ChatClient {
    options: ChatClientOptions,
    client: Client<OpenAIConfig>,
    instance_id: Uuid,
}

impl ChatClient {
    /// Create a new ChatClient
    pub fn new(options: ChatClientOptions) -> std::result::Result<Self, ConfigurationError> {
        let headers = build_header_map(
            &options.default_headers,
            &options.sensitive_headers,
        )?;
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let openai_config = OpenAIConfig::new()
            .with_api_base(&options.base_url)
            .with_api_key(&options.api_key);

        let client = Client::with_config(openai_config).with_http_client(http_client);

        Ok(Self {
            options,
            client,
            instance_id: Uuid::new_v4(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.options.model_name
    }

    pub fn base_url(&self) -> &str {
        &self.options.base_url
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.options.default_headers
    }

    pub fn session_name(&self) -> &str {
        &self.options.session_name
    }

    pub fn max_tokens(&self) -> u32 {
        self.options.max_tokens
    }

    /// Identifier unique to this client instance
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Descriptive, non-secret fields of this client
    pub fn describe(&self) -> Map<String, Value> {
        let mut desc = Map::new();
        desc.insert("model_name".to_string(), json!(self.options.model_name));
        desc.insert("base_url".to_string(), json!(self.options.base_url));
        desc.insert("session_name".to_string(), json!(self.options.session_name));
        desc.insert("max_tokens".to_string(), json!(self.options.max_tokens));
        desc.insert("instance_id".to_string(), json!(self.instance_id.to_string()));
        desc
    }

    /// Test connection to the model API by sending a simple request
    pub async fn test_connection(&self) -> Result<()> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.options.model_name)
            .max_tokens(5_u32)
            .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                .content("Hi")
                .build()?
                .into()])
            .build()?;

        let response = self.client.chat().create(request).await?;

        if response.choices.is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        Ok(())
    }

    /// Send a chat completion request
    pub async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<ChatResponse> {
        let start_time = Instant::now();

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.options.model_name)
            .max_tokens(self.options.max_tokens)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let usage = response.usage.map(TokenUsage::from);

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::EmptyResponse)?;
        let content = choice.message.content.unwrap_or_default();
        let total_time = start_time.elapsed().as_secs_f64();

        debug!(
            "Completion for session {} took {:.3}s",
            self.options.session_name, total_time
        );

        Ok(ChatResponse {
            content,
            usage,
            total_time,
        })
    }
}

/// Convert string headers into an HTTP header map.
///
/// Values of headers named in `sensitive` are marked so they stay out of debug
/// output.
fn build_header_map(
    headers: &BTreeMap<String, String>,
    sensitive: &BTreeSet<String>,
) -> std::result::Result<HeaderMap, ConfigurationError> {
    let mut header_map = HeaderMap::new();

    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigurationError::InvalidHeader(name.clone()))?;
        let mut header_value = HeaderValue::from_str(value)
            .map_err(|_| ConfigurationError::InvalidHeader(name.clone()))?;
        if sensitive.contains(name) {
            header_value.set_sensitive(true);
        }
        header_map.insert(header_name, header_value);
    }

    Ok(header_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ChatClientOptions {
        ChatClientOptions::new("gpt-4o", "vk", "http://127.0.0.1:1/v1", 64)
            .with_session_name("test-session")
            .with_sensitive_header("x-proxy-api-key", "ak")
    }

    #[test]
    fn test_options_builder() {
        let options = options();

        assert_eq!(options.model_name, "gpt-4o");
        assert_eq!(options.api_key, "vk");
        assert_eq!(options.session_name, "test-session");
        assert_eq!(
            options.default_headers.get("x-proxy-api-key").map(String::as_str),
            Some("ak")
        );
    }

    #[test]
    fn test_build_header_map_marks_listed_headers_sensitive() {
        let options = options()
            .with_header("x-proxy-provider", "openai")
            .with_header("x-trace-key", "m1");

        let map =
            build_header_map(&options.default_headers, &options.sensitive_headers).unwrap();

        assert_eq!(map.len(), 3);
        assert!(map.get("x-proxy-api-key").unwrap().is_sensitive());
        assert!(!map.get("x-proxy-provider").unwrap().is_sensitive());
        // Header names alone do not make a value sensitive.
        assert!(!map.get("x-trace-key").unwrap().is_sensitive());
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let options = options().with_header("x-proxy-api-key", "bad\nvalue");

        let err = ChatClient::new(options).err().unwrap();
        assert!(matches!(err, ConfigurationError::InvalidHeader(name) if name == "x-proxy-api-key"));
    }

    #[test]
    fn test_describe_omits_credentials() {
        let client = ChatClient::new(options()).unwrap();
        let desc = client.describe();

        assert_eq!(desc["model_name"], "gpt-4o");
        assert_eq!(desc["base_url"], "http://127.0.0.1:1/v1");
        assert_eq!(desc["session_name"], "test-session");
        assert_eq!(desc["max_tokens"], 64);
        let rendered = Value::Object(desc).to_string();
        assert!(!rendered.contains("\"vk\""));
        assert!(!rendered.contains("\"ak\""));
    }

    #[test]
    fn test_options_debug_hides_credentials() {
        let debug = format!("{:?}", options());

        assert!(debug.contains("x-proxy-api-key"));
        assert!(!debug.contains("\"vk\""));
        assert!(!debug.contains("\"ak\""));
    }

    #[test]
    fn test_token_usage_add() {
        let mut total = TokenUsage::default();
        total.add(TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        total.add(TokenUsage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        });

        assert_eq!(total.total_tokens, 18);
        assert_eq!(total.prompt_tokens, 11);
    }

    #[test]
    fn test_token_usage_add_saturates() {
        let mut total = TokenUsage {
            prompt_tokens: u32::MAX - 1,
            completion_tokens: 0,
            total_tokens: u32::MAX,
        };
        total.add(TokenUsage {
            prompt_tokens: 5,
            completion_tokens: 1,
            total_tokens: 6,
        });

        assert_eq!(total.prompt_tokens, u32::MAX);
        assert_eq!(total.completion_tokens, 1);
        assert_eq!(total.total_tokens, u32::MAX);
    }

    #[tokio::test]
    async fn test_connection_error_when_gateway_unreachable() {
        let client = ChatClient::new(options()).unwrap();

        let err = client.test_connection().await.unwrap_err();
        assert!(matches!(err, ChatError::Api(_)));
    }
}
