//! proxy_chat: OpenAI-compatible chat clients routed through an API gateway
//!
//! This library provides:
//! - Validation of gateway credentials from the environment and caller config
//! - A chat client pre-configured with the gateway's base URL and auth headers
//! - Conversation history and token accounting per session
//!
//! # Example
//!
//! ```no_run
//! use proxy_chat::{create_proxy_openai_chat, AssistantChat, LlmConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LlmConfig::new("gpt-4o", 512).with_proxy_url("https://gateway.example/v1");
//!     let mut chat = create_proxy_openai_chat(&config, "session-1")?;
//!
//!     println!("{:?}", chat.describe());
//!     let reply = chat.assistant_chat("Hello!").await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Core functionality
pub mod conversation;
pub mod model;
pub mod proxy;

// Re-export commonly used types and functions
pub use error::{ChatError, ConfigurationError, Result};

// Config re-exports
pub use config::{
    Environment, LlmConfig, ProcessEnv, ProxySettings, PROXY_API_KEY, PROXY_BASE_URL,
    PROXY_VIRTUAL_KEY,
};

// Model re-exports
pub use model::{ChatClient, ChatClientOptions, ChatResponse, MessageBuilder, TokenUsage};

// Conversation re-exports
pub use conversation::{AssistantChat, Conversation};

// Proxy re-exports
pub use proxy::{
    create_proxy_openai_chat, create_proxy_openai_chat_with_env, proxy_headers, ProxyChatOpenAI,
    PROVIDER_NAME,
};
