//! Configuration module for proxy_chat
//!
//! This module contains:
//! - `env`: Environment variable names and lookup abstraction
//! - `settings`: Caller configuration and validated proxy settings

mod env;
mod settings;

pub use env::{Environment, ProcessEnv, PROXY_API_KEY, PROXY_BASE_URL, PROXY_VIRTUAL_KEY};
pub use settings::{LlmConfig, ProxySettings};
