//! Model client module for chat inference
//!
//! This module provides:
//! - `client`: OpenAI-compatible chat client
//! - `messages`: Conversation message construction

mod client;
mod messages;

pub use client::{ChatClient, ChatClientOptions, ChatResponse, TokenUsage};
pub use messages::MessageBuilder;
