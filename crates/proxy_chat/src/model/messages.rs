//! Helpers for building conversation messages

use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    },
};

/// Helper for building conversation messages
pub struct MessageBuilder;

impl MessageBuilder {
    /// Create a system message
    pub fn create_system_message(
        content: &str,
    ) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        Ok(ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into())
    }

    /// Create a user message
    pub fn create_user_message(content: &str) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        Ok(ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into())
    }

    /// Create an assistant message
    pub fn create_assistant_message(
        content: &str,
    ) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        Ok(ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into())
    }
}
