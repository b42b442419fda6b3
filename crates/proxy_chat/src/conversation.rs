//! Conversation state shared by assistant chat clients

use async_openai::types::ChatCompletionRequestMessage;
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::model::{ChatClient, MessageBuilder, TokenUsage};

/// Message history and usage accounting for one chat session
#[derive(Debug, Clone)]
pub struct Conversation {
    session_name: String,
    system_prompt: Option<String>,
    history: Vec<ChatCompletionRequestMessage>,
    usage: TokenUsage,
    turns: usize,
    started_at: DateTime<Local>,
}

impl Conversation {
    /// Start an empty conversation for the given session
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            system_prompt: None,
            history: Vec::new(),
            usage: TokenUsage::default(),
            turns: 0,
            started_at: Local::now(),
        }
    }

    /// Set a system prompt, sent ahead of the history on every turn
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Messages exchanged so far, without the system prompt
    pub fn history(&self) -> &[ChatCompletionRequestMessage] {
        &self.history
    }

    /// Cumulative token usage across all turns
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// Number of completed user/assistant exchanges
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Clear history and usage, keeping the session and system prompt
    pub fn reset(&mut self) {
        self.history.clear();
        self.usage = TokenUsage::default();
        self.turns = 0;
        self.started_at = Local::now();
    }

    /// Send a user message through `client` and record the reply.
    ///
    /// History is only updated when the request succeeds.
    pub async fn send(&mut self, client: &ChatClient, message: &str) -> Result<String> {
        let user_message = MessageBuilder::create_user_message(message)?;

        let mut messages = Vec::with_capacity(self.history.len() + 2);
        if let Some(prompt) = &self.system_prompt {
            messages.push(MessageBuilder::create_system_message(prompt)?);
        }
        messages.extend(self.history.iter().cloned());
        messages.push(user_message.clone());

        let response = client.complete(messages).await?;

        self.history.push(user_message);
        self.history
            .push(MessageBuilder::create_assistant_message(&response.content)?);
        if let Some(usage) = response.usage {
            self.usage.add(usage);
        }
        self.turns += 1;

        debug!(
            "Session {} turn {} ({} tokens so far)",
            self.session_name, self.turns, self.usage.total_tokens
        );

        Ok(response.content)
    }

    /// Descriptive fields for this conversation
    pub fn describe(&self) -> Map<String, Value> {
        let mut desc = Map::new();
        desc.insert("session_name".to_string(), self.session_name.clone().into());
        desc.insert("turns".to_string(), self.turns.into());
        desc.insert(
            "total_tokens".to_string(),
            self.usage.total_tokens.into(),
        );
        desc.insert(
            "started_at".to_string(),
            self.started_at.to_rfc3339().into(),
        );
        desc
    }
}

/// Capability shared by chat clients that carry a conversation
pub trait AssistantChat {
    /// The conversation backing this client
    fn conversation(&self) -> &Conversation;

    /// Descriptive fields for introspection and logging
    fn describe(&self) -> Map<String, Value>;

    fn session_name(&self) -> &str {
        self.conversation().session_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChatClientOptions;

    #[test]
    fn test_new_conversation_is_empty() {
        let conversation = Conversation::new("sess-1").with_system_prompt("be brief");

        assert_eq!(conversation.session_name(), "sess-1");
        assert_eq!(conversation.system_prompt(), Some("be brief"));
        assert!(conversation.history().is_empty());
        assert_eq!(conversation.turns(), 0);
        assert_eq!(conversation.usage(), TokenUsage::default());
    }

    #[test]
    fn test_describe_fields() {
        let desc = Conversation::new("sess-1").describe();

        assert_eq!(desc["session_name"], "sess-1");
        assert_eq!(desc["turns"], 0);
        assert_eq!(desc["total_tokens"], 0);
        assert!(desc.contains_key("started_at"));
    }

    #[tokio::test]
    async fn test_failed_send_leaves_history_untouched() {
        let client = ChatClient::new(ChatClientOptions::new(
            "gpt-4o",
            "vk",
            "http://127.0.0.1:1/v1",
            16,
        ))
        .unwrap();
        let mut conversation = Conversation::new("sess-1");

        assert!(conversation.send(&client, "hello").await.is_err());
        assert!(conversation.history().is_empty());
        assert_eq!(conversation.turns(), 0);
    }

    #[test]
    fn test_reset_keeps_system_prompt() {
        let mut conversation = Conversation::new("sess-1").with_system_prompt("be brief");
        conversation.turns = 3;
        conversation.usage.total_tokens = 42;

        conversation.reset();

        assert_eq!(conversation.turns(), 0);
        assert_eq!(conversation.usage().total_tokens, 0);
        assert_eq!(conversation.system_prompt(), Some("be brief"));
    }
}
