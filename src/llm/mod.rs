//! LLM client abstraction.
//!
//! Provides a unified blocking interface for the text-generation providers
//! the advisor can run against.

mod anthropic;
mod gemini;
mod ollama;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

use crate::models::{Role, Turn};
use crate::{DeckwiseConfig, Result};
use std::sync::Arc;
use std::time::Duration;

/// Trait for LLM providers.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// Generates a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Generates a completion with a system prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    ///
    /// Default implementation concatenates system and user prompts.
    /// Providers should override this to use native system prompt support.
    fn complete_with_system(&self, system: &str, user: &str) -> Result<String> {
        let combined = format!("{system}\n\n---\n\nUser message:\n{user}");
        self.complete(&combined)
    }

    /// Generates a completion conditioned on conversation history.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    ///
    /// Default implementation flattens the history into the user prompt.
    /// Providers should override this to use native multi-turn support.
    fn chat(&self, system: &str, history: &[Turn], user: &str) -> Result<String> {
        if history.is_empty() {
            return self.complete_with_system(system, user);
        }

        let mut transcript = String::from("Conversation so far:\n");
        for turn in history {
            transcript.push_str(turn.role.as_str());
            transcript.push_str(": ");
            transcript.push_str(&turn.text);
            transcript.push('\n');
        }
        transcript.push_str("\nLatest user message:\n");
        transcript.push_str(user);

        self.complete_with_system(system, &transcript)
    }
}

/// A role-tagged message on the wire.
///
/// Shared by providers whose chat endpoints take `{role, content}` pairs.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatMessage {
    /// Message role: "system", "user", or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// Builds a wire message from a conversation turn.
    #[must_use]
    pub fn from_turn(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        Self {
            role: role.to_string(),
            content: turn.text.clone(),
        }
    }
}

/// HTTP client configuration for LLM providers.
#[derive(Debug, Clone, Copy)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Loads HTTP configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Loads HTTP configuration from config file settings.
    #[must_use]
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        let mut settings = Self::default();
        if let Some(timeout_ms) = config.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = config.connect_timeout_ms {
            settings.connect_timeout_ms = connect_timeout_ms;
        }
        settings
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("DECKWISE_LLM_TIMEOUT_MS") {
            if let Ok(timeout_ms) = v.parse::<u64>() {
                self.timeout_ms = timeout_ms;
            }
        }
        if let Ok(v) = std::env::var("DECKWISE_LLM_CONNECT_TIMEOUT_MS") {
            if let Ok(connect_timeout_ms) = v.parse::<u64>() {
                self.connect_timeout_ms = connect_timeout_ms;
            }
        }
        self
    }
}

/// Builds a blocking HTTP client for LLM requests with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build LLM HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Builds an LLM provider from configuration.
#[must_use]
pub fn build_provider(config: &DeckwiseConfig) -> Arc<dyn LlmProvider> {
    use crate::config::LlmProvider as Provider;

    let llm = &config.llm;
    let http = LlmHttpConfig::from_config(llm).with_env_overrides();

    match llm.provider {
        Provider::Gemini => {
            let mut client = GeminiClient::new();
            if let Some(ref api_key) = llm.api_key {
                client = client.with_api_key(api_key);
            }
            if let Some(ref model) = llm.model {
                client = client.with_model(model);
            }
            if let Some(ref base_url) = llm.base_url {
                client = client.with_endpoint(base_url);
            }
            Arc::new(client.with_http_config(http))
        },
        Provider::Anthropic => {
            let mut client = AnthropicClient::new();
            if let Some(ref api_key) = llm.api_key {
                client = client.with_api_key(api_key);
            }
            if let Some(ref model) = llm.model {
                client = client.with_model(model);
            }
            if let Some(ref base_url) = llm.base_url {
                client = client.with_endpoint(base_url);
            }
            Arc::new(client.with_http_config(http))
        },
        Provider::Ollama => {
            let mut client = OllamaClient::new();
            if let Some(ref model) = llm.model {
                client = client.with_model(model);
            }
            if let Some(ref base_url) = llm.base_url {
                client = client.with_endpoint(base_url);
            }
            Arc::new(client.with_http_config(http))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    #[test]
    fn test_default_complete_with_system_concatenates() {
        let provider = EchoProvider;
        let out = provider.complete_with_system("SYS", "USER").unwrap();
        assert!(out.starts_with("SYS"));
        assert!(out.ends_with("USER"));
    }

    #[test]
    fn test_default_chat_flattens_history() {
        let provider = EchoProvider;
        let history = vec![Turn::user("red deck?"), Turn::assistant("go aggro")];
        let out = provider.chat("SYS", &history, "what curve?").unwrap();
        assert!(out.contains("user: red deck?"));
        assert!(out.contains("assistant: go aggro"));
        assert!(out.contains("what curve?"));
    }

    #[test]
    fn test_default_chat_empty_history() {
        let provider = EchoProvider;
        let out = provider.chat("SYS", &[], "hello?").unwrap();
        assert!(!out.contains("Conversation so far"));
    }

    #[test]
    fn test_chat_message_from_turn() {
        let msg = ChatMessage::from_turn(&Turn::assistant("hi"));
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.content, "hi");
    }

    #[test]
    fn test_http_config_defaults() {
        let config = LlmHttpConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.connect_timeout_ms, 3_000);
    }
}
