//! Configuration management.

use serde::Deserialize;
use std::path::PathBuf;

use crate::models::{SearchOrder, UniqueMode};

/// Main configuration for deckwise.
#[derive(Debug, Clone, Default)]
pub struct DeckwiseConfig {
    /// LLM provider configuration.
    pub llm: LlmConfig,
    /// Scryfall client configuration.
    pub scryfall: ScryfallConfig,
    /// Knowledge-base retrieval configuration.
    pub knowledge: KnowledgeConfig,
    /// Session store configuration.
    pub session: SessionConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// Provider name: "gemini", "anthropic", "ollama".
    pub provider: LlmProvider,
    /// Model name.
    pub model: Option<String>,
    /// API key (falls back to the provider's environment variable).
    pub api_key: Option<String>,
    /// Base URL for the provider (for self-hosted or proxied endpoints).
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Available LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini.
    #[default]
    Gemini,
    /// Anthropic Claude.
    Anthropic,
    /// Ollama (local).
    Ollama,
}

impl LlmProvider {
    /// Parses a provider string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "anthropic" => Self::Anthropic,
            "ollama" => Self::Ollama,
            _ => Self::Gemini,
        }
    }
}

/// Scryfall client configuration.
#[derive(Debug, Clone)]
pub struct ScryfallConfig {
    /// API endpoint.
    pub endpoint: String,
    /// Result ordering.
    pub order: SearchOrder,
    /// Uniqueness mode.
    pub unique: UniqueMode,
    /// Maximum cards returned per search expression.
    pub max_results_per_expression: usize,
    /// Cache entry time-to-live in seconds.
    pub cache_ttl_secs: u64,
    /// Cached query capacity.
    pub cache_capacity: usize,
    /// Minimum spacing between outbound requests in milliseconds.
    pub min_request_interval_ms: u64,
}

impl Default for ScryfallConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.scryfall.com".to_string(),
            order: SearchOrder::Edhrec,
            unique: UniqueMode::Cards,
            max_results_per_expression: 5,
            cache_ttl_secs: 3600,
            cache_capacity: 256,
            min_request_interval_ms: 100,
        }
    }
}

/// Knowledge-base retrieval configuration.
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Directory holding rules/meta reference documents.
    pub dir: PathBuf,
    /// Approximate chunk size in characters.
    pub chunk_chars: usize,
    /// Number of snippets retrieved per question.
    pub top_k: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("knowledge_base"),
            chunk_chars: 1500,
            top_k: 5,
        }
    }
}

/// Session store configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of concurrently retained sessions.
    pub capacity: usize,
    /// Session id used when the caller supplies none.
    pub default_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            default_id: "default_session".to_string(),
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// LLM configuration.
    pub llm: Option<ConfigFileLlm>,
    /// Scryfall configuration.
    pub scryfall: Option<ConfigFileScryfall>,
    /// Knowledge configuration.
    pub knowledge: Option<ConfigFileKnowledge>,
    /// Session configuration.
    pub session: Option<ConfigFileSession>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Provider name.
    pub provider: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Scryfall section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileScryfall {
    /// API endpoint.
    pub endpoint: Option<String>,
    /// Result ordering.
    pub order: Option<String>,
    /// Uniqueness mode.
    pub unique: Option<String>,
    /// Maximum cards per expression.
    pub max_results_per_expression: Option<usize>,
    /// Cache TTL in seconds.
    pub cache_ttl_secs: Option<u64>,
    /// Cache capacity.
    pub cache_capacity: Option<usize>,
    /// Minimum request spacing in milliseconds.
    pub min_request_interval_ms: Option<u64>,
}

/// Knowledge section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileKnowledge {
    /// Knowledge directory.
    pub dir: Option<String>,
    /// Chunk size in characters.
    pub chunk_chars: Option<usize>,
    /// Snippets per question.
    pub top_k: Option<usize>,
}

/// Session section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSession {
    /// Retained session capacity.
    pub capacity: Option<usize>,
    /// Default session id.
    pub default_id: Option<String>,
}

impl DeckwiseConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/deckwise/` on macOS)
    /// 2. XDG config dir (`~/.config/deckwise/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("deckwise").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("deckwise")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `DeckwiseConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                config.llm.provider = LlmProvider::parse(&provider);
            }
            config.llm.model = llm.model;
            config.llm.api_key = llm.api_key;
            config.llm.base_url = llm.base_url;
            config.llm.timeout_ms = llm.timeout_ms;
            config.llm.connect_timeout_ms = llm.connect_timeout_ms;
        }

        if let Some(scryfall) = file.scryfall {
            if let Some(endpoint) = scryfall.endpoint {
                config.scryfall.endpoint = endpoint;
            }
            if let Some(order) = scryfall.order {
                config.scryfall.order = SearchOrder::parse(&order);
            }
            if let Some(unique) = scryfall.unique {
                config.scryfall.unique = UniqueMode::parse(&unique);
            }
            if let Some(max) = scryfall.max_results_per_expression {
                config.scryfall.max_results_per_expression = max;
            }
            if let Some(ttl) = scryfall.cache_ttl_secs {
                config.scryfall.cache_ttl_secs = ttl;
            }
            if let Some(capacity) = scryfall.cache_capacity {
                config.scryfall.cache_capacity = capacity;
            }
            if let Some(interval) = scryfall.min_request_interval_ms {
                config.scryfall.min_request_interval_ms = interval;
            }
        }

        if let Some(knowledge) = file.knowledge {
            if let Some(dir) = knowledge.dir {
                config.knowledge.dir = PathBuf::from(dir);
            }
            if let Some(chunk_chars) = knowledge.chunk_chars {
                config.knowledge.chunk_chars = chunk_chars;
            }
            if let Some(top_k) = knowledge.top_k {
                config.knowledge.top_k = top_k;
            }
        }

        if let Some(session) = file.session {
            if let Some(capacity) = session.capacity {
                config.session.capacity = capacity;
            }
            if let Some(default_id) = session.default_id {
                config.session.default_id = default_id;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeckwiseConfig::default();
        assert_eq!(config.scryfall.endpoint, "https://api.scryfall.com");
        assert_eq!(config.scryfall.max_results_per_expression, 5);
        assert_eq!(config.scryfall.cache_ttl_secs, 3600);
        assert_eq!(config.scryfall.min_request_interval_ms, 100);
        assert_eq!(config.knowledge.top_k, 5);
        assert_eq!(config.session.default_id, "default_session");
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("anthropic"), LlmProvider::Anthropic);
        assert_eq!(LlmProvider::parse("OLLAMA"), LlmProvider::Ollama);
        assert_eq!(LlmProvider::parse("unknown"), LlmProvider::Gemini);
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            [llm]
            provider = "ollama"
            model = "llama3"
            base_url = "http://localhost:11434"

            [scryfall]
            order = "released"
            max_results_per_expression = 3
            cache_ttl_secs = 60

            [knowledge]
            dir = "/srv/mtg-docs"
            top_k = 3

            [session]
            capacity = 16
        "#;

        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let config = DeckwiseConfig::from_config_file(file);

        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.llm.model.as_deref(), Some("llama3"));
        assert_eq!(config.scryfall.order, SearchOrder::Released);
        assert_eq!(config.scryfall.max_results_per_expression, 3);
        assert_eq!(config.scryfall.cache_ttl_secs, 60);
        assert_eq!(config.knowledge.dir, PathBuf::from("/srv/mtg-docs"));
        assert_eq!(config.knowledge.top_k, 3);
        assert_eq!(config.session.capacity, 16);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let file: ConfigFile = toml::from_str("[scryfall]\norder = \"name\"\n").unwrap();
        let config = DeckwiseConfig::from_config_file(file);

        assert_eq!(config.scryfall.order, SearchOrder::Name);
        assert_eq!(config.scryfall.unique, UniqueMode::Cards);
        assert_eq!(config.scryfall.max_results_per_expression, 5);
    }
}
