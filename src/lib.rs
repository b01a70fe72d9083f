//! # Deckwise
//!
//! A retrieval-grounded Magic: The Gathering strategy advisor.
//!
//! Deckwise turns a freeform question about deck building into strategic
//! advice grounded in a local rules/meta knowledge base, derives Scryfall
//! search expressions from that advice, and surfaces matching cards from the
//! Scryfall API — all while keeping per-session conversation history.
//!
//! ## Pipeline
//!
//! One advisory turn runs a fixed three-stage sequence:
//!
//! 1. **Strategy** — generate a grounded strategy narrative for the
//!    utterance, consuming and extending the session's history.
//! 2. **Query and fetch** — extract Scryfall search expressions from the
//!    narrative, then resolve each through the rate-limited, cached search
//!    client.
//! 3. **Assemble** — merge the narrative and the fetched cards into the
//!    final reply and append it to the session.
//!
//! ## Example
//!
//! ```rust,ignore
//! use deckwise::{Advisor, DeckwiseConfig};
//!
//! let advisor = Advisor::from_config(&DeckwiseConfig::load_default())?;
//! let reply = advisor.ask("I want an aggressive red aggro deck for modern", None)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod knowledge;
pub mod llm;
pub mod models;
pub mod observability;
pub mod prompts;
pub mod scryfall;
pub mod services;
pub mod session;

// Re-exports for convenience
pub use config::DeckwiseConfig;
pub use knowledge::KnowledgeRetriever;
pub use llm::LlmProvider;
pub use models::{CardRecord, Role, SearchExpression, SearchOrder, Turn, UniqueMode};
pub use scryfall::{CardSearchClient, CardSource};
pub use services::{Advisor, QueryExtractor, StrategyStage};
pub use session::SessionStore;

/// Error type for deckwise operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty utterance, malformed search expression, bad config values |
/// | `Generation` | LLM or knowledge-retrieval collaborator unavailable or erroring |
/// | `Search` | Scryfall transport/server error other than "no cards matched" |
/// | `OperationFailed` | Config file I/O, knowledge-base file I/O |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - The user utterance is empty
    /// - A search expression fails validation (too short, comment marker)
    /// - A config file value cannot be interpreted
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A generation or retrieval collaborator failed.
    ///
    /// Fatal to the advisory turn that raised it; the pipeline performs no
    /// retries of its own.
    #[error("generation '{operation}' failed: {cause}")]
    Generation {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A Scryfall search failed.
    ///
    /// Raised for transport errors and non-success statuses other than the
    /// service's "no cards matched" signal, which yields an empty result
    /// instead. Fatal only to the expression that raised it; the fetch
    /// aggregation downgrades it to zero records.
    #[error("card search '{operation}' failed: {cause}")]
    Search {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - The config file cannot be read or parsed
    /// - Knowledge-base files cannot be read
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for deckwise operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("empty utterance".to_string());
        assert_eq!(err.to_string(), "invalid input: empty utterance");

        let err = Error::Generation {
            operation: "strategy".to_string(),
            cause: "connect error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "generation 'strategy' failed: connect error"
        );

        let err = Error::Search {
            operation: "cards_search".to_string(),
            cause: "status 500".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "card search 'cards_search' failed: status 500"
        );
    }
}
