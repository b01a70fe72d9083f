//! Scryfall search expressions.

use crate::{Error, Result};
use std::fmt;

/// Minimum expression length after trimming.
///
/// Anything shorter is noise from generated output (stray enumeration
/// fragments, lone operators) rather than a usable Scryfall query.
const MIN_LENGTH: usize = 6;

/// A single search expression in Scryfall query syntax.
///
/// The string is opaque to deckwise — it is passed to the Scryfall API
/// verbatim. Construction validates the invariants that separate a real
/// query from generation noise: non-empty, at least six characters after
/// trimming, and not a comment line.
///
/// # Example
///
/// ```rust
/// use deckwise::SearchExpression;
///
/// let expr = SearchExpression::parse("c:r t:creature pow>=3").unwrap();
/// assert_eq!(expr.as_str(), "c:r t:creature pow>=3");
///
/// assert!(SearchExpression::parse("c:r").is_err());
/// assert!(SearchExpression::parse("# just a comment").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchExpression(String);

impl SearchExpression {
    /// Parses and validates a search expression.
    ///
    /// The input is trimmed before validation and stored trimmed.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the trimmed input is empty, shorter
    /// than six characters, or begins with the `#` comment marker.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidInput(
                "search expression is empty".to_string(),
            ));
        }
        if trimmed.len() < MIN_LENGTH {
            return Err(Error::InvalidInput(format!(
                "search expression too short: '{trimmed}'"
            )));
        }
        if trimmed.starts_with('#') {
            return Err(Error::InvalidInput(format!(
                "search expression is a comment: '{trimmed}'"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the expression as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchExpression {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
