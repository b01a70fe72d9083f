//! Search expression extraction from generated strategy text.

use crate::llm::LlmProvider;
use crate::models::SearchExpression;
use crate::prompts::{QUERY_GENERATION_SYSTEM_PROMPT, build_query_user_message};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Leading enumeration noise on heuristic-extracted lines: whitespace,
/// digits, dots, quotes, backticks, and dashes.
static LINE_PREFIX: Lazy<Regex> = Lazy::new(line_prefix_pattern);

#[allow(clippy::unwrap_used)] // Pattern is a compile-time constant
fn line_prefix_pattern() -> Regex {
    Regex::new(r#"^[\s\d."'`-]*"#).unwrap()
}

/// Derives Scryfall search expressions from a strategy narrative.
///
/// The generator is prompted to answer with a JSON array of query strings,
/// but generated output is best-effort; parsing is an ordered fallback
/// chain and any failure downgrades to "no expressions" rather than an
/// error — the pipeline then simply offers no card suggestions.
pub struct QueryExtractor {
    /// Generation collaborator.
    llm: Arc<dyn LlmProvider>,
}

impl QueryExtractor {
    /// Creates a new extractor.
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Extracts search expressions for the given strategy narrative.
    ///
    /// Returns an empty list when generation fails or nothing parseable
    /// comes back; never an error.
    #[must_use]
    pub fn extract(&self, strategy: &str) -> Vec<SearchExpression> {
        let user = build_query_user_message(strategy);

        let response = match self
            .llm
            .complete_with_system(QUERY_GENERATION_SYSTEM_PROMPT, &user)
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Query generation failed; no card suggestions");
                return Vec::new();
            },
        };

        let expressions = parse_expressions(&response);
        tracing::debug!(
            expression_count = expressions.len(),
            "Extracted search expressions"
        );
        expressions
    }
}

/// Parses generated text into search expressions.
///
/// Tiers, first success wins:
/// 1. strict JSON parse of the first `[...]` span in the text;
/// 2. strict JSON parse of the entire text;
/// 3. line-oriented heuristic extraction.
///
/// Order follows generation order and duplicates are kept. Entries that
/// fail [`SearchExpression`] validation are dropped in every tier.
#[must_use]
pub fn parse_expressions(raw: &str) -> Vec<SearchExpression> {
    if let Some(span) = first_bracketed_span(raw) {
        if let Ok(entries) = serde_json::from_str::<Vec<String>>(span) {
            return validated(entries);
        }
    }

    if let Ok(entries) = serde_json::from_str::<Vec<String>>(raw.trim()) {
        return validated(entries);
    }

    raw.lines()
        .map(|line| LINE_PREFIX.replace(line, "").trim().to_string())
        .filter_map(|line| SearchExpression::parse(&line).ok())
        .collect()
}

/// Returns the first `[...]` span of the text, brackets included.
fn first_bracketed_span(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw[start..].find(']')?;
    Some(&raw[start..=start + end])
}

/// Validates JSON-parsed entries, dropping the ones that are not usable
/// expressions.
fn validated(entries: Vec<String>) -> Vec<SearchExpression> {
    entries
        .iter()
        .filter_map(|entry| match SearchExpression::parse(entry) {
            Ok(expression) => Some(expression),
            Err(e) => {
                tracing::debug!(entry = %entry, error = %e, "Dropping unusable expression");
                None
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use test_case::test_case;

    struct CannedProvider {
        response: &'static str,
    }

    impl LlmProvider for CannedProvider {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.response.to_string())
        }
    }

    struct FailingProvider;

    impl LlmProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(crate::Error::Generation {
                operation: "canned".to_string(),
                cause: "unavailable".to_string(),
            })
        }
    }

    fn strings(expressions: &[SearchExpression]) -> Vec<&str> {
        expressions.iter().map(SearchExpression::as_str).collect()
    }

    #[test]
    fn test_json_array_embedded_in_prose() {
        let raw = r#"Here are your queries:
["c:r t:creature mv<=3", "c:r kw:haste", "f:modern c:r is:permanent"]
Hope that helps!"#;

        let expressions = parse_expressions(raw);
        assert_eq!(
            strings(&expressions),
            vec![
                "c:r t:creature mv<=3",
                "c:r kw:haste",
                "f:modern c:r is:permanent"
            ]
        );
    }

    #[test]
    fn test_bare_json_array() {
        let raw = r#"["id:wr is:commander", "c:g o:\"draw a card\" mv<=3"]"#;
        let expressions = parse_expressions(raw);
        assert_eq!(
            strings(&expressions),
            vec!["id:wr is:commander", r#"c:g o:"draw a card" mv<=3"#]
        );
    }

    #[test]
    fn test_enumerated_lines_fallback() {
        let raw = "1. c:r t:creature pow>=3\n2. id:wr is:commander";
        let expressions = parse_expressions(raw);
        assert_eq!(
            strings(&expressions),
            vec!["c:r t:creature pow>=3", "id:wr is:commander"]
        );
    }

    #[test_case("- c:r t:goblin", &["c:r t:goblin"] ; "dash prefix")]
    // Only leading noise is stripped, so a closing quote survives.
    #[test_case("\"c:u t:merfolk\"", &["c:u t:merfolk\""] ; "quoted line")]
    #[test_case("3. `t:equipment mv<=2`", &["t:equipment mv<=2`"] ; "numbered backtick")]
    fn test_line_prefix_stripping(raw: &str, expected: &[&str]) {
        let expressions = parse_expressions(raw);
        assert_eq!(strings(&expressions), expected);
    }

    #[test]
    fn test_short_lines_excluded() {
        let raw = "1. c:r\n2. c:r t:creature pow>=3";
        let expressions = parse_expressions(raw);
        assert_eq!(strings(&expressions), vec!["c:r t:creature pow>=3"]);
    }

    #[test]
    fn test_comment_lines_excluded() {
        let raw = "# color queries\nc:r t:creature pow>=3";
        let expressions = parse_expressions(raw);
        assert_eq!(strings(&expressions), vec!["c:r t:creature pow>=3"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_expressions("").is_empty());
        assert!(parse_expressions("\n\n\n").is_empty());
    }

    #[test]
    fn test_malformed_bracket_span_falls_through_to_lines() {
        // The bracketed span is not valid JSON, and the whole text is not
        // either; the line heuristic still recovers the queries while the
        // short and comment lines fall out.
        let raw = "[bad]\n# queries\nc:r t:creature pow>=3\nid:wr is:commander";
        let expressions = parse_expressions(raw);
        assert_eq!(
            strings(&expressions),
            vec!["c:r t:creature pow>=3", "id:wr is:commander"]
        );
    }

    #[test]
    fn test_duplicates_preserved() {
        let raw = r#"["c:r kw:haste", "c:r kw:haste"]"#;
        let expressions = parse_expressions(raw);
        assert_eq!(expressions.len(), 2);
        assert_eq!(expressions[0], expressions[1]);
    }

    #[test]
    fn test_extract_downgrades_generation_failure() {
        let extractor = QueryExtractor::new(Arc::new(FailingProvider));
        assert!(extractor.extract("play cheap red creatures").is_empty());
    }

    #[test]
    fn test_extract_parses_provider_output() {
        let extractor = QueryExtractor::new(Arc::new(CannedProvider {
            response: r#"["c:r t:creature mv<=3"]"#,
        }));
        let expressions = extractor.extract("play cheap red creatures");
        assert_eq!(strings(&expressions), vec!["c:r t:creature mv<=3"]);
    }
}
