//! Knowledge-base retrieval.
//!
//! The strategy stage grounds its narrative in snippets retrieved from a
//! local directory of rules/meta reference documents. Retrieval is a trait
//! seam so hosts can plug in a vector store; the shipped implementation is
//! a lexical term-overlap ranker, which needs no model downloads and no
//! network.

use crate::Result;
use std::collections::HashSet;
use std::path::Path;

/// Trait for knowledge retrieval backends.
pub trait KnowledgeRetriever: Send + Sync {
    /// Returns up to `k` snippets relevant to the question, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>>;
}

/// File extensions loaded into the corpus.
const TEXT_EXTENSIONS: [&str; 3] = ["md", "txt", "text"];

/// Lexical retriever over a directory of text documents.
///
/// Documents are chunked at paragraph boundaries to a configured size at
/// load time; retrieval ranks chunks by the number of distinct question
/// terms they share with the chunk.
pub struct LexicalRetriever {
    /// Pre-chunked corpus.
    chunks: Vec<Chunk>,
}

/// One scored unit of the corpus.
struct Chunk {
    /// The chunk text as returned to the caller.
    text: String,
    /// Lowercased term set for overlap scoring.
    terms: HashSet<String>,
}

impl LexicalRetriever {
    /// Loads all text documents under `dir` into a chunked corpus.
    ///
    /// A missing directory yields an empty corpus (the advisor still
    /// answers, ungrounded); unreadable individual files are logged and
    /// skipped.
    #[must_use]
    pub fn load(dir: &Path, chunk_chars: usize) -> Self {
        let mut chunks = Vec::new();

        if dir.is_dir() {
            collect_chunks(dir, chunk_chars, &mut chunks);
        } else {
            tracing::warn!(
                dir = %dir.display(),
                "Knowledge directory not found; strategy answers will be ungrounded"
            );
        }

        tracing::info!(
            dir = %dir.display(),
            chunk_count = chunks.len(),
            "Knowledge base loaded"
        );

        Self { chunks }
    }

    /// Builds a retriever directly from snippet strings.
    ///
    /// Mainly useful in tests and for hosts that manage their own corpus.
    #[must_use]
    pub fn from_snippets(snippets: Vec<String>) -> Self {
        let chunks = snippets
            .into_iter()
            .map(|text| {
                let terms = terms_of(&text);
                Chunk { text, terms }
            })
            .collect();
        Self { chunks }
    }

    /// Returns the number of chunks in the corpus.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl KnowledgeRetriever for LexicalRetriever {
    fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>> {
        let question_terms = terms_of(question);
        if question_terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, &Chunk)> = self
            .chunks
            .iter()
            .map(|chunk| {
                let overlap = chunk.terms.intersection(&question_terms).count();
                (overlap, chunk)
            })
            .filter(|(overlap, _)| *overlap > 0)
            .collect();

        // Stable sort keeps document order among equally scored chunks.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| chunk.text.clone())
            .collect())
    }
}

/// Recursively loads and chunks text files under `dir`.
fn collect_chunks(dir: &Path, chunk_chars: usize, chunks: &mut Vec<Chunk>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to read knowledge directory");
            return;
        },
    };

    let mut paths: Vec<_> = entries.filter_map(std::result::Result::ok).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_chunks(&path, chunk_chars, chunks);
            continue;
        }

        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if !is_text {
            continue;
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                for text in chunk_text(&contents, chunk_chars) {
                    let terms = terms_of(&text);
                    chunks.push(Chunk { text, terms });
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file");
            },
        }
    }
}

/// Splits text into chunks of roughly `chunk_chars` characters at paragraph
/// boundaries. A single oversized paragraph becomes its own chunk.
fn chunk_text(text: &str, chunk_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if !current.is_empty() && current.len() + paragraph.len() > chunk_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Lowercased alphanumeric terms of at least three characters.
fn terms_of(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| term.len() >= 3)
        .map(str::to_lowercase)
        .collect()
}
