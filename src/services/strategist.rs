//! Strategy narrative generation.

use crate::knowledge::KnowledgeRetriever;
use crate::llm::LlmProvider;
use crate::models::Turn;
use crate::prompts::{
    CONTEXTUALIZE_SYSTEM_PROMPT, STRATEGIST_SYSTEM_PROMPT, build_strategy_user_message,
};
use crate::session::SessionStore;
use crate::{Error, Result};
use std::sync::Arc;

/// Produces a grounded strategy narrative for one user utterance.
///
/// The stage reads the session's history, rewrites the utterance into a
/// standalone question, retrieves knowledge snippets for it, generates the
/// narrative, and appends both the user turn and the narrative to the
/// session. Collaborator failures propagate; retries, if any, belong to the
/// collaborators themselves.
pub struct StrategyStage {
    /// Generation collaborator.
    llm: Arc<dyn LlmProvider>,
    /// Retrieval collaborator.
    retriever: Arc<dyn KnowledgeRetriever>,
    /// Session history owner.
    sessions: Arc<SessionStore>,
    /// Snippets retrieved per question.
    top_k: usize,
}

impl StrategyStage {
    /// Creates a new strategy stage.
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        retriever: Arc<dyn KnowledgeRetriever>,
        sessions: Arc<SessionStore>,
        top_k: usize,
    ) -> Self {
        Self {
            llm,
            retriever,
            sessions,
            top_k,
        }
    }

    /// Generates the strategy narrative for the utterance within a session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Generation` when the generation or retrieval
    /// collaborator fails.
    pub fn generate(&self, session_id: &str, utterance: &str) -> Result<String> {
        let history = self.sessions.history(session_id);

        let question = self.contextualize(&history, utterance)?;

        let snippets = self
            .retriever
            .retrieve(&question, self.top_k)
            .map_err(|e| Error::Generation {
                operation: "knowledge_retrieval".to_string(),
                cause: e.to_string(),
            })?;

        tracing::debug!(
            session_id = %session_id,
            snippet_count = snippets.len(),
            "Generating strategy narrative"
        );

        let user_message = build_strategy_user_message(&question, &snippets);
        let narrative = self
            .llm
            .chat(STRATEGIST_SYSTEM_PROMPT, &history, &user_message)?;

        self.sessions.extend(
            session_id,
            [Turn::user(utterance), Turn::assistant(narrative.clone())],
        );

        Ok(narrative)
    }

    /// Rewrites a follow-up utterance into a standalone question.
    ///
    /// Skipped on the first turn of a session, where the utterance already
    /// stands alone.
    fn contextualize(&self, history: &[Turn], utterance: &str) -> Result<String> {
        if history.is_empty() {
            return Ok(utterance.to_string());
        }

        let question = self
            .llm
            .chat(CONTEXTUALIZE_SYSTEM_PROMPT, history, utterance)?;
        Ok(question.trim().to_string())
    }
}
