//! The advisory pipeline orchestrator.

use super::assembler::assemble;
use super::extractor::QueryExtractor;
use super::strategist::StrategyStage;
use crate::config::DeckwiseConfig;
use crate::knowledge::{KnowledgeRetriever, LexicalRetriever};
use crate::llm::{self, LlmProvider};
use crate::models::{CardRecord, SearchExpression, SearchOrder, Turn, UniqueMode};
use crate::scryfall::{CardSearchClient, CardSource};
use crate::session::SessionStore;
use crate::{Error, Result};
use std::sync::Arc;

/// Per-invocation working record threaded through the pipeline stages.
///
/// Created at pipeline entry, owned by the orchestrator for the duration of
/// one invocation, discarded once the reply is produced. Stage outputs fill
/// in as the invocation advances.
#[derive(Debug)]
pub struct TurnState {
    /// The raw user utterance.
    pub utterance: String,
    /// The session this turn belongs to.
    pub session_id: String,
    /// Strategy narrative, present after the strategy stage.
    pub strategy: Option<String>,
    /// Search expressions, present after the query-and-fetch stage.
    pub expressions: Option<Vec<SearchExpression>>,
    /// Fetched cards, present after the query-and-fetch stage.
    pub cards: Option<Vec<CardRecord>>,
}

impl TurnState {
    /// Creates the entry state for one invocation.
    #[must_use]
    pub fn new(utterance: &str, session_id: &str) -> Self {
        Self {
            utterance: utterance.to_string(),
            session_id: session_id.to_string(),
            strategy: None,
            expressions: None,
            cards: None,
        }
    }
}

/// The deck-building advisor: a fixed linear pipeline over one session
/// store.
///
/// Stages run in a strict sequence with no branching or retry edges:
/// strategy, then query-and-fetch, then assemble. A failure the stages do
/// not downgrade internally aborts the whole invocation — no partial reply
/// is ever produced.
pub struct Advisor {
    /// Stage 1: grounded narrative generation.
    strategist: StrategyStage,
    /// Stage 2a: expression extraction.
    extractor: QueryExtractor,
    /// Stage 2b: card search backend.
    cards: Arc<dyn CardSource>,
    /// Session history owner, shared with the strategist.
    sessions: Arc<SessionStore>,
    /// Result ordering for card searches.
    order: SearchOrder,
    /// Uniqueness mode for card searches.
    unique: UniqueMode,
    /// Cards fetched per expression.
    max_results: usize,
    /// Session id used when the caller supplies none.
    default_session_id: String,
}

impl Advisor {
    /// Creates an advisor from explicit collaborators.
    ///
    /// Hosts that manage their own providers (or tests substituting stubs)
    /// wire the seams directly; everyone else wants [`Advisor::from_config`].
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        retriever: Arc<dyn KnowledgeRetriever>,
        cards: Arc<dyn CardSource>,
        sessions: Arc<SessionStore>,
        config: &DeckwiseConfig,
    ) -> Self {
        Self {
            strategist: StrategyStage::new(
                Arc::clone(&llm),
                retriever,
                Arc::clone(&sessions),
                config.knowledge.top_k,
            ),
            extractor: QueryExtractor::new(llm),
            cards,
            sessions,
            order: config.scryfall.order,
            unique: config.scryfall.unique,
            max_results: config.scryfall.max_results_per_expression,
            default_session_id: config.session.default_id.clone(),
        }
    }

    /// Creates an advisor with the configured live collaborators.
    #[must_use]
    pub fn from_config(config: &DeckwiseConfig) -> Self {
        let llm = llm::build_provider(config);
        let retriever = Arc::new(LexicalRetriever::load(
            &config.knowledge.dir,
            config.knowledge.chunk_chars,
        ));
        let cards = Arc::new(CardSearchClient::from_config(&config.scryfall));
        let sessions = Arc::new(SessionStore::new(config.session.capacity));

        Self::new(llm, retriever, cards, sessions, config)
    }

    /// Runs one advisory turn and returns the assembled reply.
    ///
    /// With no session id the default session is used, so casual callers
    /// share one running conversation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty utterance and
    /// `Error::Generation` when the strategy stage's collaborators fail.
    /// Extraction and per-expression search failures degrade the reply
    /// instead of failing it.
    pub fn ask(&self, utterance: &str, session_id: Option<&str>) -> Result<String> {
        if utterance.trim().is_empty() {
            return Err(Error::InvalidInput("utterance is empty".to_string()));
        }

        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(self.default_session_id.as_str());

        tracing::info!(session_id = %session_id, "Advisory turn started");

        let state = TurnState::new(utterance, session_id);
        let state = self.strategy_stage(state)?;
        let state = self.query_and_fetch_stage(state);
        Ok(self.assemble_stage(state))
    }

    /// Clears a session's conversation history.
    pub fn reset(&self, session_id: &str) {
        self.sessions.reset(session_id);
    }

    /// Resolves a single expression directly, bypassing generation.
    ///
    /// # Errors
    ///
    /// Returns `Error::Search` for transport or server failures.
    pub fn search(
        &self,
        expression: &SearchExpression,
        max_results: usize,
    ) -> Result<Vec<CardRecord>> {
        self.cards
            .search(expression, self.order, self.unique, max_results)
    }

    /// The session id used when callers supply none.
    #[must_use]
    pub fn default_session_id(&self) -> &str {
        &self.default_session_id
    }

    /// Stage 1: generate the strategy narrative and extend the session.
    fn strategy_stage(&self, state: TurnState) -> Result<TurnState> {
        let strategy = self
            .strategist
            .generate(&state.session_id, &state.utterance)?;

        Ok(TurnState {
            strategy: Some(strategy),
            ..state
        })
    }

    /// Stage 2: derive expressions from the narrative and fetch their cards.
    ///
    /// An empty expression list is a valid outcome and yields an empty card
    /// list; nothing in this stage can fail the invocation.
    fn query_and_fetch_stage(&self, state: TurnState) -> TurnState {
        let strategy = state.strategy.as_deref().unwrap_or("");

        let expressions = self.extractor.extract(strategy);
        let cards = self
            .cards
            .fetch_all(&expressions, self.order, self.unique, self.max_results);

        tracing::debug!(
            expression_count = expressions.len(),
            card_count = cards.len(),
            "Query-and-fetch stage complete"
        );

        TurnState {
            expressions: Some(expressions),
            cards: Some(cards),
            ..state
        }
    }

    /// Stage 3: assemble the reply and record it as an assistant turn.
    fn assemble_stage(&self, state: TurnState) -> String {
        let strategy = state.strategy.as_deref().unwrap_or("");
        let cards = state.cards.unwrap_or_default();

        let reply = assemble(strategy, &cards);
        self.sessions
            .append(&state.session_id, Turn::assistant(reply.clone()));

        tracing::info!(
            session_id = %state.session_id,
            reply_chars = reply.len(),
            "Advisory turn complete"
        );

        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_state_starts_unfilled() {
        let state = TurnState::new("red aggro?", "s1");
        assert_eq!(state.utterance, "red aggro?");
        assert_eq!(state.session_id, "s1");
        assert!(state.strategy.is_none());
        assert!(state.expressions.is_none());
        assert!(state.cards.is_none());
    }
}
