//! Per-session conversation history.
//!
//! Sessions are created lazily on first reference, cleared (identity
//! preserved) on reset, and bounded by LRU eviction so a long-lived process
//! cannot accumulate history for an unbounded number of distinct sessions.

use crate::models::Turn;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

/// In-process store of per-session conversation history.
///
/// # Thread Safety
///
/// All mutations go through a single `Mutex`, so appends and resets are
/// atomic with respect to concurrent access to the same session id. A
/// poisoned lock still holds valid history, so poisoning is recovered by
/// taking the inner value.
///
/// # Retention
///
/// The store keeps at most `capacity` sessions; referencing a new session id
/// beyond that evicts the least recently used one. Evicted history is gone —
/// the same as a process restart for that session, which the advisor does
/// not persist across anyway.
pub struct SessionStore {
    /// Session id → ordered turns.
    sessions: Mutex<LruCache<String, Vec<Turn>>>,
}

impl SessionStore {
    /// Default maximum number of retained sessions.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Creates a new session store.
    ///
    /// # Panics
    ///
    /// Panics if capacity is 0.
    #[must_use]
    #[allow(clippy::expect_used)] // Documented panic for invalid input
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).expect("capacity must be > 0");
        Self {
            sessions: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Returns the session's turns, creating an empty session on first
    /// reference to an unseen id.
    #[must_use]
    pub fn history(&self, session_id: &str) -> Vec<Turn> {
        let mut sessions = self.lock();
        sessions
            .get_or_insert_mut(session_id.to_string(), Vec::new)
            .clone()
    }

    /// Appends a turn to the session, creating the session if needed.
    pub fn append(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.lock();
        sessions
            .get_or_insert_mut(session_id.to_string(), Vec::new)
            .push(turn);
    }

    /// Appends several turns to the session in one atomic step.
    pub fn extend(&self, session_id: &str, turns: impl IntoIterator<Item = Turn>) {
        let mut sessions = self.lock();
        sessions
            .get_or_insert_mut(session_id.to_string(), Vec::new)
            .extend(turns);
    }

    /// Clears the session's turns, preserving its identity.
    ///
    /// A no-op for sessions that were never created.
    pub fn reset(&self, session_id: &str) {
        let mut sessions = self.lock();
        if let Some(turns) = sessions.get_mut(session_id) {
            turns.clear();
            tracing::debug!(session_id = %session_id, "Session history cleared");
        }
    }

    /// Returns the number of retained sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no sessions are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Vec<Turn>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_unseen_session_is_empty() {
        let store = SessionStore::new(8);
        assert!(store.history("fresh").is_empty());
        // The reference created the session.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_and_history_order() {
        let store = SessionStore::new(8);
        store.append("s1", Turn::user("first"));
        store.append("s1", Turn::assistant("second"));

        let history = store.history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "first");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].text, "second");
    }

    #[test]
    fn test_extend_appends_in_order() {
        let store = SessionStore::new(8);
        store.extend("s1", [Turn::user("q"), Turn::assistant("a")]);
        let history = store.history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "a");
    }

    #[test]
    fn test_reset_empties_without_duplicating() {
        let store = SessionStore::new(8);
        store.append("s1", Turn::user("hello"));
        store.reset("s1");

        assert!(store.history("s1").is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reset_unseen_session_is_noop() {
        let store = SessionStore::new(8);
        store.reset("never-seen");
        assert!(store.is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new(8);
        store.append("a", Turn::user("for a"));
        store.append("b", Turn::user("for b"));

        assert_eq!(store.history("a").len(), 1);
        assert_eq!(store.history("b").len(), 1);
        assert_eq!(store.history("a")[0].text, "for a");
    }

    #[test]
    fn test_lru_eviction_bounds_sessions() {
        let store = SessionStore::new(2);
        store.append("a", Turn::user("1"));
        store.append("b", Turn::user("2"));
        store.append("c", Turn::user("3"));

        assert_eq!(store.len(), 2);
        // "a" was least recently used and is gone; referencing it again
        // recreates it empty.
        assert!(store.history("a").is_empty());
    }

    #[test]
    fn test_concurrent_appends() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(SessionStore::new(8));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..25 {
                        store.append("shared", Turn::user(format!("t{t}-{i}")));
                    }
                })
            })
            .collect();

        for handle in handles {
            let _ = handle.join();
        }

        assert_eq!(store.history("shared").len(), 100);
    }
}
