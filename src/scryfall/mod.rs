//! Scryfall card search client.
//!
//! Resolves search expressions into normalized card records through the
//! Scryfall REST API, with a TTL cache in front of the network and a
//! process-wide rate limiter behind it.

mod cache;
mod limiter;

pub use cache::{CacheKey, SearchCache};
pub use limiter::RateLimiter;

use crate::config::ScryfallConfig;
use crate::models::{CardRecord, RawCard, SearchExpression, SearchOrder, UniqueMode};
use crate::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Trait for card search backends.
///
/// The pipeline talks to this seam so tests and alternative hosts can
/// substitute the live client.
pub trait CardSource: Send + Sync {
    /// Resolves one expression into up to `max_results` card records.
    ///
    /// A "no cards matched" response is an empty `Ok`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Search` for transport or server failures.
    fn search(
        &self,
        expression: &SearchExpression,
        order: SearchOrder,
        unique: UniqueMode,
        max_results: usize,
    ) -> Result<Vec<CardRecord>>;

    /// Resolves a list of expressions sequentially, tagging each record with
    /// its originating expression.
    ///
    /// Per-expression failures are logged and contribute zero records; the
    /// aggregation itself never fails. Fetching is strictly sequential
    /// because outbound spacing is enforced process-wide.
    fn fetch_all(
        &self,
        expressions: &[SearchExpression],
        order: SearchOrder,
        unique: UniqueMode,
        max_results: usize,
    ) -> Vec<CardRecord> {
        let mut all_cards = Vec::new();

        for expression in expressions {
            match self.search(expression, order, unique, max_results) {
                Ok(cards) => {
                    tracing::debug!(
                        expression = %expression,
                        card_count = cards.len(),
                        "Expression resolved"
                    );
                    all_cards.extend(cards);
                },
                Err(e) => {
                    metrics::counter!("card_search_failures").increment(1);
                    tracing::warn!(
                        expression = %expression,
                        error = %e,
                        "Card search failed; expression contributes no results"
                    );
                },
            }
        }

        all_cards
    }
}

/// Outcome of one search request, with "no matches" kept distinct from
/// transport and server errors.
#[derive(Debug)]
enum SearchOutcome {
    /// Matching raw cards.
    Hits(Vec<RawCard>),
    /// The service's explicit "no cards matched" signal.
    NotFound,
}

/// Rate-limited, cached client for the Scryfall API.
pub struct CardSearchClient {
    /// API endpoint.
    endpoint: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// TTL cache of full raw result lists.
    cache: SearchCache,
    /// Process-wide outbound spacing.
    limiter: RateLimiter,
}

impl CardSearchClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.scryfall.com";

    /// Default cache TTL.
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

    /// Default minimum spacing between outbound requests.
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

    /// Default cached query capacity.
    pub const DEFAULT_CACHE_CAPACITY: usize = 256;

    /// Creates a client with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(
            Self::DEFAULT_ENDPOINT,
            Self::DEFAULT_CACHE_CAPACITY,
            Self::DEFAULT_CACHE_TTL,
            Self::DEFAULT_MIN_INTERVAL,
        )
    }

    /// Creates a client from configuration.
    #[must_use]
    pub fn from_config(config: &ScryfallConfig) -> Self {
        Self::with_settings(
            &config.endpoint,
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
            Duration::from_millis(config.min_request_interval_ms),
        )
    }

    /// Creates a client with explicit settings.
    #[must_use]
    pub fn with_settings(
        endpoint: &str,
        cache_capacity: usize,
        cache_ttl: Duration,
        min_interval: Duration,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("deckwise/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("Failed to build Scryfall HTTP client: {err}");
                reqwest::blocking::Client::new()
            });

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            cache: SearchCache::new(cache_capacity, cache_ttl),
            limiter: RateLimiter::new(min_interval),
        }
    }

    /// Fetches one card by its Scryfall id.
    ///
    /// Any failure is logged and yields `None`.
    #[must_use]
    pub fn fetch_card(&self, card_id: &str) -> Option<RawCard> {
        self.limiter.acquire();

        let response = self
            .client
            .get(format!("{}/cards/{card_id}", self.endpoint))
            .send();

        match response {
            Ok(response) if response.status().is_success() => match response.json() {
                Ok(card) => Some(card),
                Err(e) => {
                    tracing::error!(card_id = %card_id, error = %e, "Failed to parse card");
                    None
                },
            },
            Ok(response) => {
                tracing::warn!(
                    card_id = %card_id,
                    status = %response.status(),
                    "Card fetch returned error status"
                );
                None
            },
            Err(e) => {
                tracing::error!(card_id = %card_id, error = %e, "Card fetch failed");
                None
            },
        }
    }

    /// Issues the search request against the API.
    fn execute(
        &self,
        expression: &SearchExpression,
        order: SearchOrder,
        unique: UniqueMode,
    ) -> Result<SearchOutcome> {
        self.limiter.acquire();

        tracing::info!(expression = %expression, "Searching Scryfall");
        metrics::counter!("scryfall_requests").increment(1);

        let response = self
            .client
            .get(format!("{}/cards/search", self.endpoint))
            .query(&[
                ("q", expression.as_str()),
                ("order", order.as_str()),
                ("unique", unique.as_str()),
            ])
            .send()
            .map_err(|e| {
                tracing::error!(expression = %expression, error = %e, "Search request failed");
                Error::Search {
                    operation: "cards_search".to_string(),
                    cause: e.to_string(),
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            // Scryfall signals "no cards matched" as a 404 carrying an error
            // object; anything else on that status is a real failure.
            let body: ApiError = response.json().unwrap_or_default();
            if body.object == "error" {
                tracing::debug!(expression = %expression, "No cards matched");
                return Ok(SearchOutcome::NotFound);
            }
            return Err(Error::Search {
                operation: "cards_search".to_string(),
                cause: format!("unexpected 404 body for '{expression}'"),
            });
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(
                expression = %expression,
                status = %status,
                body = %body,
                "Search returned error status"
            );
            return Err(Error::Search {
                operation: "cards_search".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let body: SearchResponse = response.json().map_err(|e| {
            tracing::error!(expression = %expression, error = %e, "Failed to parse search response");
            Error::Search {
                operation: "cards_search_response".to_string(),
                cause: e.to_string(),
            }
        })?;

        Ok(SearchOutcome::Hits(body.data))
    }
}

impl Default for CardSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CardSource for CardSearchClient {
    fn search(
        &self,
        expression: &SearchExpression,
        order: SearchOrder,
        unique: UniqueMode,
        max_results: usize,
    ) -> Result<Vec<CardRecord>> {
        let key = CacheKey {
            expression: expression.as_str().to_string(),
            order,
            unique,
        };

        // A live cache entry answers without any network traffic.
        if let Some(cards) = self.cache.get(&key) {
            return Ok(cards
                .iter()
                .take(max_results)
                .map(|raw| CardRecord::from_raw(raw, expression.clone()))
                .collect());
        }

        let raw_cards = match self.execute(expression, order, unique)? {
            SearchOutcome::Hits(cards) => {
                // Cache the full unfiltered list; truncation applies only to
                // what the caller sees.
                self.cache.put(key, cards.clone());
                cards
            },
            SearchOutcome::NotFound => return Ok(Vec::new()),
        };

        Ok(raw_cards
            .iter()
            .take(max_results)
            .map(|raw| CardRecord::from_raw(raw, expression.clone()))
            .collect())
    }
}

/// Successful response body of the search API.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<RawCard>,
}

/// Error response body of the search API.
#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    object: String,
    #[serde(default)]
    #[allow(dead_code)]
    details: String,
}
