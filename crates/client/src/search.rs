//! Search-as-you-type suggestions.
//!
//! Every keystroke starts a new generation. A response is shown only if no
//! newer keystroke has happened since its request was issued, so a slow
//! response for `"ab"` can never overwrite the results for `"abc"`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, instrument};

use cartwheel_core::Product;

use crate::gateway::{CatalogGateway, GatewayError};

/// Queries shorter than this produce no request.
pub const DEFAULT_MIN_CHARS: usize = 2;

/// Proof that a request belongs to a particular keystroke.
#[derive(Debug, Clone)]
pub struct SuggestionTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
    query: String,
}

impl SuggestionTicket {
    /// The generation this ticket was issued for.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The query to send.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether no newer keystroke has been recorded since this ticket.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}

/// Tracks the latest query and the suggestions shown for it.
#[derive(Debug)]
pub struct SuggestionTracker {
    latest: Arc<AtomicU64>,
    min_chars: usize,
    query: String,
    suggestions: Vec<Product>,
}

impl Default for SuggestionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CHARS)
    }
}

impl SuggestionTracker {
    /// Create a tracker that ignores queries shorter than `min_chars`.
    #[must_use]
    pub fn new(min_chars: usize) -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            min_chars,
            query: String::new(),
            suggestions: Vec::new(),
        }
    }

    /// Record a keystroke.
    ///
    /// Always invalidates every outstanding ticket. Returns a ticket for the
    /// new query, or `None` (and clears the suggestions) when the trimmed
    /// query is too short to search.
    pub fn begin(&mut self, query: &str) -> Option<SuggestionTicket> {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        query.trim().clone_into(&mut self.query);

        if self.query.chars().count() < self.min_chars {
            self.suggestions.clear();
            return None;
        }

        Some(SuggestionTicket {
            generation,
            latest: Arc::clone(&self.latest),
            query: self.query.clone(),
        })
    }

    /// Show results for a ticket, if it is still current.
    ///
    /// Returns `false` and leaves the suggestions untouched when a newer
    /// keystroke has happened since the ticket was issued.
    pub fn complete(&mut self, ticket: &SuggestionTicket, results: Vec<Product>) -> bool {
        if !Arc::ptr_eq(&ticket.latest, &self.latest) || !ticket.is_current() {
            debug!(
                generation = ticket.generation,
                query = %ticket.query,
                "Discarding stale suggestions"
            );
            return false;
        }
        self.suggestions = results;
        true
    }

    /// Drop the current query and suggestions, invalidating outstanding tickets.
    pub fn clear(&mut self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
        self.query.clear();
        self.suggestions.clear();
    }

    /// Suggestions currently shown.
    #[must_use]
    pub fn suggestions(&self) -> &[Product] {
        &self.suggestions
    }

    /// The last recorded query, trimmed.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The latest generation issued.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}

/// Wait out the debounce, then fetch suggestions for a ticket.
///
/// Returns `Ok(None)` without calling the gateway if the ticket went stale
/// during the debounce, and `Ok(None)` if it went stale while the request was
/// in flight.
///
/// # Errors
///
/// Returns the gateway's error for a current ticket.
#[instrument(skip(gateway, ticket), fields(query = %ticket.query(), generation = ticket.generation()))]
pub async fn fetch_suggestions<G: CatalogGateway>(
    gateway: &G,
    ticket: &SuggestionTicket,
    debounce: Duration,
) -> Result<Option<Vec<Product>>, GatewayError> {
    if !debounce.is_zero() {
        tokio::time::sleep(debounce).await;
    }
    if !ticket.is_current() {
        debug!("Superseded during debounce");
        return Ok(None);
    }

    let results = gateway.suggest_products(ticket.query()).await?;

    if !ticket.is_current() {
        debug!("Superseded while in flight");
        return Ok(None);
    }
    Ok(Some(results))
}
