//! Re-run searches as filters change
//!
//! Every request gets a sequence number. A response is shown only if it is newer than
//! the one on display, so a slow request finishing after a fast later one is dropped.
//! Requests are never cancelled.

use super::error::SearchError;
use super::executor::GymSearchEngine;
use super::models::{FilterSnapshot, FilterState};
use crate::models::GymListing;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// An issued request
#[derive(Debug, Clone)]
pub struct Ticket {
    pub seq: u64,
    pub snapshot: FilterSnapshot,
}

/// What the results area shows
#[derive(Debug, Clone, Default)]
pub struct SearchView {
    pub listings: Vec<GymListing>,
    pub loading: bool,
    pub error: Option<SearchError>,
    /// Sequence number of the displayed response, 0 before the first one
    pub seq: u64,
}

#[derive(Default)]
struct Displayed {
    listings: Vec<GymListing>,
    error: Option<SearchError>,
    seq: u64,
}

/// One browsing session: filter state plus the latest displayed result
pub struct SearchSession {
    engine: Arc<GymSearchEngine>,
    state: Mutex<FilterState>,
    issued: AtomicU64,
    displayed: RwLock<Displayed>,
}

impl SearchSession {
    pub fn new(engine: Arc<GymSearchEngine>) -> Self {
        Self::with_state(engine, FilterState::new())
    }

    pub fn with_state(engine: Arc<GymSearchEngine>, state: FilterState) -> Self {
        Self {
            engine,
            state: Mutex::new(state),
            issued: AtomicU64::new(0),
            displayed: RwLock::new(Displayed::default()),
        }
    }

    /// Mutate the filter state. Listeners registered on it fire as usual.
    pub fn update_filters<R>(&self, f: impl FnOnce(&mut FilterState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
            .clone()
    }

    /// Issue a new request for the current filters
    pub fn begin(&self) -> Ticket {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            seq,
            snapshot: self.snapshot(),
        }
    }

    /// Apply a response. Returns false if a newer response is already displayed.
    pub fn complete(
        &self,
        ticket: Ticket,
        outcome: Result<Vec<GymListing>, SearchError>,
    ) -> bool {
        let mut displayed = self
            .displayed
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if ticket.seq <= displayed.seq {
            debug!(
                "Discarding stale response #{} (showing #{})",
                ticket.seq, displayed.seq
            );
            return false;
        }

        displayed.seq = ticket.seq;
        match outcome {
            Ok(listings) => {
                displayed.listings = listings;
                displayed.error = None;
            }
            // previous listings stay
            Err(e) => displayed.error = Some(e),
        }
        true
    }

    /// Search with the current filters and display the outcome
    pub async fn refresh(&self) -> SearchView {
        let ticket = self.begin();
        let FilterSnapshot { query, filters } = &ticket.snapshot;
        let outcome = self.engine.search(filters, query).await;
        self.complete(ticket, outcome);
        self.view()
    }

    pub fn view(&self) -> SearchView {
        let displayed = self
            .displayed
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        SearchView {
            listings: displayed.listings.clone(),
            loading: displayed.seq < self.issued.load(Ordering::SeqCst),
            error: displayed.error.clone(),
            seq: displayed.seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};

    fn session() -> SearchSession {
        let store = MemoryStore::with_rows(vec![
            GymListing::new("g1", "Iron Paradise")
                .with_location("MG Road", "Pune", "Maharashtra")
                .with_rating(4.9, 10),
            GymListing::new("g2", "Zen Yoga")
                .with_location("Lake View", "Bengaluru", "Karnataka")
                .with_rating(4.4, 10),
        ]);
        SearchSession::new(Arc::new(GymSearchEngine::new(Arc::new(store))))
    }

    fn gym(id: &str) -> GymListing {
        GymListing::new(id, id)
    }

    #[test]
    fn test_initial_view() {
        let view = session().view();
        assert!(view.listings.is_empty());
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.seq, 0);
    }

    #[test]
    fn test_loading_until_latest_completes() {
        let session = session();
        let first = session.begin();
        let second = session.begin();
        assert!(session.view().loading);

        assert!(session.complete(first, Ok(vec![gym("a")])));
        assert!(session.view().loading);

        assert!(session.complete(second, Ok(vec![gym("b")])));
        assert!(!session.view().loading);
    }

    #[test]
    fn test_stale_response_discarded() {
        let session = session();
        let older = session.begin();
        let newer = session.begin();

        assert!(session.complete(newer, Ok(vec![gym("new")])));
        assert!(!session.complete(older, Ok(vec![gym("old")])));

        let view = session.view();
        assert_eq!(view.listings, vec![gym("new")]);
        assert_eq!(view.seq, 2);
        assert!(!view.loading);
    }

    #[test]
    fn test_failure_keeps_previous_listings() {
        let session = session();
        let ok = session.begin();
        session.complete(ok, Ok(vec![gym("a")]));

        let failing = session.begin();
        session.complete(
            failing,
            Err(SearchError::SearchFailed(StoreError::Timeout)),
        );

        let view = session.view();
        assert_eq!(view.listings, vec![gym("a")]);
        assert_eq!(
            view.error,
            Some(SearchError::SearchFailed(StoreError::Timeout))
        );

        let retry = session.begin();
        session.complete(retry, Ok(vec![]));
        assert!(session.view().error.is_none());
    }

    #[test]
    fn test_ticket_captures_snapshot() {
        let session = session();
        session.update_filters(|s| s.set_location("Pune"));
        let ticket = session.begin();
        session.update_filters(|s| s.set_location("Goa"));
        assert_eq!(ticket.snapshot.filters.location, "Pune");
    }

    #[test]
    fn test_refresh_clears_loading() {
        let session = session();
        session.update_filters(|s| s.set_location("karnataka"));

        let view = tokio_test::block_on(session.refresh());
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.listings.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_uses_current_filters() {
        let session = session();

        let view = session.refresh().await;
        assert_eq!(view.listings.len(), 2);

        session.update_filters(|s| s.set_query("zen"));
        let view = session.refresh().await;
        assert_eq!(view.listings.len(), 1);
        assert_eq!(view.listings[0].id, "g2");
        assert_eq!(view.seq, 2);
    }

    #[tokio::test]
    async fn test_refresh_reports_invalid_filters() {
        let session = session();
        session.refresh().await;

        // setters clamp, so an invalid rating has to be written directly
        let ticket = session.begin();
        let mut snapshot = ticket.snapshot.clone();
        snapshot.filters.min_rating = 7.0;
        let outcome = session
            .engine
            .search(&snapshot.filters, &snapshot.query)
            .await;
        session.complete(ticket, outcome);

        let view = session.view();
        assert!(matches!(view.error, Some(SearchError::InvalidFilter(_))));
        assert_eq!(view.listings.len(), 2);
    }
}
