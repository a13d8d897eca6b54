//! Search execution

use super::error::SearchError;
use super::models::SearchFilters;
use super::refine::{default_refinements, Refinement};
use crate::metrics::Metrics;
use crate::models::GymListing;
use crate::query::{Column, ListingQuery, Order, Value};
use crate::store::ListingStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Location text is matched against any of these
const LOCATION_COLUMNS: &[Column] = &[Column::City, Column::State, Column::Address];

/// Composes listing queries from filters and runs them against a store
pub struct GymSearchEngine {
    store: Arc<dyn ListingStore>,
    metrics: Arc<Metrics>,
    refinements: Vec<Box<dyn Refinement>>,
    /// Let refinements become store predicates when the store supports them
    push_down: bool,
}

impl GymSearchEngine {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self {
            store,
            metrics: Arc::new(Metrics::new()),
            refinements: default_refinements(),
            push_down: false,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Push facility matching into the store query when the store can evaluate it
    pub fn with_push_down(mut self, enabled: bool) -> Self {
        self.push_down = enabled;
        self
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Approved and active listings, best rated first. Ties order by id.
    fn base_query() -> ListingQuery {
        ListingQuery::new()
            .eq(Column::IsApproved, Value::Bool(true))
            .eq(Column::IsActive, Value::Bool(true))
            .order_by(Order::desc(Column::Rating))
            .order_by(Order::asc(Column::Id))
    }

    /// Build the store query and the refinements left for the client side
    fn compose<'a>(
        &'a self,
        filters: &SearchFilters,
        query_text: &str,
    ) -> (ListingQuery, Vec<&'a dyn Refinement>) {
        let mut query = Self::base_query();

        // text is matched as given; whitespace is part of the substring
        if !filters.location.is_empty() {
            query = query.any_ilike(LOCATION_COLUMNS, filters.location.as_str());
        }

        if !query_text.is_empty() {
            query = query.ilike(Column::Name, query_text);
        }

        query = query
            .gte(Column::PricePerSession, filters.price_range.min)
            .lte(Column::PricePerSession, filters.price_range.max);

        if filters.min_rating > 0.0 {
            query = query.gte(Column::Rating, filters.min_rating);
        }

        let capabilities = self.store.capabilities();
        let mut client_side = Vec::new();

        for refinement in self.refinements.iter().filter(|r| r.is_active(filters)) {
            let pushed = self
                .push_down
                .then(|| refinement.push_down(filters, capabilities))
                .flatten();

            match pushed {
                Some(predicate) => {
                    debug!("Refinement '{}' evaluated by store", refinement.name());
                    query.predicates.push(predicate);
                }
                None => client_side.push(refinement.as_ref()),
            }
        }

        (query, client_side)
    }

    /// Search approved, active listings.
    ///
    /// Location, name, price and rating are evaluated by the store; facilities are
    /// matched on the fetched rows unless pushed down. The result keeps the store's
    /// rating-descending order. Store failures are returned as
    /// [`SearchError::SearchFailed`] without retrying.
    pub async fn search(
        &self,
        filters: &SearchFilters,
        query_text: &str,
    ) -> Result<Vec<GymListing>, SearchError> {
        self.metrics.inc_search();

        if let Err(e) = filters.validate() {
            self.metrics.record_rejected();
            warn!("Rejected search filters: {}", e);
            return Err(e);
        }

        let (query, client_side) = self.compose(filters, query_text);
        debug!("Listing query: {:?}", query.to_params());

        let start = Instant::now();
        let mut listings = match self.store.fetch(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                self.metrics.record_failure();
                warn!("Store '{}' failed: {}", self.store.name(), e);
                return Err(e.into());
            }
        };
        let elapsed = start.elapsed();

        let fetched = listings.len();
        if !client_side.is_empty() {
            listings.retain(|gym| client_side.iter().all(|r| r.retain(filters, gym)));
        }

        self.metrics
            .record_success(elapsed.as_millis() as u64, listings.len());

        info!(
            "Search '{}' returned {} gyms ({} fetched) in {:?}",
            query_text,
            listings.len(),
            fetched,
            elapsed
        );

        Ok(listings)
    }

    /// Best rated approved, active listings for the home page
    pub async fn featured(&self, limit: usize) -> Result<Vec<GymListing>, SearchError> {
        let query = Self::base_query().limit(limit);

        self.store.fetch(&query).await.map_err(|e| {
            warn!("Failed to fetch featured gyms: {}", e);
            SearchError::from(e)
        })
    }
}
