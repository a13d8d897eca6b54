//! Search filters and the mutable filter state behind the search UI

use super::error::SearchError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lowest selectable price per session
pub const PRICE_FLOOR: f64 = 0.0;
/// Highest selectable price per session
pub const PRICE_CEILING: f64 = 2000.0;
/// Minimum-rating slider granularity
pub const RATING_STEP: f64 = 0.5;
/// Top of the rating scale
pub const MAX_RATING: f64 = 5.0;

/// Closed price interval, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp both ends into `[floor, ceiling]` and order them, as the two-thumb slider does
    pub fn clamped(min: f64, max: f64, floor: f64, ceiling: f64) -> Self {
        let clamp = |v: f64| if v.is_nan() { floor } else { v.clamp(floor, ceiling) };
        let (a, b) = (clamp(min), clamp(max));
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The full slider domain
    pub fn is_unbounded(&self) -> bool {
        self.min <= PRICE_FLOOR && self.max >= PRICE_CEILING
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(PRICE_FLOOR, PRICE_CEILING)
    }
}

/// Filter criteria narrowing the listing set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Matched against city, state or address
    pub location: String,
    pub price_range: PriceRange,
    /// Listings must carry at least one of these
    pub facilities: Vec<String>,
    /// 0 disables the rating floor
    pub min_rating: f64,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            location: String::new(),
            price_range: PriceRange::default(),
            facilities: Vec::new(),
            min_rating: 0.0,
        }
    }
}

impl SearchFilters {
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = PriceRange::new(min, max);
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = rating;
        self
    }

    pub fn with_facilities<I, S>(mut self, facilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facilities = facilities.into_iter().map(Into::into).collect();
        self
    }

    /// Reject filters the UI could never produce. Bounds are not reordered.
    pub fn validate(&self) -> Result<(), SearchError> {
        let PriceRange { min, max } = self.price_range;

        if !min.is_finite() || !max.is_finite() {
            return Err(SearchError::InvalidFilter(
                "price bounds must be finite".to_string(),
            ));
        }
        if min < 0.0 {
            return Err(SearchError::InvalidFilter(format!(
                "minimum price {} is negative",
                min
            )));
        }
        if min > max {
            return Err(SearchError::InvalidFilter(format!(
                "minimum price {} exceeds maximum price {}",
                min, max
            )));
        }
        if !(0.0..=MAX_RATING).contains(&self.min_rating) {
            return Err(SearchError::InvalidFilter(format!(
                "minimum rating {} is outside 0..={}",
                self.min_rating, MAX_RATING
            )));
        }
        Ok(())
    }
}

/// Snap a rating to the slider `step` and clamp it to the scale.
///
/// A step that is not a positive number leaves the rating unsnapped.
pub fn quantize_rating(rating: f64, step: f64) -> f64 {
    if rating.is_nan() {
        return 0.0;
    }
    let snapped = if step.is_finite() && step > 0.0 {
        (rating / step).round() * step
    } else {
        rating
    };
    snapped.clamp(0.0, MAX_RATING)
}

/// Query text plus filters: everything one search needs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSnapshot {
    /// Matched against gym names
    pub query: String,
    pub filters: SearchFilters,
}

impl FilterSnapshot {
    /// Chips for the non-default filters; the price range is never a chip
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        let mut active = Vec::new();

        if !self.query.is_empty() {
            active.push(ActiveFilter::Query(self.query.clone()));
        }
        if !self.filters.location.is_empty() {
            active.push(ActiveFilter::Location(self.filters.location.clone()));
        }
        if self.filters.min_rating > 0.0 {
            active.push(ActiveFilter::MinRating(self.filters.min_rating));
        }
        active.extend(
            self.filters
                .facilities
                .iter()
                .cloned()
                .map(ActiveFilter::Facility),
        );

        active
    }

    /// Copy with one chip removed
    pub fn without(&self, filter: &ActiveFilter) -> Self {
        let mut next = self.clone();
        match filter {
            ActiveFilter::Query(_) => next.query.clear(),
            ActiveFilter::Location(_) => next.filters.location.clear(),
            ActiveFilter::MinRating(_) => next.filters.min_rating = 0.0,
            ActiveFilter::Facility(f) => next.filters.facilities.retain(|have| have != f),
        }
        next
    }
}

/// A removable chip shown above the results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActiveFilter {
    Query(String),
    Location(String),
    MinRating(f64),
    Facility(String),
}

impl ActiveFilter {
    pub fn label(&self) -> String {
        match self {
            Self::Query(q) => format!("Search: {}", q),
            Self::Location(l) => format!("Location: {}", l),
            Self::MinRating(r) => format!("Min Rating: {}★", r),
            Self::Facility(f) => f.clone(),
        }
    }
}

pub type FilterListener = Arc<dyn Fn(&FilterSnapshot) + Send + Sync>;

/// Mutable filter state for one browsing session.
///
/// Setters clamp values the way the UI controls do. Listeners are called after
/// every mutation that changes the snapshot.
pub struct FilterState {
    snapshot: FilterSnapshot,
    price_floor: f64,
    price_ceiling: f64,
    rating_step: f64,
    listeners: Vec<FilterListener>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::with_price_domain(PRICE_FLOOR, PRICE_CEILING)
    }

    pub fn with_price_domain(floor: f64, ceiling: f64) -> Self {
        let mut snapshot = FilterSnapshot::default();
        snapshot.filters.price_range = PriceRange::new(floor, ceiling);
        Self {
            snapshot,
            price_floor: floor,
            price_ceiling: ceiling,
            rating_step: RATING_STEP,
            listeners: Vec::new(),
        }
    }

    /// Use a different rating slider step
    pub fn with_rating_step(mut self, step: f64) -> Self {
        self.rating_step = step;
        self
    }

    pub fn snapshot(&self) -> &FilterSnapshot {
        &self.snapshot
    }

    pub fn query(&self) -> &str {
        &self.snapshot.query
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.snapshot.filters
    }

    /// Register a change listener
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&FilterSnapshot) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.update(|s| s.query = query);
    }

    pub fn clear_query(&mut self) {
        self.set_query("");
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        let location = location.into();
        self.update(|s| s.filters.location = location);
    }

    pub fn clear_location(&mut self) {
        self.set_location("");
    }

    pub fn set_price_range(&mut self, min: f64, max: f64) {
        let range = PriceRange::clamped(min, max, self.price_floor, self.price_ceiling);
        self.update(|s| s.filters.price_range = range);
    }

    pub fn set_min_rating(&mut self, rating: f64) {
        let rating = quantize_rating(rating, self.rating_step);
        self.update(|s| s.filters.min_rating = rating);
    }

    pub fn clear_min_rating(&mut self) {
        self.set_min_rating(0.0);
    }

    /// Add the facility if absent, remove it if present
    pub fn toggle_facility(&mut self, facility: &str) {
        self.update(|s| {
            let facilities = &mut s.filters.facilities;
            if let Some(pos) = facilities.iter().position(|f| f == facility) {
                facilities.remove(pos);
            } else {
                facilities.push(facility.to_string());
            }
        });
    }

    pub fn remove_facility(&mut self, facility: &str) {
        self.update(|s| s.filters.facilities.retain(|f| f != facility));
    }

    /// Reset every filter and the query text to their defaults
    pub fn clear_filters(&mut self) {
        let defaults = Self::with_price_domain(self.price_floor, self.price_ceiling).snapshot;
        self.update(|s| *s = defaults);
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.snapshot.active_filters()
    }

    fn update(&mut self, mutate: impl FnOnce(&mut FilterSnapshot)) {
        let before = self.snapshot.clone();
        mutate(&mut self.snapshot);

        if self.snapshot != before {
            for listener in &self.listeners {
                listener(&self.snapshot);
            }
        }
    }
}
