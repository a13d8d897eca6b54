//! Search error types

use crate::store::StoreError;
use thiserror::Error;

/// Failure of a single search call. An empty result is not an error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    /// The store could not be queried; no partial results are returned
    #[error("Search failed: {0}")]
    SearchFailed(#[from] StoreError),
    /// Filters the UI controls would never produce
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

impl SearchError {
    /// Stable identifier for API responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SearchFailed(_) => "search_failed",
            Self::InvalidFilter(_) => "invalid_filter",
        }
    }
}
