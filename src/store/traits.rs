//! Store traits and error types

use crate::models::GymListing;
use crate::query::ListingQuery;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Failure talking to or reading from a listing store
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StoreError {
    #[error("Store request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Store rejected credentials (HTTP {0})")]
    Unauthorized(u16),
    #[error("Store returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Failed to parse store response: {0}")]
    Parse(String),
    #[error("Failed to load fixture: {0}")]
    Fixture(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Optional query operators a store can evaluate itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCapabilities {
    /// Array overlap (`ov`) on array columns
    pub array_overlap: bool,
}

/// Read access to the listings table
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Store name for logs and metrics
    fn name(&self) -> &str;

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::default()
    }

    /// Run a query and return matching rows in the query's order
    async fn fetch(&self, query: &ListingQuery) -> Result<Vec<GymListing>, StoreError>;
}
