//! GymSpot: gym discovery with filterable listing search
//!
//! Listings live in a hosted PostgREST table (or an in-memory fixture). The search
//! engine turns the user's filters into a store query, refines the rows it gets
//! back and serves them as HTML pages or JSON.

pub mod config;
pub mod facilities;
pub mod metrics;
pub mod models;
pub mod network;
pub mod query;
pub mod search;
pub mod store;
pub mod web;

pub use config::Settings;
pub use models::GymListing;
pub use search::{GymSearchEngine, SearchError, SearchFilters, SearchSession};
pub use store::{ListingStore, StoreError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
