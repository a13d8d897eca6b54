//! Listing store module
//!
//! Defines the [`ListingStore`] trait the search engine queries through, and the
//! PostgREST and in-memory implementations.

mod loader;
mod memory;
mod postgrest;
mod traits;

pub use loader::StoreLoader;
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
pub use traits::*;
