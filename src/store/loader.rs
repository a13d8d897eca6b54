//! Store loader for building the configured backend

use super::memory::MemoryStore;
use super::postgrest::PostgrestStore;
use super::traits::ListingStore;
use crate::config::{Settings, StoreBackend};
use crate::network::HttpClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds a [`ListingStore`] from settings
pub struct StoreLoader;

impl StoreLoader {
    pub fn load(settings: &Settings) -> Result<Arc<dyn ListingStore>> {
        let store = &settings.store;

        match store.backend {
            StoreBackend::Postgrest => {
                let client = HttpClient::with_settings(&settings.outgoing)?;
                let postgrest = PostgrestStore::from_settings(client, store)?;
                if store.api_key.is_none() {
                    warn!("No store API key configured; requests are sent anonymously");
                }
                info!("Using PostgREST store at {}", postgrest.table_url());
                Ok(Arc::new(postgrest))
            }
            StoreBackend::Memory => {
                let memory = match store.fixture {
                    Some(ref path) => MemoryStore::from_file(path)?,
                    None => {
                        warn!("Memory store has no fixture; it starts empty");
                        MemoryStore::new()
                    }
                };
                info!("Using memory store with {} listings", memory.len());
                Ok(Arc::new(
                    memory.with_array_overlap(store.server_side_facilities),
                ))
            }
        }
    }
}
