//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::search::GymSearchEngine;
use crate::store::ListingStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search engine over the configured store
    pub engine: Arc<GymSearchEngine>,
    pub metrics: Arc<Metrics>,
    /// Template renderer
    pub templates: Arc<super::Templates>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, store: Arc<dyn ListingStore>) -> anyhow::Result<Self> {
        let metrics = Arc::new(Metrics::new());
        let engine = GymSearchEngine::new(store)
            .with_metrics(metrics.clone())
            .with_push_down(settings.store.server_side_facilities);
        let templates = Arc::new(super::Templates::new()?);

        Ok(Self {
            settings: Arc::new(settings),
            engine: Arc::new(engine),
            metrics,
            templates,
        })
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
