//! Client-side refinement of fetched listings
//!
//! Predicates split into two groups. Name, location, price, rating and the
//! approved/active flags go into the store query. Facility matching runs here, over
//! the fetched rows, because the default query path does not ask the store for array
//! intersection. A refinement may offer an equivalent store predicate; the engine
//! uses it instead when the store advertises the capability and the deployment opts in.

use super::models::SearchFilters;
use crate::facilities;
use crate::models::GymListing;
use crate::query::{Column, Predicate};
use crate::store::StoreCapabilities;

/// A predicate applied after the store fetch
pub trait Refinement: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the filters ask for this refinement at all
    fn is_active(&self, filters: &SearchFilters) -> bool;

    /// Keep or drop a fetched listing
    fn retain(&self, filters: &SearchFilters, gym: &GymListing) -> bool;

    /// Store-side equivalent, if the store can evaluate one
    fn push_down(
        &self,
        _filters: &SearchFilters,
        _capabilities: StoreCapabilities,
    ) -> Option<Predicate> {
        None
    }
}

/// Keeps listings offering at least one requested facility
pub struct FacilityRefinement;

impl Refinement for FacilityRefinement {
    fn name(&self) -> &str {
        "facilities"
    }

    fn is_active(&self, filters: &SearchFilters) -> bool {
        !filters.facilities.is_empty()
    }

    fn retain(&self, filters: &SearchFilters, gym: &GymListing) -> bool {
        facilities::intersects(&gym.facilities, &filters.facilities)
    }

    fn push_down(
        &self,
        filters: &SearchFilters,
        capabilities: StoreCapabilities,
    ) -> Option<Predicate> {
        capabilities.array_overlap.then(|| Predicate::Overlaps {
            column: Column::Facilities,
            values: filters.facilities.clone(),
        })
    }
}

/// Refinements every engine applies
pub fn default_refinements() -> Vec<Box<dyn Refinement>> {
    vec![Box::new(FacilityRefinement)]
}
