//! In-memory listing store
//!
//! Evaluates [`ListingQuery`] against rows held in memory. Rows that compare equal
//! under the query's ordering keep their insertion order.

use super::traits::*;
use crate::models::GymListing;
use crate::query::ListingQuery;
use async_trait::async_trait;
use std::path::Path;

#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<GymListing>,
    array_overlap: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<GymListing>) -> Self {
        Self {
            rows,
            array_overlap: false,
        }
    }

    /// Load rows from a YAML or JSON (by extension) fixture file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?;

        let rows: Vec<GymListing> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?,
            _ => serde_yaml::from_str(&content)
                .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?,
        };

        Ok(Self::with_rows(rows))
    }

    /// Advertise array-overlap support so facility filtering can be pushed down
    pub fn with_array_overlap(mut self, enabled: bool) -> Self {
        self.array_overlap = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            array_overlap: self.array_overlap,
        }
    }

    async fn fetch(&self, query: &ListingQuery) -> Result<Vec<GymListing>, StoreError> {
        let mut matched: Vec<GymListing> = self
            .rows
            .iter()
            .filter(|g| query.matches(g))
            .cloned()
            .collect();
        matched.sort_by(|a, b| query.compare(a, b));

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Column, Order, Value};

    fn rows() -> Vec<GymListing> {
        vec![
            GymListing::new("a", "Alpha").with_rating(4.0, 3),
            GymListing::new("b", "Bravo").with_rating(4.9, 10),
            GymListing::new("c", "Charlie")
                .with_rating(4.9, 2)
                .with_status(false, true),
            GymListing::new("d", "Delta").with_rating(4.0, 7),
        ]
    }

    #[tokio::test]
    async fn test_filter_sort_limit() {
        let store = MemoryStore::with_rows(rows());
        let query = ListingQuery::new()
            .eq(Column::IsApproved, Value::Bool(true))
            .order_by(Order::desc(Column::Rating))
            .limit(2);

        let result = store.fetch(&query).await.unwrap();
        let ids: Vec<_> = result.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let store = MemoryStore::with_rows(rows());
        let query = ListingQuery::new().order_by(Order::desc(Column::Rating));

        let ids: Vec<_> = store
            .fetch(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[tokio::test]
    async fn test_text_match_is_literal() {
        let store = MemoryStore::with_rows(vec![
            GymListing::new("a", "24*7 Fitness"),
            GymListing::new("b", "24x7 Gym"),
            GymListing::new("c", "100% Fit"),
        ]);

        let names = |rows: Vec<GymListing>| {
            rows.into_iter().map(|g| g.name).collect::<Vec<_>>()
        };

        let star = ListingQuery::new().ilike(Column::Name, "24*7");
        assert_eq!(names(store.fetch(&star).await.unwrap()), vec!["24*7 Fitness"]);

        let percent = ListingQuery::new().ilike(Column::Name, "0%");
        assert_eq!(names(store.fetch(&percent).await.unwrap()), vec!["100% Fit"]);
    }

    #[test]
    fn test_load_yaml_fixture() {
        let path = std::env::temp_dir().join(format!("gymspot-fixture-{}.yml", std::process::id()));
        std::fs::write(
            &path,
            "- id: g1\n  name: Iron Paradise\n  city: Pune\n  price_per_session: 300\n  rating: 4.5\n  is_approved: true\n  is_active: true\n  facilities: [Sauna, Parking]\n",
        )
        .unwrap();

        let store = MemoryStore::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(store.len(), 1);

        let err = MemoryStore::from_file("/nonexistent/gyms.yml").err().unwrap();
        assert!(matches!(err, StoreError::Fixture(_)));
    }
}
