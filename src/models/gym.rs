//! Gym listing row

use super::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image shown when a listing has no photos
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// A gym's bookable profile as stored in the `gyms` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymListing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub price_per_session: f64,
    /// Average rating in [0, 5]
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_reviews: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_approved: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Free-form opening hours document
    #[serde(default)]
    pub opening_hours: Option<serde_json::Value>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GymListing {
    /// Create an approved, active listing with empty location and no facilities
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            price_per_session: 0.0,
            rating: 0.0,
            total_reviews: 0,
            facilities: Vec::new(),
            images: Vec::new(),
            is_approved: true,
            is_active: true,
            description: None,
            email: None,
            phone: None,
            latitude: None,
            longitude: None,
            opening_hours: None,
            owner_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_location(
        mut self,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.address = address.into();
        self.city = city.into();
        self.state = state.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price_per_session = price;
        self
    }

    pub fn with_rating(mut self, rating: f64, total_reviews: u32) -> Self {
        self.rating = rating;
        self.total_reviews = total_reviews;
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

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, is_approved: bool, is_active: bool) -> Self {
        self.is_approved = is_approved;
        self.is_active = is_active;
        self
    }

    /// Approved and active: the only listings search may return
    pub fn is_listed(&self) -> bool {
        self.is_approved && self.is_active
    }

    /// First photo or the placeholder
    pub fn cover_image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_columns() {
        let row = serde_json::json!({
            "id": "7d0c",
            "name": "Iron Paradise",
            "address": "12 MG Road",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411001",
            "price_per_session": 350,
            "rating": null,
            "total_reviews": null,
            "facilities": null,
            "images": null,
            "is_approved": true,
            "is_active": null,
            "opening_hours": {"mon": "6-22"},
            "created_at": "2024-03-01T10:00:00+00:00"
        });

        let gym: GymListing = serde_json::from_value(row).unwrap();
        assert_eq!(gym.rating, 0.0);
        assert_eq!(gym.total_reviews, 0);
        assert!(gym.facilities.is_empty());
        assert!(!gym.is_active);
        assert!(!gym.is_listed());
        assert_eq!(gym.price_per_session, 350.0);
        assert!(gym.created_at.is_some());
    }

    #[test]
    fn test_cover_image() {
        let gym = GymListing::new("1", "Zen Yoga");
        assert_eq!(gym.cover_image(), PLACEHOLDER_IMAGE);

        let gym = gym.with_images(["https://cdn.example/a.jpg", "https://cdn.example/b.jpg"]);
        assert_eq!(gym.cover_image(), "https://cdn.example/a.jpg");
    }
}
