//! Listing card presentation

use crate::models::GymListing;
use serde::Serialize;

/// Facility badges shown before the "+N more" badge
const VISIBLE_FACILITIES: usize = 3;

/// Format an amount as Indian rupees with en-IN digit grouping and no fraction digits.
///
/// The last three digits form one group and the rest are grouped in pairs:
/// `1500` → `₹1,500`, `100000` → `₹1,00,000`.
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return "₹0".to_string();
    }

    let rounded = amount.abs().round() as u64;
    let digits = rounded.to_string();
    let sign = if amount < 0.0 && rounded > 0 { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{}₹{}", sign, digits);
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{}₹{},{}", sign, groups.join(","), tail)
}

/// Template view of one listing
#[derive(Debug, Clone, Serialize)]
pub struct GymCard {
    pub id: String,
    pub name: String,
    pub location: String,
    pub price: String,
    pub rating: String,
    pub total_reviews: u32,
    pub facilities: Vec<String>,
    /// Facilities not shown as badges
    pub more_facilities: usize,
    pub image: String,
}

impl From<&GymListing> for GymCard {
    fn from(gym: &GymListing) -> Self {
        let location = [gym.address.as_str(), gym.city.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            id: gym.id.clone(),
            name: gym.name.clone(),
            location,
            price: format_inr(gym.price_per_session),
            rating: format!("{:.1}", gym.rating),
            total_reviews: gym.total_reviews,
            facilities: gym
                .facilities
                .iter()
                .take(VISIBLE_FACILITIES)
                .cloned()
                .collect(),
            more_facilities: gym.facilities.len().saturating_sub(VISIBLE_FACILITIES),
            image: gym.cover_image().to_string(),
        }
    }
}

pub fn cards(gyms: &[GymListing]) -> Vec<GymCard> {
    gyms.iter().map(GymCard::from).collect()
}
