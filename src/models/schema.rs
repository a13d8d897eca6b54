//! Session, booking, review, messaging and profile rows

use super::null_as_default;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookable time slot at a gym (`gym_sessions`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymSession {
    pub id: String,
    pub gym_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub booked_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_available: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GymSession {
    pub fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.booked_count)
    }

    /// Open for booking and not full. Capacity is advisory; nothing here reserves a spot.
    pub fn is_bookable(&self) -> bool {
        self.is_available && self.remaining_capacity() > 0
    }
}

/// Lifecycle of a booking. Unrecognized values are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    #[serde(untagged)]
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's reservation of a session (`bookings`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub gym_id: String,
    pub session_id: String,
    pub booking_date: NaiveDate,
    pub session_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: BookingStatus,
    pub total_amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A rating left for a gym (`reviews`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub gym_id: String,
    pub user_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_approved: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Star ratings run from 1 to 5
    pub fn is_valid_rating(&self) -> bool {
        (1..=5).contains(&self.rating)
    }
}

/// Direct message between two users, optionally about a gym (`messages`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default)]
    pub gym_id: Option<String>,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Kind of account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Customer,
    GymOwner,
    Admin,
}

/// Public profile attached to an identity-provider user (`profiles`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_type: UserType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
