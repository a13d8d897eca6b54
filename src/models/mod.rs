//! Data model for the gym marketplace
//!
//! Row types mirror the hosted database tables. Nullable columns the application
//! always treats as a value (ratings, counts, flags, arrays) read as their default.

mod gym;
mod schema;

pub use gym::{GymListing, PLACEHOLDER_IMAGE};
pub use schema::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable column into `T::default()` when it is null
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
