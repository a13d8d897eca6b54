//! Facility vocabulary
//!
//! Listings tag their amenities with strings from a fixed list. Search treats the
//! requested facilities as an opaque set, so the list here is only used to populate
//! the filter UI and the `/api/facilities` endpoint.

/// Recognized facility tags, in display order
pub const FACILITIES: &[&str] = &[
    "Cardio Equipment",
    "Weight Training",
    "Personal Trainer",
    "Group Classes",
    "Swimming Pool",
    "Sauna",
    "Steam Room",
    "Locker Room",
    "Parking",
    "24/7 Access",
    "Air Conditioning",
    "Yoga Studio",
    "CrossFit",
    "Pilates",
];

/// Built-in vocabulary as owned strings (settings default)
pub fn default_vocabulary() -> Vec<String> {
    FACILITIES.iter().map(|f| f.to_string()).collect()
}

/// True when `listing` carries at least one of `requested`.
///
/// An empty request matches everything.
pub fn intersects<S: AsRef<str>>(listing: &[String], requested: &[S]) -> bool {
    requested.is_empty()
        || requested
            .iter()
            .any(|wanted| listing.iter().any(|have| have == wanted.as_ref()))
}
