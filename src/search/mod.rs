//! Gym search
//!
//! Composes store queries from the user's filters, applies client-side refinements
//! and tracks which response a browsing session should display.

mod error;
mod executor;
mod models;
pub mod refine;
mod session;

pub use error::SearchError;
pub use executor::GymSearchEngine;
pub use models::*;
pub use session::{SearchSession, SearchView, Ticket};
