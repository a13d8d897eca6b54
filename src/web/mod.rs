//! Web server module
//!
//! Provides the HTML pages and JSON API for GymSpot.

mod card;
mod error;
mod handlers;
mod routes;
mod state;
mod templates;

pub use card::{format_inr, GymCard};
pub use error::ApiError;
pub use handlers::SearchParams;
pub use routes::create_router;
pub use state::AppState;
pub use templates::Templates;
