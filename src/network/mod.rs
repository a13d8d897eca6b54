//! HTTP networking module
//!
//! Provides the HTTP client used by REST-backed stores.

mod client;

pub use client::{HttpClient, HttpRequest, HttpResponse};
