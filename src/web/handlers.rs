//! HTTP request handlers

use super::card::cards;
use super::error::{status_for, ApiError};
use super::state::AppState;
use crate::config::SearchSettings;
use crate::models::GymListing;
use crate::search::{quantize_rating, FilterSnapshot, PriceRange, SearchError, SearchFilters};
use axum::{
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tera::Context;
use url::form_urlencoded;

/// Query parameters for search.
///
/// Facilities arrive either comma separated in `facilities` or as repeated
/// `facility` checkboxes from the filter form.
#[derive(Debug, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub location: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub min_rating: Option<String>,
    pub facilities: Vec<String>,
    /// Output format
    pub format: Option<String>,
}

impl SearchParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "q" => params.q = Some(value),
                "location" => params.location = Some(value),
                "price_min" => params.price_min = Some(value),
                "price_max" => params.price_max = Some(value),
                "min_rating" => params.min_rating = Some(value),
                "format" => params.format = Some(value),
                "facilities" | "facility" => {
                    for facility in value.split(',').map(str::trim) {
                        if !facility.is_empty() && !params.facilities.iter().any(|f| f == facility) {
                            params.facilities.push(facility.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        params
    }

    /// Filters as the UI controls would produce them.
    ///
    /// Each price bound is clamped into the slider domain on its own, so an inverted
    /// range stays inverted and is rejected by the engine.
    pub fn to_snapshot(&self, search: &SearchSettings) -> Result<FilterSnapshot, SearchError> {
        let clamp = |v: f64| v.max(search.price_floor).min(search.price_ceiling);

        let min = parse_number("price_min", &self.price_min)?
            .map(clamp)
            .unwrap_or(search.price_floor);
        let max = parse_number("price_max", &self.price_max)?
            .map(clamp)
            .unwrap_or(search.price_ceiling);
        let min_rating = parse_number("min_rating", &self.min_rating)?
            .map(|r| quantize_rating(r, search.rating_step))
            .unwrap_or(0.0);

        Ok(FilterSnapshot {
            query: self.q.clone().unwrap_or_default(),
            filters: SearchFilters {
                location: self.location.clone().unwrap_or_default(),
                price_range: PriceRange::new(min, max),
                facilities: self.facilities.clone(),
                min_rating,
            },
        })
    }

    /// Text fields only, for rendering a page when the numbers are unusable
    fn text_snapshot(&self, search: &SearchSettings) -> FilterSnapshot {
        FilterSnapshot {
            query: self.q.clone().unwrap_or_default(),
            filters: SearchFilters {
                location: self.location.clone().unwrap_or_default(),
                price_range: PriceRange::new(search.price_floor, search.price_ceiling),
                ..SearchFilters::default()
            },
        }
    }
}

fn parse_number(name: &str, value: &Option<String>) -> Result<Option<f64>, SearchError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<f64>().map(Some).map_err(|_| {
            SearchError::InvalidFilter(format!("{} is not a number: {}", name, v))
        }),
    }
}

/// `/search` URL reproducing a snapshot; default values are left out
pub fn search_url(snapshot: &FilterSnapshot, search: &SearchSettings) -> String {
    let filters = &snapshot.filters;
    let mut query = form_urlencoded::Serializer::new(String::new());

    if !snapshot.query.is_empty() {
        query.append_pair("q", &snapshot.query);
    }
    if !filters.location.is_empty() {
        query.append_pair("location", &filters.location);
    }
    if filters.price_range.min != search.price_floor {
        query.append_pair("price_min", &filters.price_range.min.to_string());
    }
    if filters.price_range.max != search.price_ceiling {
        query.append_pair("price_max", &filters.price_range.max.to_string());
    }
    if filters.min_rating > 0.0 {
        query.append_pair("min_rating", &filters.min_rating.to_string());
    }
    if !filters.facilities.is_empty() {
        query.append_pair("facilities", &filters.facilities.join(","));
    }

    let encoded = query.finish();
    if encoded.is_empty() {
        "/search".to_string()
    } else {
        format!("/search?{}", encoded)
    }
}

/// Search results response for JSON format
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub number_of_results: usize,
    pub results: Vec<GymListing>,
}

/// Removable filter badge
#[derive(Debug, Serialize)]
struct Chip {
    label: String,
    remove_url: String,
}

fn render(state: &AppState, template: &str, ctx: &Context, status: StatusCode) -> Response {
    match state.templates.render_with_context(template, ctx) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Home page handler
pub async fn index(State(state): State<AppState>) -> Response {
    let mut ctx = Context::new();
    ctx.insert("instance_name", state.instance_name());

    let status = match state.engine.featured(state.settings.search.featured_limit).await {
        Ok(gyms) => {
            ctx.insert("cards", &cards(&gyms));
            ctx.insert("error", &false);
            StatusCode::OK
        }
        Err(e) => {
            ctx.insert("cards", &Vec::<GymListing>::new());
            ctx.insert("error", &true);
            status_for(&e)
        }
    };

    render(&state, "index.html", &ctx, status)
}

/// Search handler
pub async fn search(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let params = SearchParams::parse(raw.as_deref());
    let search = &state.settings.search;

    let (snapshot, outcome) = match params.to_snapshot(search) {
        Ok(snapshot) => {
            let outcome = state
                .engine
                .search(&snapshot.filters, &snapshot.query)
                .await;
            (snapshot, outcome)
        }
        Err(e) => (params.text_snapshot(search), Err(e)),
    };

    if params.format.as_deref() == Some("json") {
        return match outcome {
            Ok(results) => Json(SearchResponse {
                query: snapshot.query,
                number_of_results: results.len(),
                results,
            })
            .into_response(),
            Err(e) => ApiError(e).into_response(),
        };
    }

    let chips: Vec<Chip> = snapshot
        .active_filters()
        .iter()
        .map(|filter| Chip {
            label: filter.label(),
            remove_url: search_url(&snapshot.without(filter), search),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("instance_name", state.instance_name());
    ctx.insert("query", &snapshot.query);
    ctx.insert("filters", &snapshot.filters);
    ctx.insert("chips", &chips);
    ctx.insert("facilities", &search.facilities);
    ctx.insert("price_floor", &search.price_floor);
    ctx.insert("price_ceiling", &search.price_ceiling);
    ctx.insert("rating_step", &search.rating_step);
    ctx.insert("retry_url", &search_url(&snapshot, search));

    let status = match &outcome {
        Ok(gyms) => {
            ctx.insert("cards", &cards(gyms));
            ctx.insert("result_count", &gyms.len());
            ctx.insert("error", &Option::<String>::None);
            StatusCode::OK
        }
        Err(e) => {
            ctx.insert("cards", &Vec::<GymListing>::new());
            ctx.insert("result_count", &0);
            ctx.insert("error", &e.to_string());
            status_for(e)
        }
    };

    render(&state, "search.html", &ctx, status)
}

#[derive(Debug, Deserialize)]
pub struct FeaturedParams {
    pub limit: Option<usize>,
}

/// Featured gyms as JSON
pub async fn featured(
    State(state): State<AppState>,
    Query(params): Query<FeaturedParams>,
) -> Result<Json<Vec<GymListing>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(state.settings.search.featured_limit);
    Ok(Json(state.engine.featured(limit).await?))
}

/// Facility vocabulary for filter controls
pub async fn facilities(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.settings.search.facilities.clone())
}

/// Search metrics
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "store": state.engine.store_name(),
        "metrics": state.metrics.snapshot(),
    }))
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
