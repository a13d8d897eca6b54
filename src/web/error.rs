//! JSON error responses

use crate::search::SearchError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Search failure as returned by the JSON endpoints
#[derive(Debug)]
pub struct ApiError(pub SearchError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.0)
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }));
        (self.status(), body).into_response()
    }
}

/// Bad filters are the caller's fault, store failures are upstream
pub(super) fn status_for(err: &SearchError) -> StatusCode {
    match err {
        SearchError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
        SearchError::SearchFailed(_) => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_mapping() {
        let invalid = ApiError(SearchError::InvalidFilter("min > max".to_string()));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let failed = ApiError(SearchError::SearchFailed(StoreError::Timeout));
        assert_eq!(failed.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
