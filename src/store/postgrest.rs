//! PostgREST (Supabase) listing store

use super::traits::*;
use crate::config::StoreSettings;
use crate::models::GymListing;
use crate::network::{HttpClient, HttpRequest, HttpResponse};
use crate::query::ListingQuery;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Reads listings through a PostgREST endpoint such as `https://<project>.supabase.co/rest/v1`
pub struct PostgrestStore {
    client: HttpClient,
    table_url: Url,
    api_key: Option<String>,
}

impl PostgrestStore {
    pub fn new(client: HttpClient, base_url: &str, table: &str) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let table_url = base.join(table)?;

        Ok(Self {
            client,
            table_url,
            api_key: None,
        })
    }

    pub fn from_settings(client: HttpClient, settings: &StoreSettings) -> anyhow::Result<Self> {
        let store = Self::new(client, &settings.url, &settings.table)?;
        Ok(match settings.api_key {
            Some(ref key) => store.with_api_key(key.clone()),
            None => store,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn table_url(&self) -> &str {
        self.table_url.as_str()
    }

    fn build_request(&self, query: &ListingQuery) -> HttpRequest {
        let mut request = HttpRequest::get(self.table_url.as_str()).params(query.to_params());

        if let Some(ref key) = self.api_key {
            request = request
                .header("apikey", key.clone())
                .header("Authorization", format!("Bearer {}", key));
        }

        request
    }

    fn check_status(response: &HttpResponse) -> Result<(), StoreError> {
        match response.status {
            _ if response.is_success() => Ok(()),
            s @ (401 | 403) => Err(StoreError::Unauthorized(s)),
            status => {
                // PostgREST error bodies carry a `message` field
                let message = serde_json::from_str::<serde_json::Value>(&response.text)
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                    .unwrap_or_else(|| response.text.chars().take(200).collect());
                Err(StoreError::Http { status, message })
            }
        }
    }
}

#[async_trait]
impl ListingStore for PostgrestStore {
    fn name(&self) -> &str {
        "postgrest"
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            array_overlap: true,
        }
    }

    async fn fetch(&self, query: &ListingQuery) -> Result<Vec<GymListing>, StoreError> {
        let request = self.build_request(query);
        debug!("GET {} with {} params", request.url, request.params.len());

        let response = self.client.execute(request).await?;
        Self::check_status(&response)?;

        let rows: Vec<GymListing> = response.json()?;
        debug!("{} returned {} rows", response.url, rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Column, Order, Value};
    use crate::store::MemoryStore;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> PostgrestStore {
        PostgrestStore::new(
            HttpClient::new().unwrap(),
            &format!("{}/rest/v1", server.uri()),
            "gyms",
        )
        .unwrap()
    }

    #[test]
    fn test_table_url() {
        let client = HttpClient::new().unwrap();
        let a = PostgrestStore::new(client.clone(), "https://x.supabase.co/rest/v1", "gyms").unwrap();
        let b = PostgrestStore::new(client, "https://x.supabase.co/rest/v1/", "gyms").unwrap();
        assert_eq!(a.table_url(), "https://x.supabase.co/rest/v1/gyms");
        assert_eq!(b.table_url(), "https://x.supabase.co/rest/v1/gyms");
    }

    #[tokio::test]
    async fn test_fetch_sends_postgrest_query() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            {
                "id": "g1",
                "name": "Iron Paradise",
                "address": "12 MG Road",
                "city": "Pune",
                "state": "Maharashtra",
                "price_per_session": 400,
                "rating": 4.8,
                "total_reviews": 120,
                "facilities": ["Sauna"],
                "images": [],
                "is_approved": true,
                "is_active": true
            }
        ]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/gyms"))
            .and(query_param("select", "*"))
            .and(query_param("is_approved", "eq.true"))
            .and(query_param("name", "ilike.%Iron%"))
            .and(query_param("or", "(city.ilike.%pune%,state.ilike.%pune%)"))
            .and(query_param("order", "rating.desc.nullslast"))
            .and(header("apikey", "anon-key"))
            .and(header("Authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let query = ListingQuery::new()
            .eq(Column::IsApproved, Value::Bool(true))
            .ilike(Column::Name, "Iron")
            .any_ilike(&[Column::City, Column::State], "pune")
            .order_by(Order::desc(Column::Rating));

        let rows = store(&server)
            .with_api_key("anon-key")
            .fetch(&query)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Iron Paradise");
        assert_eq!(rows[0].facilities, vec!["Sauna".to_string()]);
    }

    #[tokio::test]
    async fn test_star_in_text_is_matched_literally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/gyms"))
            .and(query_param("name", r"imatch.24\*7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "a", "name": "24*7 Fitness", "is_approved": true, "is_active": true }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let query = ListingQuery::new().ilike(Column::Name, "24*7");
        let rows = store(&server).fetch(&query).await.unwrap();

        // the in-memory store agrees on the same query
        let memory = MemoryStore::with_rows(vec![
            GymListing::new("a", "24*7 Fitness"),
            GymListing::new("b", "24x7 Gym"),
        ]);
        assert_eq!(rows, memory.fetch(&query).await.unwrap());
    }

    #[tokio::test]
    async fn test_http_errors_are_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("name", "ilike.%locked%"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("name", "ilike.%broken%"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": "PGRST100",
                "message": "failed to parse filter"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("name", "ilike.%garbled%"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let store = store(&server);

        let err = store
            .fetch(&ListingQuery::new().ilike(Column::Name, "locked"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Unauthorized(401));

        let err = store
            .fetch(&ListingQuery::new().ilike(Column::Name, "broken"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Http {
                status: 400,
                message: "failed to parse filter".to_string()
            }
        );

        let err = store
            .fetch(&ListingQuery::new().ilike(Column::Name, "garbled"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_store() {
        let store = PostgrestStore::new(HttpClient::new().unwrap(), "http://127.0.0.1:9/rest/v1", "gyms")
            .unwrap();
        let err = store.fetch(&ListingQuery::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Network(_) | StoreError::Timeout));
    }
}
