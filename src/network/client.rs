//! HTTP client for talking to the hosted listing store

use crate::config::OutgoingSettings;
use crate::store::StoreError;
use anyhow::Result;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// A GET request against the store's REST endpoint
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    /// Query parameters; keys may repeat
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params.extend(params);
        self
    }
}

/// Response body and status
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub text: String,
    pub url: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_str(&self.text).map_err(|e| StoreError::Parse(e.to_string()))
    }
}

/// reqwest wrapper configured from outgoing settings
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(settings.request_timeout)?;
        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .user_agent(format!("gymspot/{}", crate::VERSION))
            .gzip(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            default_timeout: timeout,
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// Execute a request with the default timeout
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, StoreError> {
        self.execute_with_timeout(request, self.default_timeout).await
    }

    /// Execute a request with a custom timeout
    pub async fn execute_with_timeout(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, StoreError> {
        let mut req_builder = self
            .client
            .get(&request.url)
            .timeout(timeout)
            .header("Accept", "application/json");

        for (key, value) in self.extra_headers.iter().chain(request.headers.iter()) {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        let response = req_builder.send().await.map_err(StoreError::from)?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: Response) -> Result<HttpResponse, StoreError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let text = response.text().await.map_err(StoreError::from)?;

        Ok(HttpResponse { status, text, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());

        let settings = OutgoingSettings {
            request_timeout: -1.0,
            ..Default::default()
        };
        assert!(HttpClient::with_settings(&settings).is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::get("http://localhost/rest/v1/gyms")
            .header("apikey", "k")
            .params(vec![("a".into(), "1".into()), ("a".into(), "2".into())]);

        assert_eq!(request.headers.get("apikey").map(String::as_str), Some("k"));
        assert_eq!(request.params.len(), 2);
    }
}
