//! HTTP client implementation

use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::ConsoleError;
use crate::settings::BackendSettings;

/// Per-request options
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,

    /// Merged over the default `Content-Type: application/json`
    pub headers: HeaderMap,

    /// Pre-serialized JSON body
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// HTTP client for backend communication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(settings: &BackendSettings) -> Result<Self, ConsoleError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(&settings.base_url, client))
    }

    /// Create a client around an existing reqwest client
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a single request to `path` under the base URL.
    ///
    /// A 204 response resolves to `None` without reading the body. Any other
    /// success status is decoded as JSON.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ConsoleError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", options.method, url);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let mut request = self
            .client
            .request(options.method.clone(), &url)
            .headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("HTTP {} {} failed: {} - {}", options.method, url, status, body);
            return Err(ConsoleError::RequestError {
                status: status.as_u16(),
                message: failure_message(status, body),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;
        Ok(Some(body))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ConsoleError> {
        self.request(path, RequestOptions::default()).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ConsoleError> {
        let options = RequestOptions {
            method: Method::POST,
            body: Some(serde_json::to_string(body)?),
            ..Default::default()
        };
        self.request(path, options).await
    }
}

/// Body text when present, else the canonical reason phrase
fn failure_message(status: StatusCode, body: String) -> String {
    if !body.is_empty() {
        return body;
    }
    status.canonical_reason().unwrap_or_default().to_string()
}
