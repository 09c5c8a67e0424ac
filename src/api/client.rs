//! HTTP client for the handbook backend.
//!
//! One `ApiClient` is shared by every call site. It owns the
//! [`AuthContext`]: the current bearer token is attached to each request
//! at send time, and a 401 response fires the registered unauthorized
//! handler before the error reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::Config;

use super::{ApiError, AuthContext};

/// API client for the handbook backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Arc<AuthContext>,
}

impl ApiClient {
    /// Build the shared client from configuration.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: Arc::new(AuthContext::default()),
        })
    }

    /// Shared request context: current token plus unauthorized handler.
    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    /// GET `path` and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, None::<&()>).await?;
        Ok(response.json().await?)
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// PUT `body` as JSON to `path` and decode the JSON response.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// DELETE `path` and decode the JSON response.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::DELETE, path, None::<&()>).await?;
        Ok(response.json().await?)
    }

    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut request = self.client.request(method.clone(), url.as_str());

        // The token is read at send time; requests already in flight are
        // unaffected by later set_token calls.
        if let Some(token) = self.auth.token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.check_response(response, &method, &url).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Map non-success statuses to [`ApiError`].
    ///
    /// A 401 additionally fires the unauthorized handler; the handler does
    /// not retry or suppress anything, the original error still reaches
    /// the caller.
    async fn check_response(
        &self,
        response: Response,
        method: &Method,
        url: &str,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        debug!(%method, url, %status, "Request failed");

        if matches!(error, ApiError::Unauthorized) {
            self.auth.notify_unauthorized().await;
        }

        Err(error)
    }
}
