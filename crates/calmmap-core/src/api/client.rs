//! HTTP client for the listing API.
//!
//! Wraps `reqwest` with the conventions every call shares:
//! - bearer auth from the [`SessionContext`] when a credential is held, omitted otherwise
//! - JSON bodies (content type set only when a body is sent)
//! - lenient response parsing: an unparsable body reads as `{}`
//! - every failure (network or status) surfaces as a [`RequestError`]
//!
//! No timeout is configured; a request that never resolves keeps its caller pending.

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{Map, Value};

use super::errors::{RequestError, body_excerpt};
use super::upload::UploadFile;
use crate::config::Config;
use crate::session::SessionContext;

/// Standard User-Agent header for calmmap API requests.
pub const USER_AGENT: &str = concat!("calmmap/", env!("CARGO_PKG_VERSION"));

/// A received response with its body already read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parses the body as JSON, treating anything unparsable as an empty object.
    pub fn json(&self) -> Value {
        if self.body.trim().is_empty() {
            return Value::Object(Map::new());
        }
        serde_json::from_str(&self.body).unwrap_or_else(|err| {
            tracing::debug!(status = %self.status, error = %err, "response body is not JSON");
            Value::Object(Map::new())
        })
    }

    /// First characters of the raw body, for diagnostics.
    pub fn excerpt(&self) -> String {
        body_excerpt(&self.body)
    }
}

#[derive(Debug, Clone)]
pub struct RequestClient {
    http: reqwest::Client,
    base_url: String,
    tokens: SessionContext,
}

impl RequestClient {
    /// Creates a client for `base_url` (no trailing slash needed).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, tokens: SessionContext) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Creates a client using the resolved base URL from `config`.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &Config, tokens: SessionContext) -> Result<Self> {
        Self::new(config.api_base_url()?, tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session context this client reads credentials from.
    pub fn tokens(&self) -> &SessionContext {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and returns the response whatever its status.
    ///
    /// # Errors
    /// Returns a network [`RequestError`] if no response was received.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, RequestError> {
        tracing::debug!(%method, path, has_body = body.is_some(), "api request");

        let mut request = self.authorize(self.http.request(method.clone(), self.url(path)));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            tracing::warn!(%method, path, error = %err, "api request failed without response");
            RequestError::network(format!("Network error: could not reach {path}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            tracing::warn!(%method, path, error = %err, "failed to read response body");
            RequestError::network(format!("Network error: response from {path} was cut off"))
        })?;

        tracing::debug!(%method, path, %status, "api response");
        Ok(ApiResponse { status, body })
    }

    /// Sends a JSON request and returns the parsed body of a 2xx response.
    ///
    /// # Errors
    /// Returns a [`RequestError`] carrying the server's `error` text (or a generic
    /// message) on a non-2xx status, or a network error if no response arrived.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, RequestError> {
        let response = self.execute(method, path, body).await?;
        let json = response.json();
        if !response.is_success() {
            return Err(RequestError::from_json_body(response.status.as_u16(), &json));
        }
        Ok(json)
    }

    /// Uploads `file` as the multipart field `field_name` with a POST to `path`.
    ///
    /// # Errors
    /// Returns a [`RequestError`] whose message includes at most 200 characters
    /// of the raw response body.
    pub async fn upload(
        &self,
        path: &str,
        file: &UploadFile,
        field_name: &str,
    ) -> Result<(), RequestError> {
        tracing::debug!(path, file = %file.file_name, bytes = file.bytes.len(), "api upload");

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = file.mime.as_deref() {
            part = match part.mime_str(mime) {
                Ok(part) => part,
                Err(err) => {
                    tracing::debug!(mime, error = %err, "ignoring invalid mime type");
                    Part::bytes(file.bytes.clone()).file_name(file.file_name.clone())
                }
            };
        }
        let form = Form::new().part(field_name.to_string(), part);

        let request = self.authorize(self.http.post(self.url(path)));
        let response = request.multipart(form).send().await.map_err(|err| {
            tracing::warn!(path, error = %err, "upload failed without response");
            RequestError::network("Upload failed: network error")
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let detail = if text.trim().is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            body_excerpt(&text)
        };
        Err(RequestError::http_status(
            status.as_u16(),
            format!("Upload failed: {detail}"),
        ))
    }
}
