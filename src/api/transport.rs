//! HTTP transport for the portal API.
//!
//! A single request/response exchange with a fixed per-call timeout,
//! agnostic of authentication. The trait seam exists so the refresh
//! coordinator can be exercised against a scripted transport in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Budget for a generic portal request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Budget for the token refresh call. Deliberately shorter than the generic
/// budget so a congested request pool cannot starve the refresh.
pub const REFRESH_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// One outbound request, before the bearer token is attached.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the portal base URL, query string included.
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Bearer credential, attached by the client just before sending.
    pub bearer: Option<String>,
}

impl RequestDescriptor {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::GET,
            path: path.to_string(),
            body: None,
            bearer: None,
        }
    }

    pub fn post(path: &str, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.to_string(),
            body: Some(body),
            bearer: None,
        }
    }

    /// Whether this request targets the refresh endpoint itself. A 401 here
    /// means the refresh token is invalid and nothing is left to retry.
    pub fn is_refresh_call(&self) -> bool {
        self.path == REFRESH_PATH
    }
}

/// Status and body of a completed exchange.
#[derive(Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TransportResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange. The bearer field is sent verbatim if present;
    /// a missing token is not an error at this layer.
    async fn send(
        &self,
        req: &RequestDescriptor,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport against the configured portal base URL.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        req: &RequestDescriptor,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, req.path);

        let mut builder = self.http.request(req.method.clone(), &url).timeout(timeout);
        if let Some(ref token) = req.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = req.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(map_reqwest_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(map_reqwest_error)?;

        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}
