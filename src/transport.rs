//! The HTTP exchange underneath every attempt.
//!
//! [`Transport`] sends one fully built request and returns the raw response.
//! It does not interpret status codes; that is the executor's job.
//! [`ReqwestTransport`] is the default implementation.

use crate::error::TransportError;
use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use std::time::Duration;
use url::Url;

/// One HTTP request, ready to send.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL, query included.
    pub url: Url,
    /// Request headers, authorization included.
    pub headers: HeaderMap,
    /// The encoded JSON body, if any.
    pub body: Option<Vec<u8>>,
    /// Maximum time to wait for this exchange.
    pub timeout: Option<Duration>,
}

/// The raw response to an [`HttpRequest`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body as text.
    pub body: String,
}

/// Sends HTTP requests.
///
/// Implement this to route calls through something other than `reqwest`,
/// or to script responses in tests.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use digiocean::transport::{HttpRequest, HttpResponse, Transport};
/// use digiocean::TransportError;
/// use http::{HeaderMap, StatusCode};
///
/// struct AlwaysEmpty;
///
/// #[async_trait]
/// impl Transport for AlwaysEmpty {
///     async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
///         Ok(HttpResponse {
///             status: StatusCode::OK,
///             headers: HeaderMap::new(),
///             body: "{}".to_string(),
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and waits for the complete response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing `reqwest::Client`.
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
