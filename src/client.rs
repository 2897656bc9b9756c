//! The API client and its request executor.
//!
//! Every call goes through [`Client::execute`]: it builds the URL and headers
//! from a [`Request`], hands one attempt at a time to the
//! [`RetryPolicy`], and turns each raw response into either a parsed body or
//! an [`Error`]. The resource methods (`list_droplets`, `create_domain`, ...)
//! are thin wrappers around [`Client::get`], [`Client::post`],
//! [`Client::put`] and [`Client::delete`].

use crate::{
    cancel::Cancellation,
    classify::{AttemptContext, RetryAll, RetryClassifier},
    rate_limit::RateLimitInfo,
    request::Request,
    retry::{Backoff, RetryDecision, RetryError, RetryPolicy},
    shape::ResponseShape,
    transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport},
    Error, Response, Result,
};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// The production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.digitalocean.com/v2";

/// Environment variable read by [`ClientBuilder::from_env`] for the token.
pub const TOKEN_ENV_VAR: &str = "DIGITALOCEAN_TOKEN";

/// Environment variable read by [`ClientBuilder::from_env`] for the base URL.
pub const API_URL_ENV_VAR: &str = "DIGITALOCEAN_API_URL";

const DEFAULT_USER_AGENT: &str = concat!("digiocean/", env!("CARGO_PKG_VERSION"));

/// A client for the DigitalOcean v2 API.
///
/// The client is cheap to clone and safe to share between tasks. Concurrent
/// calls are independent: each runs its own retry sequence.
///
/// # Examples
///
/// ```no_run
/// use digiocean::{Client, CreateDroplet};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), digiocean::Error> {
/// let client = Client::builder()
///     .token("my-token")
///     .max_attempts(5)
///     .base_delay(Duration::from_millis(500))
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let droplet = client
///     .create_droplet(&CreateDroplet::new("web-1", "nyc3", "s-1vcpu-1gb", "ubuntu-22-04-x64"))
///     .await?;
/// println!("created droplet {}", droplet.id);
///
/// for droplet in client.list_droplets().await? {
///     println!("{}: {}", droplet.name, droplet.status);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    cancellation: Cancellation,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    base_url: String,
    authorization: HeaderValue,
    user_agent: HeaderValue,
    retry_policy: RetryPolicy,
    classifier: Box<dyn RetryClassifier>,
    timeout: Option<Duration>,
    call_timeout: Option<Duration>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("token", &"<redacted>")
            .field("retry_policy", &self.inner.retry_policy)
            .field("timeout", &self.inner.timeout)
            .field("call_timeout", &self.inner.call_timeout)
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

impl Client {
    /// Creates a client with default settings for the given token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or not a valid header value.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().token(token).build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the retry policy applied to every call.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry_policy
    }

    /// Returns a handle whose calls stop when `cancellation` fires.
    ///
    /// The handle shares configuration and connections with `self`.
    pub fn with_cancellation(&self, cancellation: Cancellation) -> Client {
        Client {
            inner: Arc::clone(&self.inner),
            cancellation,
        }
    }

    /// Runs one logical call, retrying failed attempts per the retry policy.
    ///
    /// Each attempt sends the complete request again. On failure, the error
    /// of the last attempt is returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use digiocean::{Client, Request, ResponseShape};
    ///
    /// # async fn example() -> Result<(), digiocean::Error> {
    /// let client = Client::new("my-token")?;
    ///
    /// let request = Request::get("images/")
    ///     .with_query_param("type", "distribution")
    ///     .expect(ResponseShape::array("images"));
    ///
    /// let response = client.execute(request).await?;
    /// println!("{}", response.data["images"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute(&self, request: Request) -> Result<Response<Value>> {
        let url = request.url(&self.inner.base_url)?;
        let cancellation = self.call_cancellation();
        let policy = &self.inner.retry_policy;
        let started = Instant::now();

        let outcome = policy
            .run(
                &cancellation,
                |attempt| self.attempt(&request, &url, attempt, started),
                |error: &Error, attempt: usize| {
                    let ctx = AttemptContext {
                        attempt,
                        method: &request.method,
                        path: &request.path,
                    };
                    let decision = self.inner.classifier.classify(error, &ctx);
                    tracing::warn!(
                        error = %error,
                        attempt = attempt,
                        max_attempts = policy.max_attempts,
                        method = %request.method,
                        path = %request.path,
                        retryable = decision == RetryDecision::Retry,
                        "Request attempt failed"
                    );
                    decision
                },
                |attempt: usize| {
                    tracing::debug!(
                        method = %request.method,
                        url = %url,
                        attempt = attempt,
                        "Executing HTTP request"
                    );
                },
            )
            .await;

        match outcome {
            Ok(response) => Ok(response),
            Err(RetryError::Exhausted { attempts, error }) => {
                tracing::error!(
                    error = %error,
                    attempts = attempts,
                    method = %request.method,
                    path = %request.path,
                    "Request failed after all attempts"
                );
                Err(error)
            }
            Err(RetryError::Permanent { attempt, error }) => {
                tracing::error!(
                    error = %error,
                    attempt = attempt,
                    method = %request.method,
                    path = %request.path,
                    "Request failed permanently"
                );
                Err(error)
            }
            Err(RetryError::Cancelled { attempts, .. }) => {
                tracing::warn!(attempts = attempts, path = %request.path, "Request cancelled");
                Err(Error::Cancelled { attempts })
            }
            Err(RetryError::DeadlineExceeded { attempts, .. }) => {
                tracing::warn!(
                    attempts = attempts,
                    path = %request.path,
                    "Request deadline exceeded"
                );
                Err(Error::DeadlineExceeded { attempts })
            }
        }
    }

    /// Makes a `GET` request. GET requests carry query parameters only.
    pub async fn get<K, V>(
        &self,
        path: impl Into<String>,
        query: impl IntoIterator<Item = (K, V)>,
        expect: ResponseShape,
    ) -> Result<Response<Value>>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let request = Request::get(path).with_query_params(query).expect(expect);
        self.execute(request).await
    }

    /// Makes a `POST` request with a JSON body.
    pub async fn post<B>(
        &self,
        path: impl Into<String>,
        body: &B,
        expect: ResponseShape,
    ) -> Result<Response<Value>>
    where
        B: Serialize + ?Sized,
    {
        let request = Request::post(path).with_json(body)?.expect(expect);
        self.execute(request).await
    }

    /// Makes a `PUT` request with a JSON body.
    pub async fn put<B>(
        &self,
        path: impl Into<String>,
        body: &B,
        expect: ResponseShape,
    ) -> Result<Response<Value>>
    where
        B: Serialize + ?Sized,
    {
        let request = Request::put(path).with_json(body)?.expect(expect);
        self.execute(request).await
    }

    /// Makes a `DELETE` request. DELETE requests carry query parameters only.
    pub async fn delete<K, V>(
        &self,
        path: impl Into<String>,
        query: impl IntoIterator<Item = (K, V)>,
        expect: ResponseShape,
    ) -> Result<Response<Value>>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let request = Request::delete(path).with_query_params(query).expect(expect);
        self.execute(request).await
    }

    /// Returns the cancellation for a call starting now.
    fn call_cancellation(&self) -> Cancellation {
        let Some(call_timeout) = self.inner.call_timeout else {
            return self.cancellation.clone();
        };

        let Some(deadline) = Instant::now().checked_add(call_timeout) else {
            return self.cancellation.clone();
        };
        match self.cancellation.deadline() {
            Some(existing) if existing <= deadline => self.cancellation.clone(),
            _ => self.cancellation.clone().with_deadline(deadline),
        }
    }

    /// Executes a single attempt.
    async fn attempt(
        &self,
        request: &Request,
        url: &Url,
        attempt: usize,
        started: Instant,
    ) -> Result<Response<Value>> {
        let http_request = self.build_http_request(request, url)?;
        let raw = self.inner.transport.send(http_request).await?;
        let latency = started.elapsed();

        tracing::info!(
            status = raw.status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            attempt = attempt,
            "Received HTTP response"
        );

        let rate_limit = RateLimitInfo::from_headers(&raw.headers);
        let data = interpret_response(&raw, &request.expect, &rate_limit)?;

        Ok(Response {
            data,
            raw_body: raw.body,
            status: raw.status,
            headers: raw.headers,
            rate_limit,
            latency,
            attempts: attempt,
        })
    }

    fn build_http_request(&self, request: &Request, url: &Url) -> Result<HttpRequest> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.inner.authorization.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, self.inner.user_agent.clone());

        let body = match &request.body {
            Some(value) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                let bytes =
                    serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
                Some(bytes)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: request.method.clone(),
            url: url.clone(),
            headers,
            body,
            timeout: self.inner.timeout,
        })
    }
}

/// Classifies a raw response as a parsed body or an attempt failure.
fn interpret_response(
    raw: &HttpResponse,
    expect: &ResponseShape,
    rate_limit: &RateLimitInfo,
) -> Result<Value> {
    let status = raw.status;
    let text = raw.body.trim();

    if !status.is_success() {
        let body: Option<Value> = serde_json::from_str(text).ok();
        let field = |name: &str| {
            body.as_ref()
                .and_then(|b| b.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let message = field("description")
            .or_else(|| field("message"))
            .unwrap_or_else(|| generic_failure(status));

        if status.is_client_error() {
            tracing::error!(status = status.as_u16(), response = %raw.body, "Client error (4xx)");
        } else {
            tracing::warn!(status = status.as_u16(), response = %raw.body, "Server error");
        }

        return Err(Error::Api {
            status,
            message,
            error_id: field("id"),
            raw_response: raw.body.clone(),
            rate_limit: rate_limit.clone(),
        });
    }

    let data = if text.is_empty() {
        Value::Object(Default::default())
    } else {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Null) => Value::Object(Default::default()),
            Ok(value) => value,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %raw.body,
                    "Failed to parse response body"
                );
                return Err(Error::Decode {
                    status,
                    raw_response: raw.body.clone(),
                    serde_error: e.to_string(),
                });
            }
        }
    };

    if !expect.matches(&data) {
        return Err(Error::IncompleteResponse {
            status,
            expected: expect.clone(),
            raw_response: raw.body.clone(),
        });
    }

    Ok(data)
}

fn generic_failure(status: StatusCode) -> String {
    format!("request failed with status {}", status.as_u16())
}

/// Builder for configuring and creating a [`Client`].
///
/// Defaults: the production base URL, 25 attempts with linear backoff in
/// 1 second units, every failure retried, no timeouts.
///
/// # Examples
///
/// ```no_run
/// use digiocean::{classify::RetryTransient, ClientBuilder, RetryPolicy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), digiocean::Error> {
/// let client = ClientBuilder::new()
///     .token("my-token")
///     .retry_policy(RetryPolicy::linear(10, Duration::from_millis(250)))
///     .retry_classifier(RetryTransient)
///     .timeout(Duration::from_secs(20))
///     .call_timeout(Duration::from_secs(120))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    token: Option<String>,
    base_url: String,
    user_agent: String,
    retry_policy: RetryPolicy,
    classifier: Option<Box<dyn RetryClassifier>>,
    timeout: Option<Duration>,
    call_timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_policy: RetryPolicy::default(),
            classifier: None,
            timeout: None,
            call_timeout: None,
            transport: None,
        }
    }

    /// Creates a builder from the environment.
    ///
    /// Reads the token from `DIGITALOCEAN_TOKEN` and, if set, the base URL
    /// from `DIGITALOCEAN_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token variable is missing or empty.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV_VAR).map_err(|_| {
            Error::Configuration(format!("missing {} environment variable", TOKEN_ENV_VAR))
        })?;
        if token.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "{} is set but empty",
                TOKEN_ENV_VAR
            )));
        }

        let mut builder = Self::new().token(token);
        if let Ok(base_url) = std::env::var(API_URL_ENV_VAR) {
            if !base_url.trim().is_empty() {
                builder = builder.base_url(base_url);
            }
        }
        Ok(builder)
    }

    /// Sets the bearer token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Overrides the base URL, e.g. to point at a mock server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the retry policy for failed attempts.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the total number of attempts per call, the first one included.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.retry_policy.max_attempts = max_attempts;
        self
    }

    /// Switches to linear backoff with the given unit.
    pub fn base_delay(mut self, unit: Duration) -> Self {
        self.retry_policy.backoff = Backoff::Linear { unit };
        self
    }

    /// Sets the classifier deciding which failures are retried.
    ///
    /// By default every failure is retried.
    pub fn retry_classifier(mut self, classifier: impl RetryClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Sets the timeout of each individual attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bounds each whole call, retries and backoff included.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Replaces the HTTP transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token was provided, if the token or user agent
    /// is not a valid header value, or if the base URL does not parse.
    pub fn build(self) -> Result<Client> {
        let token = self
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Configuration("API token is required".to_string()))?;

        let mut authorization = HeaderValue::try_from(format!("Bearer {}", token))
            .map_err(|e| Error::Configuration(format!("Invalid token: {}", e)))?;
        authorization.set_sensitive(true);

        let user_agent = HeaderValue::try_from(self.user_agent)
            .map_err(|e| Error::Configuration(format!("Invalid user agent: {}", e)))?;

        Url::parse(&self.base_url)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let http_client = reqwest::Client::builder().build().map_err(|e| {
                    Error::Configuration(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(ReqwestTransport::new(http_client))
            }
        };

        let classifier = self.classifier.unwrap_or_else(|| Box::new(RetryAll));

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                base_url: self.base_url,
                authorization,
                user_agent,
                retry_policy: self.retry_policy,
                classifier,
                timeout: self.timeout,
                call_timeout: self.call_timeout,
            }),
            cancellation: Cancellation::new(),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
