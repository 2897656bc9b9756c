//! Error types for API calls.
//!
//! Every call made through [`Client`](crate::Client) resolves to exactly one
//! [`Error`] on failure. The variants separate the three ways a single attempt
//! can fail (transport, API status, incomplete body) from the ways a whole
//! call can be stopped (cancellation, deadline) and from mistakes made before
//! any request is sent (configuration, serialization).

use crate::rate_limit::RateLimitInfo;
use crate::shape::ResponseShape;
use http::StatusCode;

/// The main error type for API calls.
///
/// When a call is retried, only the error of the last attempt is reported.
///
/// # Examples
///
/// ```no_run
/// use digiocean::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new("my-token")?;
///
/// match client.get_droplet(42).await {
///     Ok(droplet) => println!("{} is {}", droplet.name, droplet.status),
///     Err(Error::Api { status, message, .. }) => {
///         eprintln!("API refused the request ({}): {}", status, message);
///     }
///     Err(Error::IncompleteResponse { expected, .. }) => {
///         eprintln!("server answered without {}", expected);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No response was received (DNS, connect, TLS, transport timeout, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The API answered with a status outside 200-299.
    ///
    /// `message` is taken from the body's `description` field, then its
    /// `message` field, and falls back to a generic text.
    #[error("API error {status}: {message}")]
    Api {
        /// The HTTP status code
        status: StatusCode,
        /// Human readable reason reported by the API
        message: String,
        /// The API's machine readable error id (`"not_found"`, `"unprocessable_entity"`, ...)
        error_id: Option<String>,
        /// The raw response body
        raw_response: String,
        /// Rate limit headers sent with the response
        rate_limit: RateLimitInfo,
    },

    /// The API answered 2xx but the body lacks the field the operation needs.
    ///
    /// The request may have taken effect server-side. Retrying a
    /// non-idempotent operation after this error can repeat it.
    #[error("request failed: response is missing {expected}")]
    IncompleteResponse {
        /// The HTTP status code
        status: StatusCode,
        /// The shape the body was expected to have
        expected: ResponseShape,
        /// The raw response body
        raw_response: String,
    },

    /// The body could not be decoded, either as JSON or into the expected model.
    #[error("Failed to decode response (status {status}): {serde_error}")]
    Decode {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The serde error message
        serde_error: String,
    },

    /// The call's cancellation token fired.
    #[error("Call cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Attempts started before cancellation
        attempts: usize,
    },

    /// The call's deadline passed before it could complete.
    #[error("Call deadline exceeded after {attempts} attempt(s)")]
    DeadlineExceeded {
        /// Attempts started before the deadline
        attempts: usize,
    },

    /// Invalid client configuration (missing token, bad header value, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request body could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    /// An invalid URL was provided or built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this error is likely to go away on its own.
    ///
    /// Transport failures, incomplete or undecodable 2xx bodies, 5xx, 408 and
    /// 429 are transient. Other 4xx responses, cancellations and local
    /// mistakes are not.
    ///
    /// # Examples
    ///
    /// ```
    /// use digiocean::{Error, RateLimitInfo};
    /// use http::StatusCode;
    ///
    /// let unavailable = Error::Api {
    ///     status: StatusCode::SERVICE_UNAVAILABLE,
    ///     message: "try again".to_string(),
    ///     error_id: None,
    ///     raw_response: String::new(),
    ///     rate_limit: RateLimitInfo::default(),
    /// };
    /// assert!(unavailable.is_transient());
    ///
    /// let unauthorized = Error::Api {
    ///     status: StatusCode::UNAUTHORIZED,
    ///     message: "Unable to authenticate you.".to_string(),
    ///     error_id: Some("unauthorized".to_string()),
    ///     raw_response: String::new(),
    ///     rate_limit: RateLimitInfo::default(),
    /// };
    /// assert!(!unauthorized.is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Api { status, .. } => {
                status.is_server_error()
                    || *status == StatusCode::TOO_MANY_REQUESTS
                    || *status == StatusCode::REQUEST_TIMEOUT
            }
            Error::IncompleteResponse { .. } => true,
            Error::Decode { .. } => true,
            Error::Cancelled { .. } => false,
            Error::DeadlineExceeded { .. } => false,
            Error::Configuration(_) => false,
            Error::Serialization(_) => false,
            Error::InvalidUrl(_) => false,
        }
    }

    /// Returns the HTTP status code if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::IncompleteResponse { status, .. } => Some(*status),
            Error::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if a response was received.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Api { raw_response, .. } => Some(raw_response),
            Error::IncompleteResponse { raw_response, .. } => Some(raw_response),
            Error::Decode { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the rate limit headers of an [`Error::Api`] response.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        match self {
            Error::Api { rate_limit, .. } => Some(rate_limit),
            _ => None,
        }
    }
}

/// A failure below HTTP: no response was received for an attempt.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    timed_out: bool,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Creates a transport error with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
            source: None,
        }
    }

    /// Creates a transport error for an attempt that hit its timeout.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            timed_out: true,
            ..Self::new(message)
        }
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns `true` if the attempt timed out.
    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let message = error.to_string();
        let timed_out = error.is_timeout();
        Self {
            message,
            timed_out,
            source: Some(Box::new(error)),
        }
    }
}

/// A specialized `Result` type for API calls.
pub type Result<T> = std::result::Result<T, Error>;
