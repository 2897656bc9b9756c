//! Successful responses and their metadata.
//!
//! The [`Response`] type wraps the parsed body along with what is known about
//! the call that produced it: status, headers, rate limit state, total
//! latency and the number of attempts it took.

use crate::rate_limit::RateLimitInfo;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful API response.
///
/// The resource methods on [`Client`](crate::Client) unwrap `data` for you;
/// the generic [`Client::get`](crate::Client::get) family returns the whole
/// `Response<serde_json::Value>`.
///
/// # Examples
///
/// ```no_run
/// use digiocean::{Client, ResponseShape};
///
/// # async fn example() -> Result<(), digiocean::Error> {
/// let client = Client::new("my-token")?;
///
/// let response = client
///     .get("droplets/", [("tag_name", "web")], ResponseShape::array("droplets"))
///     .await?;
///
/// println!("{} droplet(s)", response.data["droplets"].as_array().map_or(0, |d| d.len()));
/// println!("took {:?} over {} attempt(s)", response.latency, response.attempts);
/// println!("{:?} requests left", response.rate_limit.remaining);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The parsed response data. An empty body parses as `{}`.
    pub data: T,

    /// The raw response body.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Rate limit state reported with this response.
    pub rate_limit: RateLimitInfo,

    /// Time from the start of the first attempt until this response arrived.
    pub latency: Duration,

    /// The number of attempts made to complete this call.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Maps the response data to a different type using the provided function.
    ///
    /// # Examples
    ///
    /// ```
    /// # use digiocean::{RateLimitInfo, Response};
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response {
    ///     data: 42,
    ///     raw_body: "42".to_string(),
    ///     status: StatusCode::OK,
    ///     headers: HeaderMap::new(),
    ///     rate_limit: RateLimitInfo::default(),
    ///     latency: Duration::from_millis(100),
    ///     attempts: 1,
    /// };
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            rate_limit: self.rate_limit,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Returns `true` if the call needed more than one attempt.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Consumes the response and returns its data.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
