//! Rate limit headers.
//!
//! The API reports its request budget on every response through
//! `ratelimit-limit`, `ratelimit-remaining` and `ratelimit-reset`, and may add
//! `retry-after` when the budget is spent. The values are exposed on
//! [`Response`](crate::Response) and [`Error::Api`](crate::Error::Api); the
//! client itself never throttles on them.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit state reported by one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests allowed per window (`ratelimit-limit`).
    pub limit: Option<u64>,

    /// Requests left in the current window (`ratelimit-remaining`).
    pub remaining: Option<u64>,

    /// When the window resets (`ratelimit-reset`, a Unix timestamp).
    pub reset_at: Option<SystemTime>,

    /// How long the server asked us to wait (`retry-after`).
    pub retry_after: Option<Duration>,
}

impl RateLimitInfo {
    /// Extracts rate limit information from response headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use digiocean::RateLimitInfo;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("ratelimit-limit", "5000".parse().unwrap());
    /// headers.insert("ratelimit-remaining", "4816".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers);
    /// assert_eq!(info.limit, Some(5000));
    /// assert_eq!(info.remaining, Some(4816));
    /// assert!(!info.is_exhausted());
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: parse_u64(headers, "ratelimit-limit"),
            remaining: parse_u64(headers, "ratelimit-remaining"),
            reset_at: parse_u64(headers, "ratelimit-reset")
                .and_then(|timestamp| UNIX_EPOCH.checked_add(Duration::from_secs(timestamp))),
            retry_after: parse_retry_after(headers),
        }
    }

    /// Returns `true` if the budget is spent or the server asked for a pause.
    pub fn is_exhausted(&self) -> bool {
        self.retry_after.is_some() || self.remaining == Some(0)
    }

    /// Returns how long until the server accepts requests again, if known.
    ///
    /// Prefers `retry-after`, then the time left until `reset_at`.
    pub fn wait_hint(&self) -> Option<Duration> {
        if let Some(retry_after) = self.retry_after {
            return Some(retry_after);
        }
        self.reset_at?.duration_since(SystemTime::now()).ok()
    }
}

fn parse_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Parses `retry-after`, given either as seconds or as an HTTP date.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?;

    if let Ok(seconds) = header.trim().parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    date_time.duration_since(SystemTime::now()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("60"));

        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let later = SystemTime::now() + Duration::from_secs(120);
        let mut headers = HeaderMap::new();
        headers.insert(
            "retry-after",
            HeaderValue::from_str(&httpdate::fmt_http_date(later)).unwrap(),
        );

        let delay = parse_retry_after(&headers).unwrap();
        assert!(delay > Duration::from_secs(100) && delay <= Duration::from_secs(120));
    }

    #[test]
    fn test_exhausted_budget() {
        let reset = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 30;

        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-limit", HeaderValue::from_static("5000"));
        headers.insert("ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert(
            "ratelimit-reset",
            HeaderValue::from_str(&reset.to_string()).unwrap(),
        );

        let info = RateLimitInfo::from_headers(&headers);
        assert!(info.is_exhausted());
        assert_eq!(info.limit, Some(5000));

        let wait = info.wait_hint().unwrap();
        assert!(wait <= Duration::from_secs(30) && wait >= Duration::from_secs(28));
    }

    #[test]
    fn test_missing_headers() {
        let info = RateLimitInfo::from_headers(&HeaderMap::new());
        assert_eq!(info, RateLimitInfo::default());
        assert!(!info.is_exhausted());
        assert_eq!(info.wait_hint(), None);
    }

    #[test]
    fn test_garbage_values_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-remaining", HeaderValue::from_static("lots"));
        headers.insert("retry-after", HeaderValue::from_static("soon"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.remaining, None);
        assert_eq!(info.retry_after, None);
    }

    #[test]
    fn test_reset_beyond_system_time_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-limit", HeaderValue::from_static("5000"));
        headers.insert(
            "ratelimit-reset",
            HeaderValue::from_static("18446744073709551615"),
        );

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.limit, Some(5000));
        assert_eq!(info.reset_at, None);
        assert_eq!(info.wait_hint(), None);
    }
}
