//! Typed resource methods on [`Client`](crate::Client).
//!
//! Each method is one verb, one path and one expected response shape. The
//! executor does the rest; these functions only pick the wrapped field out of
//! the response and deserialize it.

mod account;
mod actions;
mod domains;
mod droplets;
mod images;
mod ssh_keys;

use crate::{Error, Response, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use url::Url;

/// Query for calls without parameters.
pub(crate) const NO_QUERY: [(&str, &str); 0] = [];

/// Percent-encodes `value` as a single path segment.
///
/// `/`, `?`, `#` and `%` are escaped so a slug or name can never change the
/// shape of the request URL. Empty and dot segments are rejected.
pub(crate) fn segment(value: impl Display) -> Result<String> {
    let value = value.to_string();
    // URL parsing collapses dot segments, even percent-encoded ones.
    if value.is_empty() || value == "." || value == ".." {
        return Err(Error::Configuration(format!(
            "invalid path segment `{}`",
            value
        )));
    }

    let mut url = Url::parse("http://localhost/")?;
    url.path_segments_mut()
        .map_err(|()| Error::Configuration("cannot encode path segment".to_string()))?
        .clear()
        .push(&value);
    Ok(url.path().trim_start_matches('/').to_string())
}

/// Deserializes `response.data[key]`.
///
/// The executor has already checked that the key is present, so a failure
/// here means the value had the wrong structure.
pub(crate) fn unwrap_field<T: DeserializeOwned>(response: Response<Value>, key: &str) -> Result<T> {
    let Response {
        mut data,
        raw_body,
        status,
        ..
    } = response;

    let value = data.get_mut(key).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| Error::Decode {
        status,
        raw_response: raw_body,
        serde_error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Droplet;
    use crate::RateLimitInfo;
    use http::{HeaderMap, StatusCode};
    use serde_json::json;
    use std::time::Duration;

    fn response(data: Value) -> Response<Value> {
        Response {
            raw_body: data.to_string(),
            data,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            rate_limit: RateLimitInfo::default(),
            latency: Duration::ZERO,
            attempts: 1,
        }
    }

    #[test]
    fn test_segment_escapes_url_delimiters() {
        assert_eq!(segment("example.com").unwrap(), "example.com");
        assert_eq!(segment("3b:16:bf:e4").unwrap(), "3b:16:bf:e4");
        assert_eq!(segment(42).unwrap(), "42");
        assert_eq!(segment("a/b?c#d").unwrap(), "a%2Fb%3Fc%23d");
        assert_eq!(segment("50%").unwrap(), "50%25");
        assert!(matches!(segment(".."), Err(Error::Configuration(_))));
        assert!(matches!(segment(""), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_unwrap_field() {
        let droplet: Droplet =
            unwrap_field(response(json!({ "droplet": { "id": 1 } })), "droplet").unwrap();
        assert_eq!(droplet.id, 1);
    }

    #[test]
    fn test_unwrap_field_wrong_structure_is_decode_error() {
        let result: Result<Vec<Droplet>> =
            unwrap_field(response(json!({ "droplets": "nope" })), "droplets");

        match result {
            Err(Error::Decode { status, raw_response, .. }) => {
                assert_eq!(status, StatusCode::OK);
                assert!(raw_response.contains("nope"));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }
}
