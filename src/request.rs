//! The description of one logical call.

use crate::shape::ResponseShape;
use crate::{Error, Result};
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use url::{form_urlencoded, Url};

/// Everything needed to issue one logical call.
///
/// A `Request` is built once and never modified while the call is retried;
/// every attempt encodes the same method, URL, headers and body.
///
/// # Examples
///
/// ```
/// use digiocean::{Request, ResponseShape};
///
/// let request = Request::get("images/")
///     .with_query_param("type", "distribution")
///     .expect(ResponseShape::array("images"));
///
/// let url = request.url("https://api.digitalocean.com/v2").unwrap();
/// assert_eq!(url.as_str(), "https://api.digitalocean.com/v2/images/?type=distribution");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,

    /// The path, relative to the base URL.
    pub path: String,

    /// Query parameters. Kept sorted so URLs are stable.
    pub query: BTreeMap<String, String>,

    /// The JSON body, if any.
    pub body: Option<Value>,

    /// The shape a successful body must have.
    pub expect: ResponseShape,
}

impl Request {
    /// Creates a request with no query, no body and no shape check.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
            expect: ResponseShape::Any,
        }
    }

    /// Creates a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Creates a `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Creates a `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds multiple query parameters.
    pub fn with_query_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `body` cannot be represented as JSON.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| Error::Serialization(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Sets the shape a successful body must have.
    pub fn expect(mut self, shape: ResponseShape) -> Self {
        self.expect = shape;
        self
    }

    /// Returns the `application/x-www-form-urlencoded` query string.
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish()
    }

    /// Builds `<base>/<path>?<query>`.
    ///
    /// The `?` is always present, even when there are no parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the result does not parse.
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let url = format!(
            "{}/{}?{}",
            base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/'),
            self.query_string()
        );
        Ok(Url::parse(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://api.digitalocean.com/v2";

    #[test]
    fn test_query_string_is_appended() {
        let request = Request::get("images/").with_query_param("type", "distribution");
        let url = request.url(BASE).unwrap();

        assert!(url.as_str().ends_with("images/?type=distribution"));
    }

    #[test]
    fn test_empty_query_keeps_question_mark() {
        let url = Request::get("droplets/").url(BASE).unwrap();
        assert_eq!(url.as_str(), "https://api.digitalocean.com/v2/droplets/?");
    }

    #[test]
    fn test_slashes_are_normalized() {
        let url = Request::get("/account").url("http://localhost:8080/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/account?");
    }

    #[test]
    fn test_query_values_are_encoded() {
        let request = Request::get("domains/")
            .with_query_params([("name", "a b&c"), ("page", "2")]);

        assert_eq!(request.query_string(), "name=a+b%26c&page=2");
    }

    #[test]
    fn test_json_body() {
        #[derive(Serialize)]
        struct Rename<'a> {
            name: &'a str,
        }

        let request = Request::put("images/7").with_json(&Rename { name: "base" }).unwrap();
        assert_eq!(request.body, Some(json!({ "name": "base" })));
        assert_eq!(request.method, Method::PUT);
    }
}
