//! Expected shapes of successful response bodies.
//!
//! The API occasionally answers `200 OK` with a body that lacks the top-level
//! key an operation needs. Each operation declares the shape it expects so the
//! executor can treat such a body as a failed attempt.

use serde_json::Value;
use std::fmt;

/// The top-level shape a successful body must have.
///
/// A key is considered missing when it is absent or holds a falsy scalar
/// (`null`, `false`, `0`, `""`). Empty arrays and objects are valid:
/// `{"droplets": []}` satisfies `ResponseShape::array("droplets")`.
///
/// # Examples
///
/// ```
/// use digiocean::ResponseShape;
/// use serde_json::json;
///
/// let shape = ResponseShape::array("droplets");
/// assert!(shape.matches(&json!({ "droplets": [] })));
/// assert!(!shape.matches(&json!({})));
/// assert!(!shape.matches(&json!({ "droplets": null })));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// Any body is accepted.
    #[default]
    Any,
    /// The key must be present with a non-falsy value. Empty arrays and
    /// objects count as present.
    Field(String),
    /// The key must hold a JSON object.
    Object(String),
    /// The key must hold a JSON array (possibly empty).
    Array(String),
}

impl ResponseShape {
    /// Expects `key` to be present with a non-falsy value.
    pub fn field(key: impl Into<String>) -> Self {
        ResponseShape::Field(key.into())
    }

    /// Expects `key` to hold an object.
    pub fn object(key: impl Into<String>) -> Self {
        ResponseShape::Object(key.into())
    }

    /// Expects `key` to hold an array.
    pub fn array(key: impl Into<String>) -> Self {
        ResponseShape::Array(key.into())
    }

    /// Returns the key this shape inspects, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ResponseShape::Any => None,
            ResponseShape::Field(key) | ResponseShape::Object(key) | ResponseShape::Array(key) => {
                Some(key)
            }
        }
    }

    /// Returns `true` if `body` has this shape.
    pub fn matches(&self, body: &Value) -> bool {
        let value = match self.key() {
            None => return true,
            Some(key) => body.get(key),
        };

        match (self, value) {
            (_, None) => false,
            (ResponseShape::Object(_), Some(value)) => value.is_object(),
            (ResponseShape::Array(_), Some(value)) => value.is_array(),
            (_, Some(value)) => !is_falsy(value),
        }
    }
}

/// `null`, `false`, zero and the empty string. Collections are never falsy.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseShape::Any => write!(f, "a body"),
            ResponseShape::Field(key) => write!(f, "field `{}`", key),
            ResponseShape::Object(key) => write!(f, "object field `{}`", key),
            ResponseShape::Array(key) => write!(f, "array field `{}`", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_any_accepts_everything() {
        assert!(ResponseShape::Any.matches(&json!({})));
        assert!(ResponseShape::Any.matches(&json!(null)));
    }

    #[test]
    fn test_object_shape() {
        let shape = ResponseShape::object("droplet");
        assert!(shape.matches(&json!({ "droplet": { "id": 1 } })));
        assert!(shape.matches(&json!({ "droplet": {} })));
        assert!(!shape.matches(&json!({})));
        assert!(!shape.matches(&json!({ "droplet": [1] })));
        assert!(!shape.matches(&json!({ "droplet": null })));
    }

    // An empty collection is a valid answer, unlike a plain truthiness check
    // on the key would suggest.
    #[test]
    fn test_empty_array_is_valid() {
        let shape = ResponseShape::array("droplets");
        assert!(shape.matches(&json!({ "droplets": [] })));
        assert!(!shape.matches(&json!({ "droplets": {} })));
    }

    #[test]
    fn test_field_rejects_falsy_values() {
        let shape = ResponseShape::field("count");
        assert!(!shape.matches(&json!({ "count": 0 })));
        assert!(!shape.matches(&json!({ "count": 0.0 })));
        assert!(!shape.matches(&json!({ "count": false })));
        assert!(!shape.matches(&json!({ "count": "" })));
        assert!(!shape.matches(&json!({ "count": null })));
        assert!(!shape.matches(&json!({ "other": 1 })));
    }

    #[test]
    fn test_field_accepts_truthy_and_empty_collections() {
        let shape = ResponseShape::field("count");
        assert!(shape.matches(&json!({ "count": 3 })));
        assert!(shape.matches(&json!({ "count": true })));
        assert!(shape.matches(&json!({ "count": "x" })));
        assert!(shape.matches(&json!({ "count": [] })));
        assert!(shape.matches(&json!({ "count": {} })));
    }

    #[test]
    fn test_non_object_body_fails_keyed_shapes() {
        assert!(!ResponseShape::field("droplet").matches(&json!([1, 2])));
        assert!(!ResponseShape::array("images").matches(&json!("images")));
    }
}
