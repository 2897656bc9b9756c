//! Deciding which failed attempts are worth repeating.
//!
//! The retry engine asks a [`RetryClassifier`] about every failed attempt.
//! The default, [`RetryAll`], retries everything until attempts run out.
//! Callers that must not repeat certain requests (a `401`, or a droplet
//! creation whose response went missing) plug in a stricter classifier.

use crate::retry::RetryDecision;
use crate::Error;
use http::Method;

/// What the classifier knows about the attempt that failed.
#[derive(Debug, Clone, Copy)]
pub struct AttemptContext<'a> {
    /// The attempt number (1-indexed).
    pub attempt: usize,
    /// The HTTP method of the call.
    pub method: &'a Method,
    /// The path of the call, relative to the base URL.
    pub path: &'a str,
}

/// Trait for deciding whether a failed attempt should be retried.
///
/// Closures of the form `Fn(&Error, &AttemptContext) -> RetryDecision` are
/// classifiers too.
///
/// # Examples
///
/// ```
/// use digiocean::classify::{AttemptContext, RetryClassifier};
/// use digiocean::{Error, RetryDecision};
///
/// struct RetryOnRateLimit;
///
/// impl RetryClassifier for RetryOnRateLimit {
///     fn classify(&self, error: &Error, _ctx: &AttemptContext<'_>) -> RetryDecision {
///         match error.status() {
///             Some(status) if status.as_u16() == 429 => RetryDecision::Retry,
///             _ => RetryDecision::Permanent,
///         }
///     }
/// }
/// ```
pub trait RetryClassifier: Send + Sync {
    /// Classifies the failure of one attempt.
    fn classify(&self, error: &Error, ctx: &AttemptContext<'_>) -> RetryDecision;
}

impl<F> RetryClassifier for F
where
    F: Fn(&Error, &AttemptContext<'_>) -> RetryDecision + Send + Sync,
{
    fn classify(&self, error: &Error, ctx: &AttemptContext<'_>) -> RetryDecision {
        self(error, ctx)
    }
}

/// Retry every failed attempt. This is the client's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryAll;

impl RetryClassifier for RetryAll {
    fn classify(&self, _error: &Error, _ctx: &AttemptContext<'_>) -> RetryDecision {
        RetryDecision::Retry
    }
}

/// Retry only errors for which [`Error::is_transient`] holds.
///
/// Transport errors, incomplete 2xx bodies, 5xx, 408 and 429 are retried;
/// any other 4xx is permanent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryTransient;

impl RetryClassifier for RetryTransient {
    fn classify(&self, error: &Error, _ctx: &AttemptContext<'_>) -> RetryDecision {
        if error.is_transient() {
            RetryDecision::Retry
        } else {
            RetryDecision::Permanent
        }
    }
}

/// Never retry `POST` requests; delegate everything else.
///
/// A retried `POST` can create a second droplet, domain or key when the
/// first attempt reached the API but its response was lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdempotentOnly<C> {
    inner: C,
}

impl<C> IdempotentOnly<C> {
    /// Wraps `inner`, which classifies failures of non-`POST` requests.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: RetryClassifier> RetryClassifier for IdempotentOnly<C> {
    fn classify(&self, error: &Error, ctx: &AttemptContext<'_>) -> RetryDecision {
        if *ctx.method == Method::POST {
            RetryDecision::Permanent
        } else {
            self.inner.classify(error, ctx)
        }
    }
}

/// Retry if ANY of the classifiers says retry.
///
/// # Examples
///
/// ```
/// use digiocean::classify::{AnyOf, AttemptContext, RetryTransient};
/// use digiocean::{Error, RetryDecision};
///
/// // Transient errors, plus 404s on freshly created resources.
/// let classifier = AnyOf::new(vec![
///     Box::new(RetryTransient),
///     Box::new(|error: &Error, _ctx: &AttemptContext<'_>| match error.status() {
///         Some(status) if status.as_u16() == 404 => RetryDecision::Retry,
///         _ => RetryDecision::Permanent,
///     }),
/// ]);
/// ```
pub struct AnyOf {
    classifiers: Vec<Box<dyn RetryClassifier>>,
}

impl AnyOf {
    /// Creates a new `AnyOf` from a list of classifiers.
    pub fn new(classifiers: Vec<Box<dyn RetryClassifier>>) -> Self {
        Self { classifiers }
    }
}

impl RetryClassifier for AnyOf {
    fn classify(&self, error: &Error, ctx: &AttemptContext<'_>) -> RetryDecision {
        let retry = self
            .classifiers
            .iter()
            .any(|c| c.classify(error, ctx) == RetryDecision::Retry);
        if retry {
            RetryDecision::Retry
        } else {
            RetryDecision::Permanent
        }
    }
}

/// Retry only if ALL of the classifiers say retry.
pub struct AllOf {
    classifiers: Vec<Box<dyn RetryClassifier>>,
}

impl AllOf {
    /// Creates a new `AllOf` from a list of classifiers.
    pub fn new(classifiers: Vec<Box<dyn RetryClassifier>>) -> Self {
        Self { classifiers }
    }
}

impl RetryClassifier for AllOf {
    fn classify(&self, error: &Error, ctx: &AttemptContext<'_>) -> RetryDecision {
        let retry = self
            .classifiers
            .iter()
            .all(|c| c.classify(error, ctx) == RetryDecision::Retry);
        if retry {
            RetryDecision::Retry
        } else {
            RetryDecision::Permanent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimitInfo;
    use crate::TransportError;
    use http::StatusCode;

    fn api_error(status: StatusCode) -> Error {
        Error::Api {
            status,
            message: "error".to_string(),
            error_id: None,
            raw_response: String::new(),
            rate_limit: RateLimitInfo::default(),
        }
    }

    fn ctx(method: &Method) -> AttemptContext<'_> {
        AttemptContext {
            attempt: 1,
            method,
            path: "droplets/",
        }
    }

    #[test]
    fn test_retry_all_retries_unauthorized() {
        let decision = RetryAll.classify(&api_error(StatusCode::UNAUTHORIZED), &ctx(&Method::GET));
        assert_eq!(decision, RetryDecision::Retry);
    }

    #[test]
    fn test_retry_transient() {
        let get = Method::GET;
        assert_eq!(
            RetryTransient.classify(&api_error(StatusCode::BAD_GATEWAY), &ctx(&get)),
            RetryDecision::Retry
        );
        assert_eq!(
            RetryTransient.classify(&api_error(StatusCode::UNAUTHORIZED), &ctx(&get)),
            RetryDecision::Permanent
        );
        assert_eq!(
            RetryTransient.classify(
                &Error::Transport(TransportError::new("connection reset")),
                &ctx(&get)
            ),
            RetryDecision::Retry
        );
    }

    #[test]
    fn test_idempotent_only_refuses_post() {
        let classifier = IdempotentOnly::new(RetryAll);
        let error = api_error(StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            classifier.classify(&error, &ctx(&Method::POST)),
            RetryDecision::Permanent
        );
        assert_eq!(
            classifier.classify(&error, &ctx(&Method::PUT)),
            RetryDecision::Retry
        );
        assert_eq!(
            classifier.classify(&error, &ctx(&Method::DELETE)),
            RetryDecision::Retry
        );
    }

    #[test]
    fn test_combinators() {
        let not_found = |error: &Error, _: &AttemptContext<'_>| match error.status() {
            Some(StatusCode::NOT_FOUND) => RetryDecision::Retry,
            _ => RetryDecision::Permanent,
        };
        let get = Method::GET;

        let any = AnyOf::new(vec![Box::new(RetryTransient), Box::new(not_found)]);
        assert_eq!(
            any.classify(&api_error(StatusCode::NOT_FOUND), &ctx(&get)),
            RetryDecision::Retry
        );
        assert_eq!(
            any.classify(&api_error(StatusCode::FORBIDDEN), &ctx(&get)),
            RetryDecision::Permanent
        );

        let all = AllOf::new(vec![Box::new(RetryTransient), Box::new(not_found)]);
        assert_eq!(
            all.classify(&api_error(StatusCode::NOT_FOUND), &ctx(&get)),
            RetryDecision::Permanent
        );
    }
}
