//! Cancellation and deadlines for logical calls.
//!
//! A [`Cancellation`] is observed by the retry engine before every attempt,
//! while an attempt is in flight, and while it sleeps between attempts.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a call was stopped before it produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The cancellation token fired.
    Cancelled,
    /// The deadline passed.
    DeadlineExceeded,
}

/// A cancellation token and/or a deadline that bound one logical call.
///
/// The default value never interrupts anything.
///
/// # Examples
///
/// ```no_run
/// use digiocean::{Cancellation, Client};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), digiocean::Error> {
/// let client = Client::new("my-token")?;
/// let token = CancellationToken::new();
///
/// let scoped = client.with_cancellation(
///     Cancellation::new()
///         .with_token(token.clone())
///         .with_timeout(Duration::from_secs(60)),
/// );
///
/// // Calling `token.cancel()` from elsewhere aborts the retry sequence.
/// let droplets = scoped.list_droplets().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Creates a cancellation that never fires.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the call when `token` is cancelled.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Stops the call at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stops the call `timeout` from now.
    ///
    /// A timeout too large to represent leaves the deadline unset.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the token, if any.
    pub fn token(&self) -> Option<&CancellationToken> {
        self.token.as_ref()
    }

    /// Returns the interrupt that has already happened, without waiting.
    pub fn check(&self) -> Option<Interrupt> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Some(Interrupt::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(Interrupt::DeadlineExceeded);
        }
        None
    }

    /// Resolves when the call must stop. Never resolves for the default value.
    pub async fn interrupted(&self) -> Interrupt {
        match (&self.token, self.deadline) {
            (Some(token), Some(deadline)) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Interrupt::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => Interrupt::DeadlineExceeded,
                }
            }
            (Some(token), None) => {
                token.cancelled().await;
                Interrupt::Cancelled
            }
            (None, Some(deadline)) => {
                tokio::time::sleep_until(deadline).await;
                Interrupt::DeadlineExceeded
            }
            (None, None) => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_never_fires() {
        assert_eq!(Cancellation::new().check(), None);
    }

    #[tokio::test]
    async fn test_token_fires() {
        let token = CancellationToken::new();
        let cancellation = Cancellation::new().with_token(token.clone());
        assert_eq!(cancellation.check(), None);

        token.cancel();
        assert_eq!(cancellation.check(), Some(Interrupt::Cancelled));
        assert_eq!(cancellation.interrupted().await, Interrupt::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires() {
        let cancellation = Cancellation::new().with_timeout(Duration::from_secs(5));
        let start = Instant::now();

        assert_eq!(cancellation.interrupted().await, Interrupt::DeadlineExceeded);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(cancellation.check(), Some(Interrupt::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_has_no_deadline() {
        let cancellation = Cancellation::new().with_timeout(Duration::MAX);
        assert_eq!(cancellation.deadline(), None);
        assert_eq!(cancellation.check(), None);
    }
}
