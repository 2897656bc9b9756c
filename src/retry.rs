//! Retry policy and the engine that drives repeated attempts.
//!
//! [`RetryPolicy::run`] knows nothing about HTTP: it invokes a unit of
//! fallible async work, asks a classifier whether a failure is worth another
//! attempt, sleeps according to the [`Backoff`], and reports the outcome of
//! the last attempt.

use crate::cancel::{Cancellation, Interrupt};
use rand::Rng;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

/// Number of attempts made by [`RetryPolicy::default`].
pub const DEFAULT_MAX_ATTEMPTS: usize = 25;

/// Backoff unit of [`RetryPolicy::default`].
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// How long to wait after a failed attempt.
///
/// # Examples
///
/// ```
/// use digiocean::Backoff;
/// use std::time::Duration;
///
/// // Linear backoff: 1s, 2s, 3s...
/// let linear = Backoff::Linear { unit: Duration::from_secs(1) };
/// assert_eq!(linear.delay_for_attempt(3), Duration::from_secs(3));
///
/// // Exponential backoff: 100ms, 200ms, 400ms... capped at 10s
/// let exponential = Backoff::Exponential {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(10),
///     jitter: false,
/// };
/// assert_eq!(exponential.delay_for_attempt(3), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone)]
pub enum Backoff {
    /// Retry immediately.
    None,

    /// Wait the same delay after every failed attempt.
    Fixed {
        /// The delay between attempts.
        delay: Duration,
    },

    /// Wait `attempt * unit` after failed attempt number `attempt`.
    Linear {
        /// The delay after the first failed attempt.
        unit: Duration,
    },

    /// Wait `initial_delay * 2^(attempt - 1)`, capped at `max_delay`.
    ///
    /// Optional jitter scales each delay by a random factor in 50%..=100%.
    Exponential {
        /// The delay after the first failed attempt.
        initial_delay: Duration,
        /// The maximum delay between attempts.
        max_delay: Duration,
        /// Whether to add random jitter to delays.
        jitter: bool,
    },

    /// Custom backoff.
    ///
    /// Takes the number of the attempt that just failed (1-indexed) and
    /// returns the delay before the next one. A zero delay retries at once.
    Custom {
        /// Function that determines the delay.
        delay_fn: fn(attempt: usize) -> Duration,
    },
}

impl Backoff {
    /// Returns the delay after failed attempt number `attempt` (1-indexed).
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay } => *delay,
            Backoff::Linear { unit } => {
                unit.saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX))
            }
            Backoff::Exponential {
                initial_delay,
                max_delay,
                jitter,
            } => {
                let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1) as u32);
                let delay = initial_delay.saturating_mul(multiplier).min(*max_delay);

                if *jitter {
                    let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
                    delay.mul_f64(jitter_factor)
                } else {
                    delay
                }
            }
            Backoff::Custom { delay_fn } => delay_fn(attempt),
        }
    }
}

/// Whether a failed attempt should be followed by another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again if attempts remain.
    Retry,
    /// Stop now and report this failure.
    Permanent,
}

/// Why [`RetryPolicy::run`] gave up.
#[derive(thiserror::Error, Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed. Carries the error of the last one.
    #[error("gave up after {attempts} attempt(s): {error}")]
    Exhausted {
        /// Attempts made
        attempts: usize,
        /// The error of the last attempt
        error: E,
    },

    /// The classifier declared the failure permanent.
    #[error("permanent failure on attempt {attempt}: {error}")]
    Permanent {
        /// The attempt that failed
        attempt: usize,
        /// Its error
        error: E,
    },

    /// The cancellation token fired.
    #[error("cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Attempts started before cancellation
        attempts: usize,
        /// The error of the last completed attempt, if any
        last_error: Option<E>,
    },

    /// The deadline passed.
    #[error("deadline exceeded after {attempts} attempt(s)")]
    DeadlineExceeded {
        /// Attempts started before the deadline
        attempts: usize,
        /// The error of the last completed attempt, if any
        last_error: Option<E>,
    },
}

impl<E> RetryError<E> {
    fn interrupted(interrupt: Interrupt, attempts: usize, last_error: Option<E>) -> Self {
        match interrupt {
            Interrupt::Cancelled => RetryError::Cancelled {
                attempts,
                last_error,
            },
            Interrupt::DeadlineExceeded => RetryError::DeadlineExceeded {
                attempts,
                last_error,
            },
        }
    }

    /// Returns the number of attempts started.
    pub fn attempts(&self) -> usize {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Permanent { attempt, .. } => *attempt,
            RetryError::Cancelled { attempts, .. } => *attempts,
            RetryError::DeadlineExceeded { attempts, .. } => *attempts,
        }
    }

    /// Returns the error of the last completed attempt, if any.
    pub fn into_last_error(self) -> Option<E> {
        match self {
            RetryError::Exhausted { error, .. } | RetryError::Permanent { error, .. } => Some(error),
            RetryError::Cancelled { last_error, .. }
            | RetryError::DeadlineExceeded { last_error, .. } => last_error,
        }
    }
}

/// How many times to attempt a call and how long to wait in between.
///
/// The default makes 25 attempts with linear backoff in 1 second units, so a
/// call that never succeeds waits 1 + 2 + ... + 24 = 300 seconds in total.
///
/// # Examples
///
/// ```
/// use digiocean::{Backoff, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 25);
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
///
/// // Tests usually want no waiting at all.
/// let fast = RetryPolicy::immediate(3);
/// assert_eq!(fast.delay_for_attempt(1), Duration::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first. Zero is treated as one.
    pub max_attempts: usize,
    /// Delay between attempts.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(max_attempts: usize, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Creates a policy with linear backoff in `unit` steps.
    pub fn linear(max_attempts: usize, unit: Duration) -> Self {
        Self::new(max_attempts, Backoff::Linear { unit })
    }

    /// Creates a policy that retries without waiting.
    pub fn immediate(max_attempts: usize) -> Self {
        Self::new(max_attempts, Backoff::None)
    }

    /// Creates a policy that makes a single attempt.
    pub fn no_retry() -> Self {
        Self::new(1, Backoff::None)
    }

    /// Returns the delay after failed attempt number `attempt`.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        self.backoff.delay_for_attempt(attempt)
    }

    /// Runs `work` until it succeeds, fails permanently, runs out of
    /// attempts, or `cancellation` fires.
    ///
    /// * `work` receives the attempt number, starting at 1.
    /// * `classify` sees every failure and its attempt number.
    /// * `on_attempt` is called before every attempt. A panic inside it is
    ///   logged and otherwise ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use digiocean::{Cancellation, RetryDecision, RetryError, RetryPolicy};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let policy = RetryPolicy::immediate(3);
    ///
    /// let outcome: Result<u32, RetryError<String>> = policy
    ///     .run(
    ///         &Cancellation::new(),
    ///         |attempt| async move {
    ///             if attempt < 2 { Err(format!("attempt {} failed", attempt)) } else { Ok(7) }
    ///         },
    ///         |_error, _attempt| RetryDecision::Retry,
    ///         |attempt| println!("starting attempt {}", attempt),
    ///     )
    ///     .await;
    ///
    /// assert_eq!(outcome.unwrap(), 7);
    /// # }
    /// ```
    pub async fn run<T, E, W, Fut, C, O>(
        &self,
        cancellation: &Cancellation,
        mut work: W,
        classify: C,
        on_attempt: O,
    ) -> Result<T, RetryError<E>>
    where
        W: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E, usize) -> RetryDecision,
        O: Fn(usize),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_error: Option<E> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;

            if let Some(interrupt) = cancellation.check() {
                return Err(RetryError::interrupted(interrupt, attempt - 1, last_error));
            }

            if catch_unwind(AssertUnwindSafe(|| on_attempt(attempt))).is_err() {
                tracing::warn!(attempt = attempt, "Attempt hook panicked; ignoring");
            }

            let outcome = tokio::select! {
                biased;
                interrupt = cancellation.interrupted() => {
                    return Err(RetryError::interrupted(interrupt, attempt, last_error));
                }
                outcome = work(attempt) => outcome,
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if classify(&error, attempt) == RetryDecision::Permanent {
                return Err(RetryError::Permanent { attempt, error });
            }

            if attempt >= max_attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    error,
                });
            }

            let delay = self.delay_for_attempt(attempt);
            last_error = Some(error);

            if delay.is_zero() {
                continue;
            }

            tracing::warn!(
                delay_ms = delay.as_millis() as u64,
                attempt = attempt,
                "Retrying after delay"
            );

            tokio::select! {
                biased;
                interrupt = cancellation.interrupted() => {
                    return Err(RetryError::interrupted(interrupt, attempt, last_error));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn retry_all(_: &String, _: usize) -> RetryDecision {
        RetryDecision::Retry
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(24), Duration::from_millis(24000));

        let total: Duration = (1..25).map(|a| policy.delay_for_attempt(a)).sum();
        assert_eq!(total, Duration::from_secs(300));
    }

    #[test]
    fn test_exponential_backoff_delays() {
        let backoff = Backoff::Exponential {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            jitter: false,
        };

        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(backoff.delay_for_attempt(4), Duration::from_millis(800));
        assert_eq!(backoff.delay_for_attempt(5), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(60), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_jitter_stays_in_range() {
        let backoff = Backoff::Exponential {
            initial_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(10),
            jitter: true,
        };

        for _ in 0..50 {
            let delay = backoff.delay_for_attempt(1);
            assert!(delay >= Duration::from_millis(200) && delay <= Duration::from_millis(400));
        }
    }

    #[test]
    fn test_fixed_and_custom_delays() {
        let fixed = Backoff::Fixed {
            delay: Duration::from_millis(250),
        };
        assert_eq!(fixed.delay_for_attempt(9), Duration::from_millis(250));

        let custom = Backoff::Custom {
            delay_fn: |attempt| Duration::from_millis(attempt as u64 * 10),
        };
        assert_eq!(custom.delay_for_attempt(3), Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_always_failing_work_runs_max_attempts() {
        for max_attempts in 1..=6 {
            let calls = AtomicUsize::new(0);
            let policy = RetryPolicy::immediate(max_attempts);

            let result: Result<(), _> = policy
                .run(
                    &Cancellation::new(),
                    |attempt| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async move { Err(format!("failure {}", attempt)) }
                    },
                    retry_all,
                    |_| {},
                )
                .await;

            assert_eq!(calls.load(Ordering::SeqCst), max_attempts);
            match result {
                Err(RetryError::Exhausted { attempts, error }) => {
                    assert_eq!(attempts, max_attempts);
                    assert_eq!(error, format!("failure {}", max_attempts));
                }
                other => panic!("Expected Exhausted, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::immediate(10);

        let result = policy
            .run(
                &Cancellation::new(),
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt < 4 {
                            Err("not yet".to_string())
                        } else {
                            Ok(attempt)
                        }
                    }
                },
                retry_all,
                |_| {},
            )
            .await;

        assert_eq!(result.unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_zero_max_attempts_still_runs_once() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::immediate(0);

        let result: Result<(), _> = policy
            .run(
                &Cancellation::new(),
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("boom".to_string()) }
                },
                retry_all,
                |_| {},
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_sleeps() {
        let policy = RetryPolicy::linear(1, Duration::from_secs(30));
        let start = Instant::now();

        let result: Result<(), _> = policy
            .run(
                &Cancellation::new(),
                |_| async { Err("boom".to_string()) },
                retry_all,
                |_| {},
            )
            .await;

        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_between_attempts_follow_backoff() {
        let policy = RetryPolicy::default();
        let starts = Mutex::new(Vec::new());

        let result = policy
            .run(
                &Cancellation::new(),
                |attempt| {
                    starts.lock().unwrap().push(Instant::now());
                    async move {
                        if attempt < 4 {
                            Err("flaky".to_string())
                        } else {
                            Ok(())
                        }
                    }
                },
                retry_all,
                |_| {},
            )
            .await;

        assert!(result.is_ok());
        let starts = starts.into_inner().unwrap();
        let gaps: Vec<Duration> = starts.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            gaps,
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(3000),
            ]
        );
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::immediate(5);

        let result: Result<(), _> = policy
            .run(
                &Cancellation::new(),
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt == 1 {
                            Err("transient".to_string())
                        } else {
                            Err("fatal".to_string())
                        }
                    }
                },
                |error: &String, _| {
                    if error == "fatal" {
                        RetryDecision::Permanent
                    } else {
                        RetryDecision::Retry
                    }
                },
                |_| {},
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        match result {
            Err(RetryError::Permanent { attempt, error }) => {
                assert_eq!(attempt, 2);
                assert_eq!(error, "fatal");
            }
            other => panic!("Expected Permanent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_on_attempt_sees_every_attempt_and_panics_are_ignored() {
        let seen = Mutex::new(Vec::new());
        let policy = RetryPolicy::immediate(3);

        let result: Result<(), _> = policy
            .run(
                &Cancellation::new(),
                |_| async { Err("boom".to_string()) },
                retry_all,
                |attempt| {
                    seen.lock().unwrap().push(attempt);
                    if attempt == 2 {
                        panic!("hook failure");
                    }
                },
            )
            .await;

        assert_eq!(seen.into_inner().unwrap(), vec![1, 2, 3]);
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 3, .. })));
    }

    #[tokio::test]
    async fn test_already_cancelled_runs_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicUsize::new(0);

        let result: Result<(), RetryError<String>> = RetryPolicy::default()
            .run(
                &Cancellation::new().with_token(token),
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                },
                retry_all,
                |_| {},
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            result,
            Err(RetryError::Cancelled {
                attempts: 0,
                last_error: None
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let result: Result<(), _> = RetryPolicy::default()
            .run(
                &Cancellation::new().with_token(token),
                |attempt| async move { Err(format!("failure {}", attempt)) },
                retry_all,
                |_| {},
            )
            .await;

        // Attempt 1 fails, 1s sleep, attempt 2 fails, cancelled during the 2s sleep.
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
        match result {
            Err(RetryError::Cancelled {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 2);
                assert_eq!(last_error.as_deref(), Some("failure 2"));
            }
            other => panic!("Expected Cancelled, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_in_flight_attempt() {
        let cancellation = Cancellation::new().with_timeout(Duration::from_secs(2));

        let result: Result<(), RetryError<String>> = RetryPolicy::default()
            .run(
                &cancellation,
                |_| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                },
                retry_all,
                |_| {},
            )
            .await;

        assert!(matches!(
            result,
            Err(RetryError::DeadlineExceeded {
                attempts: 1,
                last_error: None
            })
        ));
    }
}
