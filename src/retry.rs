//! Retry budget and the per-attempt state machine.
//!
//! Only failures that never produced an HTTP status are retried. A status,
//! any status, ends the loop: 2xx succeeds and everything else becomes an
//! [`Error::HttpError`] right away. A body that breaks off after the status
//! arrived is [`Error::BodyReadFailed`], also final, so non-idempotent writes
//! are never replayed after the server has seen them.

use crate::{Error, Response, Result};
use http::{Method, StatusCode};

/// Retries allowed after a connection failure when none are configured.
pub const DEFAULT_RETRIES: usize = 3;

/// How many extra attempts a call may make after connection failures.
///
/// A budget of `n` allows at most `n + 1` transport attempts per call.
///
/// # Examples
///
/// ```
/// use bitbucket_rest::RetryBudget;
///
/// assert_eq!(RetryBudget::default().max_attempts(), 4);
/// assert_eq!(RetryBudget::new(0).max_attempts(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    retries: usize,
}

impl RetryBudget {
    /// Creates a budget allowing `retries` additional attempts.
    pub fn new(retries: usize) -> Self {
        Self { retries }
    }

    /// The number of retries after the first attempt.
    pub fn retries(&self) -> usize {
        self.retries
    }

    /// The total number of transport attempts allowed.
    pub fn max_attempts(&self) -> usize {
        self.retries.saturating_add(1)
    }

    /// Decides what happens after attempt number `attempt` (1-indexed) produced `outcome`.
    pub(crate) fn next(&self, method: &Method, attempt: usize, outcome: Result<Response>) -> State {
        match outcome {
            Ok(response) if response.is_success() => State::Succeeded(response),
            Ok(response) if *method == Method::DELETE && response.status == StatusCode::NO_CONTENT => {
                State::Succeeded(response)
            }
            Ok(response) => State::FailedApplication(response.into_error()),
            Err(e) if e.is_transient() => {
                if attempt < self.max_attempts() {
                    State::Attempting {
                        next: attempt + 1,
                        cause: e,
                    }
                } else {
                    State::FailedFatal(Error::NoConnection {
                        attempts: attempt,
                        last_error: Box::new(e),
                    })
                }
            }
            Err(e) => State::FailedApplication(e),
        }
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES)
    }
}

/// Where the retry loop stands after an attempt.
#[derive(Debug)]
pub(crate) enum State {
    /// Attempt `next` should run; `cause` is the connection failure that was absorbed.
    Attempting { next: usize, cause: Error },
    /// The server answered with a success status.
    Succeeded(Response),
    /// The budget ran out on connection failures.
    FailedFatal(Error),
    /// The server answered with an error status, or the request itself was unusable.
    FailedApplication(Error),
}
