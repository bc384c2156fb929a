//! Eventual-consistency poller.
//!
//! Control-plane writes submitted to the controller become visible through the
//! IAM and Kubernetes read APIs only after a delay. Scenarios bridge that gap
//! with a bounded, fixed-interval poll:
//!
//! ```text
//! deadline = now + timeout
//! loop {
//!     if now >= deadline { fail }
//!     sleep(interval)
//!     if probe() is satisfied { return }
//! }
//! ```
//!
//! There is no final probe after the deadline, no fast path that skips the
//! first sleep, and no backoff. Probe faults abort the wait immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::error::{E2eError, E2eResult};

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60 * 10);
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(15);

/// Bounds of a single wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitOptions {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// `periods` sleeps of `period_length` each, saturating at `Duration::MAX`.
    pub fn periods(periods: u32, period_length: Duration) -> Self {
        Self {
            timeout: period_length.saturating_mul(periods),
            interval: period_length,
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT, DEFAULT_WAIT_INTERVAL)
    }
}

/// Which side of a resource's lifecycle a wait stops on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Exists,
    Deleted,
}

impl Presence {
    fn describe(self) -> &'static str {
        match self {
            Self::Exists => "to exist",
            Self::Deleted => "to be deleted",
        }
    }
}

/// Polls `probe` until it yields `Some`, returning that value.
///
/// `description` is used in the timeout message. A timeout too large to
/// represent as an `Instant` never expires.
pub async fn poll_until<T, F, Fut>(
    description: &str,
    options: WaitOptions,
    mut probe: F,
) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Option<T>>>,
{
    let started = Instant::now();
    let deadline = started.checked_add(options.timeout);
    let mut attempts = 0u32;

    loop {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(E2eError::Timeout {
                what: description.to_string(),
                waited: started.elapsed(),
            });
        }
        sleep(options.interval).await;

        attempts = attempts.saturating_add(1);
        if let Some(value) = probe().await? {
            log::debug!(
                "Observed {} after {} attempt(s) in {:?}",
                description,
                attempts,
                started.elapsed()
            );
            return Ok(value);
        }
        log::debug!("Still waiting for {} (attempt {})", description, attempts);
    }
}

/// Waits until `fetch` reports the resource present (`Exists`) or absent
/// (`Deleted`).
///
/// `kind` and `identifier` only feed the timeout message, e.g.
/// `"Timed out after 600s waiting for Role my-role to exist in IAM API"`.
pub async fn wait_for_presence<T, F, Fut, E>(
    kind: &str,
    identifier: &str,
    presence: Presence,
    options: WaitOptions,
    mut fetch: F,
) -> E2eResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E2eError: From<E>,
{
    let description = format!("{kind} {identifier} {} in IAM API", presence.describe());
    poll_until(&description, options, || {
        let fut = fetch();
        async move {
            let snapshot = fut.await?;
            let satisfied = match presence {
                Presence::Exists => snapshot.is_some(),
                Presence::Deleted => snapshot.is_none(),
            };
            Ok::<_, E2eError>(satisfied.then_some(()))
        }
    })
    .await
}
