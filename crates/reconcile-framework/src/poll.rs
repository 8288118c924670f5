//! # Condition Poller
//!
//! A bounded polling primitive: fetch, evaluate, sleep, repeat, until the predicate holds,
//! the deadline passes, or something fails.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

/// Floor applied to the polling interval so a zero interval cannot spin.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PollError<E> {
    #[error("timed out waiting for the condition")]
    Timeout,
    #[error("{0}")]
    Failed(E),
}

/// Polls until `predicate` accepts a fetched snapshot, returning that snapshot.
///
/// * The first check runs immediately, before any sleep.
/// * Between checks the task sleeps for `interval`, never past `deadline`.
/// * An error from `fetch` or `predicate` ends the wait at once as [`PollError::Failed`].
/// * If the check made at or after `deadline` still fails, the result is [`PollError::Timeout`].
///
/// `deadline` is absolute so that several waits can share one budget.
pub async fn poll_until<T, E, F, Fut, P>(
    mut fetch: F,
    mut predicate: P,
    interval: Duration,
    deadline: Instant,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> Result<bool, E>,
{
    let interval = interval.max(MIN_INTERVAL);
    let mut checks: u32 = 0;

    loop {
        checks += 1;
        let snapshot = fetch().await.map_err(PollError::Failed)?;
        if predicate(&snapshot).map_err(PollError::Failed)? {
            trace!(checks, "condition satisfied");
            return Ok(snapshot);
        }

        let now = Instant::now();
        if now >= deadline {
            debug!(checks, "deadline elapsed before condition was satisfied");
            return Err(PollError::Timeout);
        }
        sleep(interval.min(deadline - now)).await;
    }
}
