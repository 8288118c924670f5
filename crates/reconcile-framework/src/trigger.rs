//! # Trigger Mutator
//!
//! Stamps a fresh reconcile-request marker onto a resource with a read-modify-write,
//! retrying the whole sequence when the write loses an optimistic-concurrency race.

use crate::entity::{ObjectKey, Reconcilable, RECONCILE_REQUEST_ANNOTATION};
use crate::error::ReconcileError;
use crate::store::ResourceStore;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Nanosecond timestamp of the last marker handed out by this process.
static LAST_MARKER_NANOS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Exponential backoff between conflicting write attempts.
///
/// `steps` bounds the number of attempts, not the number of sleeps.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    pub duration: Duration,
    pub factor: f64,
    pub jitter: f64,
    pub steps: u32,
}

impl Default for Backoff {
    /// 10ms, growing 5x per attempt with 10% jitter, at most 4 attempts.
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(10),
            factor: 5.0,
            jitter: 0.1,
            steps: 4,
        }
    }
}

impl Backoff {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let multiplier = self.factor.max(1.0).powi(exponent);
        let base = Duration::from_nanos((self.duration.as_nanos() as f64 * multiplier) as u64);
        if self.jitter <= 0.0 {
            return base;
        }
        let extra = rand::rng().random_range(0.0..self.jitter);
        base + base.mul_f64(extra)
    }
}

/// Returns a new marker value: the current UTC time, RFC 3339 with nanoseconds.
///
/// Markers handed out by one process are strictly increasing, so two requests
/// never carry the same value even when the wall clock has not moved.
pub fn next_marker() -> String {
    let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
    let previous = LAST_MARKER_NANOS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or(now);
    let nanos = now.max(previous.saturating_add(1));
    DateTime::<Utc>::from_timestamp_nanos(nanos).to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Writes a fresh reconcile-request marker onto `key`, returning the marker written.
///
/// Each attempt re-fetches the object, so a retry always works from the latest version.
/// Only [`StoreError::Conflict`](crate::StoreError::Conflict) is retried; any other failure
/// is returned at once. Retries stop after `backoff.steps` attempts, or as soon as
/// `deadline` has passed, with [`ReconcileError::ConflictExhausted`]. A backoff sleep never
/// extends past `deadline`.
///
/// Callers that need the pre-request `last_handled_reconcile_at` must read it before
/// calling this.
pub async fn request_reconciliation<T, S>(
    store: &S,
    key: &ObjectKey,
    backoff: &Backoff,
    deadline: Instant,
) -> Result<String, ReconcileError>
where
    T: Reconcilable,
    S: ResourceStore<T> + ?Sized,
{
    let max_attempts = backoff.steps.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let mut object = store
            .get(key)
            .await
            .map_err(|e| ReconcileError::from_store(T::KIND, key, e))?;

        let marker = next_marker();
        object
            .meta_mut()
            .annotations
            .insert(RECONCILE_REQUEST_ANNOTATION.to_string(), marker.clone());

        let error = match store.update(object).await {
            Ok(_) => {
                debug!(kind = T::KIND, %key, %marker, attempt, "Reconcile request written");
                return Ok(marker);
            }
            Err(e) if e.is_conflict() => e,
            Err(e) => return Err(ReconcileError::from_store(T::KIND, key, e)),
        };

        let now = Instant::now();
        if attempt >= max_attempts || now >= deadline {
            warn!(kind = T::KIND, %key, attempt, error = %error, "Giving up on conflicting writes");
            return Err(ReconcileError::ConflictExhausted {
                kind: T::KIND,
                key: key.clone(),
                attempts: attempt,
            });
        }

        let delay = backoff.delay_for_attempt(attempt).min(deadline - now);
        warn!(
            kind = T::KIND,
            %key,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Write conflict, retrying"
        );
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_unique_and_increasing() {
        let markers: Vec<String> = (0..1000).map(|_| next_marker()).collect();
        for pair in markers.windows(2) {
            let a = DateTime::parse_from_rfc3339(&pair[0]).unwrap();
            let b = DateTime::parse_from_rfc3339(&pair[1]).unwrap();
            assert!(b > a, "{} !> {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn test_marker_has_nanosecond_precision() {
        let marker = next_marker();
        let fraction = marker
            .split('.')
            .nth(1)
            .expect("fractional seconds present");
        assert_eq!(fraction.trim_end_matches('Z').len(), 9);
        assert!(marker.ends_with('Z'));
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let backoff = Backoff {
            jitter: 0.0,
            ..Backoff::default()
        };
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(10));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(50));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(250));
    }

    #[test]
    fn test_backoff_jitter_is_bounded() {
        let backoff = Backoff::default();
        for _ in 0..100 {
            let delay = backoff.delay_for_attempt(2);
            assert!(delay >= Duration::from_millis(50));
            assert!(delay < Duration::from_millis(55));
        }
    }

    #[tokio::test]
    async fn test_request_writes_annotation_on_fetched_object() {
        use crate::fixtures::Widget;
        use crate::mock::{create_mock_store, expect_get_request, expect_update_request};

        let (client, mut receiver) = create_mock_store::<Widget>(10);
        let key = ObjectKey::new("default", "w");

        let request_key = key.clone();
        let task = tokio::spawn(async move {
            let deadline = Instant::now() + Duration::from_secs(5);
            request_reconciliation(&client, &request_key, &Backoff::default(), deadline).await
        });

        let (requested, responder) = expect_get_request(&mut receiver)
            .await
            .expect("Expected Get request");
        assert_eq!(requested, key);
        let mut fetched = Widget::new("w");
        fetched.meta.resource_version = "7".to_string();
        fetched
            .meta
            .annotations
            .insert("owner".to_string(), "platform".to_string());
        responder.send(Ok(fetched)).unwrap();

        let (written, responder) = expect_update_request(&mut receiver)
            .await
            .expect("Expected Update request");
        assert_eq!(written.meta.resource_version, "7");
        assert_eq!(written.meta.annotation("owner"), Some("platform"));
        let stamped = written
            .meta
            .annotation(RECONCILE_REQUEST_ANNOTATION)
            .expect("marker written")
            .to_string();
        responder.send(Ok(written)).unwrap();

        let marker = task.await.unwrap().unwrap();
        assert_eq!(marker, stamped);
    }
}
