//! # Mock Store & Testing Guide
//!
//! The `MockStore<T>` hands out a real `ResourceClient<T>` whose requests are answered from a
//! queue of scripted expectations instead of an in-memory map. It lets you inject exactly the
//! store behaviour a test needs (a conflict on the second write, a fetch error mid-wait) without
//! having to provoke it through a real actor.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockStore | ResourceActor |
//! |---------|-----------|---------------|
//! | **Determinism** | 100% scripted | Subject to scheduler |
//! | **State** | None (expectations) | Real objects, real versions |
//! | **Error Injection** | Easy (`return_err`) | Requires a racing writer |
//! | **Use Case** | Exact request sequences | Protocol end-to-end with a controller |
//!
//! ## Example
//!
//! ```rust
//! use reconcile_framework::mock::MockStore;
//! use reconcile_framework::{ObjectKey, ResourceStore, StoreError};
//! # use reconcile_framework::{ObjectMeta, Reconcilable, ReconcileStatus};
//! # #[derive(Clone, Debug)]
//! # struct Widget { meta: ObjectMeta, status: ReconcileStatus }
//! # impl Reconcilable for Widget {
//! #     const KIND: &'static str = "Widget";
//! #     type Spec = ();
//! #     fn meta(&self) -> &ObjectMeta { &self.meta }
//! #     fn meta_mut(&mut self) -> &mut ObjectMeta { &mut self.meta }
//! #     fn spec(&self) -> &() { &() }
//! #     fn status(&self) -> &ReconcileStatus { &self.status }
//! #     fn status_mut(&mut self) -> &mut ReconcileStatus { &mut self.status }
//! #     fn suspended(&self) -> bool { false }
//! # }
//!
//! #[tokio::main]
//! async fn main() {
//!     let key = ObjectKey::new("default", "w");
//!     let mut mock = MockStore::<Widget>::new();
//!     mock.expect_get(key.clone())
//!         .return_err(StoreError::NotFound(key.to_string()));
//!
//!     let client = mock.client();
//!     assert!(client.get(&key).await.unwrap_err().is_not_found());
//!     mock.verify();
//! }
//! ```
//!
//! ## Mocking Utilities
//!
//! Use the fluent [`MockStore`] API, or [`create_mock_store`] to get a client and the raw
//! request receiver when a test wants to inspect and answer each request by hand.

use crate::client::ResourceClient;
use crate::entity::{ObjectKey, Reconcilable};
use crate::error::StoreError;
use crate::message::{ResourceRequest, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the scripted answer.
///
/// For writes, `response: None` means "accept": the received object is echoed back.
enum Expectation<T: Reconcilable> {
    Get {
        key: ObjectKey,
        response: Result<T, StoreError>,
    },
    Update {
        response: Option<Result<T, StoreError>>,
    },
    UpdateStatus {
        response: Option<Result<T, StoreError>>,
    },
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock store with expectation tracking for fluent testing.
///
/// Requests are matched strictly in order. A request that does not match the next
/// expectation panics the background task, which the caller observes as
/// [`StoreError::ActorDropped`] or [`StoreError::ActorClosed`].
pub struct MockStore<T: Reconcilable> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    writes: Arc<Mutex<Vec<T>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: Reconcilable> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reconcilable> MockStore<T> {
    /// Creates a new mock store with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let writes = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let writes_clone = writes.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        ResourceRequest::Get { key, respond_to },
                        Some(Expectation::Get {
                            key: expected,
                            response,
                        }),
                    ) => {
                        assert_eq!(key, expected, "Get for unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { object, respond_to },
                        Some(Expectation::Update { response }),
                    ) => {
                        answer_write(&writes_clone, object, response, respond_to);
                    }
                    (
                        ResourceRequest::UpdateStatus { object, respond_to },
                        Some(Expectation::UpdateStatus { response }),
                    ) => {
                        answer_write(&writes_clone, object, response, respond_to);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            writes,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` for `key`.
    pub fn expect_get(&mut self, key: ObjectKey) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            key,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects an `update`.
    pub fn expect_update(&mut self) -> WriteExpectationBuilder<T> {
        WriteExpectationBuilder {
            status: false,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects an `update_status`.
    pub fn expect_update_status(&mut self) -> WriteExpectationBuilder<T> {
        WriteExpectationBuilder {
            status: true,
            expectations: self.expectations.clone(),
        }
    }

    /// Every object received by a write request, in arrival order, accepted or not.
    pub fn writes(&self) -> Vec<T> {
        self.writes.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

fn answer_write<T: Reconcilable>(
    writes: &Mutex<Vec<T>>,
    object: T,
    response: Option<Result<T, StoreError>>,
    respond_to: Response<T>,
) {
    writes.lock().unwrap().push(object.clone());
    let _ = respond_to.send(response.unwrap_or(Ok(object)));
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: Reconcilable> {
    key: ObjectKey,
    expectations: Expectations<T>,
}

impl<T: Reconcilable> GetExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.expectations.lock().unwrap().push_back(Expectation::Get {
            key: self.key,
            response: Ok(value),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.expectations.lock().unwrap().push_back(Expectation::Get {
            key: self.key,
            response: Err(error),
        });
    }
}

/// Builder for `update` and `update_status` expectations.
pub struct WriteExpectationBuilder<T: Reconcilable> {
    status: bool,
    expectations: Expectations<T>,
}

impl<T: Reconcilable> WriteExpectationBuilder<T> {
    fn push(self, response: Option<Result<T, StoreError>>) {
        let expectation = if self.status {
            Expectation::UpdateStatus { response }
        } else {
            Expectation::Update { response }
        };
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Accepts the write, echoing the received object back.
    pub fn accept(self) {
        self.push(None);
    }

    /// Sets the expectation to return a specific object.
    pub fn return_ok(self, value: T) {
        self.push(Some(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.push(Some(Err(error)));
    }
}

// =============================================================================
// MANUAL HELPERS
// =============================================================================

/// Creates a client and the raw receiver for asserting requests.
///
/// # Testing Strategy
/// The test drives the code under test on one task and plays the store on another:
/// receive the next request, assert on it, answer through its `respond_to` channel.
///
/// **Note**: Consider using [`MockStore`] for a more fluent API.
pub fn create_mock_store<T: Reconcilable>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get_request<T: Reconcilable>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(ObjectKey, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { key, respond_to }) => Some((key, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update_request<T: Reconcilable>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { object, respond_to }) => Some((object, respond_to)),
        _ => None,
    }
}
