//! # Store Messages
//!
//! This module defines the message types used for communication between
//! the `ResourceClient` and `ResourceActor`.

use crate::entity::{ObjectKey, Reconcilable};
use crate::error::StoreError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store actor.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Internal message type sent to the actor to request operations.
///
/// # The Two Writers
/// The store has two kinds of writer, and each gets its own write path:
///
/// - **Update**: written by clients. Replaces metadata and spec, never status.
/// - **UpdateStatus**: written by the controller. Replaces status only.
///
/// Both paths are guarded by the same optimistic-concurrency check on
/// `resource_version`, so a writer whose view is stale is always rejected.
#[derive(Debug)]
pub enum ResourceRequest<T: Reconcilable> {
    Create {
        object: T,
        respond_to: Response<T>,
    },
    Get {
        key: ObjectKey,
        respond_to: Response<T>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        object: T,
        respond_to: Response<T>,
    },
    UpdateStatus {
        object: T,
        respond_to: Response<T>,
    },
}
