//! Cancellable call context.
//!
//! A [`Context`] travels through every endpoint call. It carries:
//! - a cancellation token, canceled explicitly or when a parent is canceled;
//! - an optional deadline, never later than the parent's;
//! - typed values, for data that must flow alongside the request (trace ids, ...).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use conduit_core::Context;
//!
//! #[derive(Clone)]
//! struct RequestId(u64);
//!
//! let ctx = Context::background()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_value(RequestId(42));
//!
//! assert_eq!(ctx.value::<RequestId>().map(|id| id.0), Some(42));
//! assert!(ctx.deadline().is_some());
//! ```

use std::sync::Arc;
use std::time::Duration;

use derive_more::{Display, Error};
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum ContextError {
    /// The context (or one of its parents) was canceled.
    #[display("context canceled")]
    Canceled,
    /// The context deadline passed.
    #[display("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellable call context with deadline and typed values.
///
/// Cloning is cheap; clones share the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    values: Arc<http::Extensions>,
}

impl Context {
    /// An empty root context: never canceled unless [`cancel`](Self::cancel) is called.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context.
    ///
    /// Canceling the child leaves the parent untouched; canceling the parent
    /// cancels the child.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            values: Arc::clone(&self.values),
        }
    }

    /// Derive a child context that is done at `deadline` at the latest.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut child = self.child();
        child.deadline = Some(self.deadline.map_or(deadline, |parent| parent.min(deadline)));
        child
    }

    /// Derive a child context that is done after `timeout` at the latest.
    ///
    /// A timeout too large to be represented as an instant adds no deadline.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Attach a typed value, replacing any previous value of the same type.
    ///
    /// Cancellation state is shared with `self`.
    #[must_use]
    pub fn with_value<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        Arc::make_mut(&mut self.values).insert(value);
        self
    }

    /// Typed value previously attached with [`with_value`](Self::with_value).
    #[must_use]
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    /// The deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Guard that cancels this context when dropped.
    ///
    /// Hold it for the duration of a scope to release the context on every exit path.
    #[must_use]
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Reason this context is done, or `None` while it is still live.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            Some(ContextError::Canceled)
        } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            Some(ContextError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Returns `true` once the context is canceled or past its deadline.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Wait until the context is done.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                () = self.token.cancelled() => ContextError::Canceled,
                () = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ContextError::Canceled
            }
        }
    }
}
