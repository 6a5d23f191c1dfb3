//! HTTP client handle.
//!
//! [`HttpClient`] is the network-execution seam of the transport client: it takes a
//! fully encoded [`Request`] and returns the raw [`Response`]. The production
//! implementation lives in the `conduit` crate; tests plug in their own.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Future returned by [`HttpClient::send`].
pub type SendFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Executes one HTTP round trip.
///
/// Implementations must be safe to share between concurrent calls. Cancellation is
/// handled by the caller dropping the returned future.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use conduit_core::{HttpClient, Request, Response, SendFuture};
///
/// struct Canned;
///
/// impl HttpClient for Canned {
///     fn send(&self, _request: Request) -> SendFuture {
///         Box::pin(async { Ok(Response::new(200, HashMap::new(), r#"{"sum":5}"#.into())) })
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Send the request and return the response head with a lazily read body.
    fn send(&self, request: Request) -> SendFuture;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn send(&self, request: Request) -> SendFuture {
        (**self).send(request)
    }
}
