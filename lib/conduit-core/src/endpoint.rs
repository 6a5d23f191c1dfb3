//! Endpoints and endpoint middleware.
//!
//! An [`Endpoint`] is the uniform shape of any operation: it takes a [`Context`] and a
//! request, and resolves to a response or a [`BoxError`]. A [`Middleware`] turns an
//! endpoint into another endpoint with the very same signature, so decorators stack
//! freely.
//!
//! # Example
//!
//! ```
//! use conduit_core::{Chain, Context, Endpoint};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let double = Endpoint::new(|_ctx: Context, n: u32| async move { Ok(n * 2) });
//!
//! let plus_one = |next: Endpoint<u32, u32>| {
//!     Endpoint::new(move |ctx, n: u32| {
//!         let next = next.clone();
//!         async move { next.call(ctx, n + 1).await }
//!     })
//! };
//!
//! let endpoint = double.with(Chain::new().with(plus_one));
//! assert_eq!(endpoint.call(Context::background(), 2).await.unwrap(), 6);
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;

use tower_service::Service;

use crate::{BoxError, Context};

/// Future returned by an endpoint call.
pub type EndpointFuture<Resp> =
    Pin<Box<dyn Future<Output = Result<Resp, BoxError>> + Send + 'static>>;

/// A callable operation: `(context, request) -> response | error`.
///
/// Endpoints hold no per-call state; a clone shares the same underlying function,
/// and any number of calls may run concurrently.
pub struct Endpoint<Req, Resp> {
    inner: Arc<dyn Fn(Context, Req) -> EndpointFuture<Resp> + Send + Sync>,
}

impl<Req, Resp> Clone for Endpoint<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Req, Resp> std::fmt::Debug for Endpoint<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint").finish_non_exhaustive()
    }
}

impl<Req: 'static, Resp: 'static> Endpoint<Req, Resp> {
    /// Create an endpoint from an async function.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, BoxError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |ctx: Context, request: Req| -> EndpointFuture<Resp> {
                Box::pin(f(ctx, request))
            }),
        }
    }

    /// Create an endpoint from a tower service taking `(Context, Req)`.
    ///
    /// Each call drives readiness on its own clone of `service`.
    pub fn from_service<S>(service: S) -> Self
    where
        S: Service<(Context, Req), Response = Resp> + Clone + Send + Sync + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send + 'static,
        Req: Send,
    {
        Self::new(move |ctx, request| {
            let mut service = service.clone();
            async move {
                std::future::poll_fn(|cx| service.poll_ready(cx))
                    .await
                    .map_err(Into::into)?;
                service.call((ctx, request)).await.map_err(Into::into)
            }
        })
    }

    /// Invoke the endpoint.
    pub fn call(&self, ctx: Context, request: Req) -> EndpointFuture<Resp> {
        (self.inner)(ctx, request)
    }

    /// Wrap this endpoint with `middleware`.
    #[must_use]
    pub fn with(self, middleware: impl Middleware<Req, Resp>) -> Self {
        middleware.wrap(self)
    }
}

impl<Req: 'static, Resp: 'static> Service<(Context, Req)> for Endpoint<Req, Resp> {
    type Response = Resp;
    type Error = BoxError;
    type Future = EndpointFuture<Resp>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), BoxError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, (ctx, request): (Context, Req)) -> Self::Future {
        Endpoint::call(self, ctx, request)
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Turns an endpoint into another endpoint of the same signature.
///
/// A middleware may rewrite the request or the context before delegating, rewrite
/// the outcome afterwards, or answer without delegating at all.
/// Any `Fn(Endpoint) -> Endpoint` closure is a middleware.
pub trait Middleware<Req, Resp>: Send + Sync {
    /// Wrap `next`, returning the decorated endpoint.
    fn wrap(&self, next: Endpoint<Req, Resp>) -> Endpoint<Req, Resp>;
}

impl<F, Req, Resp> Middleware<Req, Resp> for F
where
    F: Fn(Endpoint<Req, Resp>) -> Endpoint<Req, Resp> + Send + Sync,
{
    fn wrap(&self, next: Endpoint<Req, Resp>) -> Endpoint<Req, Resp> {
        self(next)
    }
}

/// Ordered stack of middleware.
///
/// The first middleware added is the outermost: it sees the request first and the
/// outcome last. `Chain::new().with(m1).with(m2)` wraps `e` as `m1(m2(e))`.
pub struct Chain<Req, Resp> {
    layers: Vec<Arc<dyn Middleware<Req, Resp>>>,
}

impl<Req, Resp> Chain<Req, Resp> {
    /// An empty chain; wrapping with it returns the endpoint unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a middleware, inside the ones already added.
    #[must_use]
    pub fn with(mut self, middleware: impl Middleware<Req, Resp> + 'static) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Number of middleware in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the chain holds no middleware.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl<Req, Resp> Default for Chain<Req, Resp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> Clone for Chain<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            layers: self.layers.clone(),
        }
    }
}

impl<Req, Resp> std::fmt::Debug for Chain<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl<Req, Resp> Middleware<Req, Resp> for Chain<Req, Resp> {
    fn wrap(&self, next: Endpoint<Req, Resp>) -> Endpoint<Req, Resp> {
        self.layers
            .iter()
            .rev()
            .fold(next, |next, middleware| middleware.wrap(next))
    }
}
