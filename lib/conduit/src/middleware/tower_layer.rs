//! Adapter from `tower` layers to endpoint middleware.

use tower::{Layer, Service};

use crate::{BoxError, Context, Endpoint, Middleware};

/// Use a `tower::Layer` as endpoint middleware.
///
/// The layer wraps the endpoint seen as a `Service<(Context, Req)>`, and the layered
/// service is turned back into an endpoint. Readiness is driven on every call.
///
/// # Example
///
/// ```ignore
/// use conduit::middleware::{ConcurrencyLimitLayer, layer};
///
/// let endpoint = client.endpoint().with(layer(ConcurrencyLimitLayer::new(8)));
/// ```
pub fn layer<L, Req, Resp>(layer: L) -> impl Middleware<Req, Resp>
where
    L: Layer<Endpoint<Req, Resp>> + Send + Sync,
    L::Service: Service<(Context, Req), Response = Resp> + Clone + Send + Sync + 'static,
    <L::Service as Service<(Context, Req)>>::Error: Into<BoxError>,
    <L::Service as Service<(Context, Req)>>::Future: Send + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    move |next: Endpoint<Req, Resp>| Endpoint::from_service(layer.layer(next))
}
