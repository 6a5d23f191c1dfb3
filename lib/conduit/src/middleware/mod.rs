//! Endpoint middleware library.
//!
//! Every item here produces a [`Middleware`](crate::Middleware): a function from an
//! [`Endpoint`](crate::Endpoint) to another endpoint of the same signature. Stack
//! them with [`Chain`](crate::Chain); the first middleware added is the outermost.
//!
//! # Available Middleware
//!
//! - [`logging`] - Logs each call using `tracing`
//! - [`metrics`] - Records call counts and durations using the `metrics` facade
//! - [`RateLimit`] - Limits the call rate using a token bucket (`governor`)
//! - [`timeout`] - Puts a deadline on the call context
//! - [`layer`] - Adapts any `tower::Layer` (e.g. [`ConcurrencyLimitLayer`])
//!
//! # Example
//!
//! ```ignore
//! use std::num::NonZeroU32;
//! use std::time::Duration;
//!
//! use conduit::Chain;
//! use conduit::middleware::{ConcurrencyLimitLayer, RateLimit, layer, logging, timeout};
//!
//! let limit = RateLimit::per_second(NonZeroU32::new(10).unwrap());
//! let endpoint = client.endpoint().with(
//!     Chain::new()
//!         .with(logging("sum"))
//!         .with(limit.erroring())
//!         .with(layer(ConcurrencyLimitLayer::new(4)))
//!         .with(timeout(Duration::from_secs(2))),
//! );
//! ```

mod logging;
mod metrics;
mod rate_limit;
mod timeout;
mod tower_layer;

pub use logging::logging;
pub use self::metrics::metrics;
pub use rate_limit::{RateLimit, RateLimited};
pub use timeout::timeout;
pub use tower_layer::layer;

// Re-export tower types for convenience
pub use tower::Layer;
pub use tower::limit::ConcurrencyLimitLayer;
