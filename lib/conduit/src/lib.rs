//! Endpoints, middleware and an HTTP client transport for Rust services.
//!
//! Every remote or local operation is exposed as an [`Endpoint`]: a function from a
//! [`Context`] and a request to a response or an error. Cross-cutting behavior is
//! layered on with [`Middleware`], and a transport [`Client`] turns an HTTP round
//! trip into an endpoint.
//!
//! # Example
//!
//! ```ignore
//! use conduit::prelude::*;
//! use conduit::middleware::{logging, timeout};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct SumReply {
//!     sum: i64,
//! }
//!
//! let client = Client::builder(
//!     "GET",
//!     "http://localhost:8080/sum".parse()?,
//!     |_ctx: &Context, request: &mut Request, (a, b): (i64, i64)| {
//!         request.append_query("a", &a.to_string());
//!         request.append_query("b", &b.to_string());
//!         Ok(())
//!     },
//!     |_ctx: Context, response: Response| async move {
//!         let reply: SumReply = response.error_for_status().await?.json().await?;
//!         Ok::<_, BoxError>(reply.sum)
//!     },
//! )
//! .build();
//!
//! let sum = client
//!     .endpoint()
//!     .with(Chain::new().with(logging("sum")).with(timeout(Duration::from_secs(1))))
//!     .call(Context::background(), (2, 3))
//!     .await?;
//! assert_eq!(sum, 5);
//! ```

mod client;
mod config;
mod connector;
pub mod hooks;
mod hyper_client;
pub mod middleware;
pub mod prelude;
mod sink;

pub use client::{
    Client, ClientBuilder, DecodeFuture, DecodeResponseFn, EncodeRequestFn, RequestFn,
};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_USER_AGENT};
pub use hyper_client::{HyperClient, HyperClientBuilder};
pub use sink::{MetricsCounter, TracingLogger};

// Re-export core types
pub use conduit_core::{
    AtomicCounter, BoxError, Chain, ContentType, Context, ContextError, Counter, Domain, Endpoint,
    EndpointFuture, Error, HttpClient, HttpError, Logger, Method, Middleware, NopLogger, Request,
    Response, ResponseBody, Result, SendFuture, find_error, from_json, to_form, to_json,
    to_query_string,
};

// Re-export http types for status codes and headers
pub use conduit_core::{StatusCode, header};

// Re-export crates used in public signatures
pub use tower;
pub use url;
