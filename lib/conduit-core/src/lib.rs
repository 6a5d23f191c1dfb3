//! Core contracts for conduit.
//!
//! This crate provides the foundational types used by conduit:
//! - [`Context`] - Cancellable call context with deadline and typed values
//! - [`Endpoint`], [`Middleware`] and [`Chain`] - Uniform operations and their decorators
//! - [`Error`] and [`Domain`] - Transport failures tagged by pipeline stage
//! - [`HttpError`] - Concrete causes raised by the HTTP plumbing
//! - [`Request`] and [`Response`] - HTTP request/response types
//! - [`HttpClient`] - Network execution seam used by the transport client
//! - [`Logger`] and [`Counter`] - Observation sinks for service middleware

mod body;
mod client;
mod context;
mod endpoint;
mod error;
mod method;
mod observe;
mod request;
mod response;

pub use body::{ContentType, from_json, to_form, to_json, to_query_string};
pub use client::{HttpClient, SendFuture};
pub use context::{Context, ContextError};
pub use endpoint::{Chain, Endpoint, EndpointFuture, Middleware};
pub use error::{BoxError, Domain, Error, HttpError, Result, find_error};
pub use method::Method;
pub use observe::{AtomicCounter, Counter, Logger, NopLogger};
pub use request::Request;
pub use response::{Response, ResponseBody};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
