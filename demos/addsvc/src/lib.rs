//! Adding service built on conduit endpoints.
//!
//! Layers, from the inside out:
//! - [`service`]: the business interface, a basic implementation and service middleware
//! - [`endpoints`]: one [`Endpoint`](conduit::Endpoint) per method, with the error
//!   channel classification
//! - [`transport`]: the HTTP client binding of those endpoints

pub mod endpoints;
pub mod service;
pub mod transport;

pub use endpoints::{
    ConcatRequest, ConcatResponse, Endpoints, SumRequest, SumResponse, make_concat_endpoint,
    make_sum_endpoint,
};
pub use service::{
    BasicService, MAX_LEN, Middleware, Result, Service, ServiceError, instrumenting_middleware,
    logging_middleware, new_basic_service,
};
pub use transport::new_http_client;
