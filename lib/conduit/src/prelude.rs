//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use conduit::prelude::*;
//! ```

pub use crate::{
    BoxError, Chain, Client, ClientBuilder, ClientConfig, Context, ContextError, Domain, Endpoint,
    Error, HttpClient, HttpError, HyperClient, Middleware, Request, Response, ResponseBody,
    StatusCode, find_error, header,
};
pub use std::time::Duration;
