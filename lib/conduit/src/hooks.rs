//! Pre-request hooks.
//!
//! A hook runs after encoding and before the network call. It may mutate the
//! outgoing [`Request`] and returns the [`Context`] the rest of the call continues
//! with. Register hooks with [`ClientBuilder::before`](crate::ClientBuilder::before).
//!
//! # Example
//!
//! ```ignore
//! use conduit::hooks::{bearer_auth, set_header};
//!
//! let client = Client::builder("GET", target, encode, decode)
//!     .before(set_header("X-Client", "billing"))
//!     .before(bearer_auth("my-secret-token"))
//!     .build();
//! ```

use std::sync::Arc;

use base64::Engine;

use crate::{Context, Request, header};

/// Hook setting `name` to `value` on every request.
pub fn set_header(
    name: impl Into<String>,
    value: impl Into<String>,
) -> impl Fn(Context, &mut Request) -> Context + Send + Sync + 'static {
    let name: Arc<str> = Arc::from(name.into());
    let value: Arc<str> = Arc::from(value.into());
    move |ctx: Context, request: &mut Request| {
        request.set_header(&*name, &*value);
        ctx
    }
}

/// Hook adding an `Authorization: Bearer <token>` header.
pub fn bearer_auth(
    token: impl AsRef<str>,
) -> impl Fn(Context, &mut Request) -> Context + Send + Sync + 'static {
    set_header(
        header::AUTHORIZATION.as_str(),
        format!("Bearer {}", token.as_ref()),
    )
}

/// Hook adding an `Authorization: Basic <base64(username:password)>` header.
pub fn basic_auth(
    username: impl AsRef<str>,
    password: impl AsRef<str>,
) -> impl Fn(Context, &mut Request) -> Context + Send + Sync + 'static {
    let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    set_header(header::AUTHORIZATION.as_str(), format!("Basic {encoded}"))
}
