//! HTTP response handling.
//!
//! [`Response`] gives access to status and headers, and a [`ResponseBody`] that is
//! read lazily. The body can be closed from the outside: the transport client closes
//! it when a call returns, unless the client runs in buffered-stream mode.
//!
//! # Example
//!
//! ```ignore
//! let sum: SumResponse = response.error_for_status().await?.json().await?;
//! ```

use std::collections::HashMap;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{BoxError, HttpError, Result};

// ============================================================================
// Response Body
// ============================================================================

/// Lazily read response body with a close signal.
///
/// Once closed, the underlying stream is released and every further read yields
/// [`HttpError::BodyClosed`].
pub struct ResponseBody {
    inner: Option<UnsyncBoxBody<Bytes, BoxError>>,
    closed: CancellationToken,
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBody")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ResponseBody {
    /// Wrap any body producing [`Bytes`] frames.
    pub fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self {
            inner: Some(body.map_err(Into::into).boxed_unsync()),
            closed: CancellationToken::new(),
        }
    }

    /// An empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(Bytes::new())
    }

    /// Close the body, releasing the underlying stream on the next poll.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Guard that closes the body when dropped.
    #[must_use]
    pub fn close_on_drop(&self) -> DropGuard {
        self.closed.clone().drop_guard()
    }

    /// Returns `true` once the body has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Read the remaining body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(BodyExt::collect(self).await?.to_bytes())
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::new(http_body_util::Full::new(bytes))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(text: &'static str) -> Self {
        Self::from(Bytes::from_static(text.as_bytes()))
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        Self::from(Bytes::from(text))
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = HttpError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<std::result::Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.closed.is_cancelled() {
            this.inner = None;
            return Poll::Ready(Some(Err(HttpError::BodyClosed)));
        }
        match this.inner.as_mut() {
            Some(inner) => Pin::new(inner)
                .poll_frame(cx)
                .map_err(|err| HttpError::body(err.to_string())),
            None => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        !self.is_closed() && self.inner.as_ref().is_none_or(Body::is_end_stream)
    }

    fn size_hint(&self) -> SizeHint {
        self.inner
            .as_ref()
            .map_or_else(|| SizeHint::with_exact(0), Body::size_hint)
    }
}

// ============================================================================
// Response
// ============================================================================

/// HTTP response with status, headers, and body.
#[derive(Debug)]
pub struct Response<B = ResponseBody> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Mutable access to the body.
    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Transform the body with a function.
    pub fn map_body<F, B2>(self, f: F) -> Response<B2>
    where
        F: FnOnce(B) -> B2,
    {
        Response {
            status: self.status,
            headers: self.headers,
            body: f(self.body),
        }
    }
}

impl Response<ResponseBody> {
    /// Fail with [`HttpError::Status`] unless the status is 2xx.
    ///
    /// The error carries the body when it can be read, `None` for an empty body.
    pub async fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let status = self.status;
        let body = self.body.bytes().await.ok().filter(|body| !body.is_empty());
        Err(HttpError::status(status, body))
    }

    /// Read the whole body.
    pub async fn bytes(self) -> Result<Bytes> {
        self.body.bytes().await
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        crate::from_json(&bytes)
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|err| HttpError::body(err.to_string()))
    }
}
