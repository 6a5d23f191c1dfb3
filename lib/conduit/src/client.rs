//! HTTP transport client.
//!
//! A [`Client`] binds one remote operation: an HTTP method, a target URL, an encode
//! function and a decode function. [`Client::endpoint`] turns it into an
//! [`Endpoint`] backed by a real network call.
//!
//! Every call runs the same pipeline, and a failure is tagged with the stage that
//! produced it:
//!
//! | Stage | Domain |
//! |-------|--------|
//! | build the empty request | [`Domain::NewRequest`] |
//! | encode the domain request | [`Domain::Encode`] |
//! | pre-request hooks | cannot fail |
//! | network round trip | [`Domain::Do`] |
//! | decode the response | [`Domain::Decode`] |

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use url::Url;

use crate::{
    BoxError, Context, Domain, Endpoint, Error, HttpClient, HyperClient, Request, Response,
};

/// Populates the outgoing request from the domain request.
pub type EncodeRequestFn<Req> =
    dyn Fn(&Context, &mut Request, Req) -> Result<(), BoxError> + Send + Sync;

/// Future returned by a decode function.
pub type DecodeFuture<Resp> = Pin<Box<dyn Future<Output = Result<Resp, BoxError>> + Send>>;

/// Turns the raw response into the domain response.
pub type DecodeResponseFn<Resp> = dyn Fn(Context, Response) -> DecodeFuture<Resp> + Send + Sync;

/// Pre-request hook: may mutate the request and returns the context to carry on with.
pub type RequestFn = dyn Fn(Context, &mut Request) -> Context + Send + Sync;

/// Client for a single remote operation.
///
/// Configuration is fixed at construction; the client and every endpoint it
/// produces can be shared across concurrent calls.
///
/// # Example
///
/// ```ignore
/// use conduit::{BoxError, Client, Context, Request, Response};
///
/// let client = Client::builder(
///     "GET",
///     "http://svc/sum".parse()?,
///     |_ctx: &Context, request: &mut Request, (a, b): (i32, i32)| {
///         request.append_query("a", &a.to_string());
///         request.append_query("b", &b.to_string());
///         Ok(())
///     },
///     |_ctx: Context, response: Response| async move {
///         let body: SumBody = response.error_for_status().await?.json().await?;
///         Ok::<_, BoxError>(body.sum)
///     },
/// )
/// .build();
///
/// let sum = client.endpoint().call(Context::background(), (2, 3)).await?;
/// assert_eq!(sum, 5);
/// ```
pub struct Client<Req, Resp> {
    inner: Arc<Inner<Req, Resp>>,
}

struct Inner<Req, Resp> {
    http: Arc<dyn HttpClient>,
    method: String,
    target: Url,
    encode: Box<EncodeRequestFn<Req>>,
    decode: Box<DecodeResponseFn<Resp>>,
    before: Vec<Arc<RequestFn>>,
    buffered_stream: bool,
}

impl<Req, Resp> Clone for Client<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Req, Resp> std::fmt::Debug for Client<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("method", &self.inner.method)
            .field("target", &self.inner.target.as_str())
            .field("before_count", &self.inner.before.len())
            .field("buffered_stream", &self.inner.buffered_stream)
            .finish_non_exhaustive()
    }
}

impl<Req: Send + 'static, Resp: Send + 'static> Client<Req, Resp> {
    /// Start building a client for `method` on `target`.
    ///
    /// The method text is validated on each call, at the request construction stage.
    pub fn builder<E, D, Fut>(
        method: impl Into<String>,
        target: Url,
        encode: E,
        decode: D,
    ) -> ClientBuilder<Req, Resp>
    where
        E: Fn(&Context, &mut Request, Req) -> Result<(), BoxError> + Send + Sync + 'static,
        D: Fn(Context, Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, BoxError>> + Send + 'static,
    {
        ClientBuilder {
            http: None,
            method: method.into(),
            target,
            encode: Box::new(encode),
            decode: Box::new(move |ctx, response| -> DecodeFuture<Resp> {
                Box::pin(decode(ctx, response))
            }),
            before: Vec::new(),
            buffered_stream: false,
        }
    }

    /// An endpoint invoking the remote operation.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint<Req, Resp> {
        let inner = Arc::clone(&self.inner);
        Endpoint::new(move |ctx, request| {
            let inner = Arc::clone(&inner);
            async move { inner.invoke(ctx, request).await.map_err(BoxError::from) }
        })
    }

    /// The configured HTTP method text.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.inner.method
    }

    /// The target URL.
    #[must_use]
    pub fn target(&self) -> &Url {
        &self.inner.target
    }

    /// Whether response bodies are left open after a call returns.
    #[must_use]
    pub fn is_buffered_stream(&self) -> bool {
        self.inner.buffered_stream
    }
}

impl<Req, Resp> Inner<Req, Resp> {
    async fn invoke(&self, ctx: Context, request: Req) -> Result<Resp, Error> {
        let ctx = ctx.child();
        let _cancel = ctx.cancel_on_drop();

        let mut outgoing = Request::new(&self.method, self.target.clone())
            .map_err(|err| Error::new(Domain::NewRequest, err))?;

        (self.encode)(&ctx, &mut outgoing, request).map_err(|err| Error::new(Domain::Encode, err))?;

        let ctx = self
            .before
            .iter()
            .fold(ctx, |ctx, hook| hook(ctx, &mut outgoing));

        let response = tokio::select! {
            biased;
            reason = ctx.done() => return Err(Error::new(Domain::Do, reason)),
            result = self.http.send(outgoing) => {
                result.map_err(|err| Error::new(Domain::Do, err))?
            }
        };

        // Buffered-stream mode hands the open body over to the decoder.
        let _close = (!self.buffered_stream).then(|| response.body().close_on_drop());

        (self.decode)(ctx, response)
            .await
            .map_err(|err| Error::new(Domain::Decode, err))
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder<Req, Resp> {
    http: Option<Arc<dyn HttpClient>>,
    method: String,
    target: Url,
    encode: Box<EncodeRequestFn<Req>>,
    decode: Box<DecodeResponseFn<Resp>>,
    before: Vec<Arc<RequestFn>>,
    buffered_stream: bool,
}

impl<Req, Resp> std::fmt::Debug for ClientBuilder<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("method", &self.method)
            .field("target", &self.target.as_str())
            .field("custom_http_client", &self.http.is_some())
            .field("before_count", &self.before.len())
            .field("buffered_stream", &self.buffered_stream)
            .finish_non_exhaustive()
    }
}

impl<Req, Resp> ClientBuilder<Req, Resp> {
    /// Use `http` to execute requests instead of a fresh [`HyperClient`].
    #[must_use]
    pub fn http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Append a pre-request hook.
    ///
    /// Hooks run in the order they are added, after encoding and before the network call.
    #[must_use]
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(Context, &mut Request) -> Context + Send + Sync + 'static,
    {
        self.before.push(Arc::new(hook));
        self
    }

    /// Leave the response body open after the call returns.
    ///
    /// The decoder (or whoever it hands the body to) is then responsible for
    /// reading or closing it.
    #[must_use]
    pub fn buffered_stream(mut self, buffered: bool) -> Self {
        self.buffered_stream = buffered;
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> Client<Req, Resp> {
        let http = self
            .http
            .unwrap_or_else(|| Arc::new(HyperClient::new()) as Arc<dyn HttpClient>);

        Client {
            inner: Arc::new(Inner {
                http,
                method: self.method,
                target: self.target,
                encode: self.encode,
                decode: self.decode,
                before: self.before,
                buffered_stream: self.buffered_stream,
            }),
        }
    }
}
