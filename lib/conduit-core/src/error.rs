//! Error types for conduit.
//!
//! Two layers of errors live here:
//! - [`Error`] tags a failed endpoint invocation with the [`Domain`] (pipeline stage)
//!   that produced it, wrapping whatever the stage returned.
//! - [`HttpError`] holds the concrete causes produced by the HTTP plumbing itself
//!   (request construction, codecs, network, body reads).

use derive_more::{Display, Error, From};

/// Boxed, thread-safe error used at every endpoint boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using [`HttpError`].
pub type Result<T> = std::result::Result<T, HttpError>;

// ============================================================================
// Domain Taxonomy
// ============================================================================

/// Pipeline stage of a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Domain {
    /// Building the outgoing request object.
    #[display("NewRequest")]
    NewRequest,
    /// Populating the outgoing request from the domain request.
    #[display("Encode")]
    Encode,
    /// Executing the network round trip.
    #[display("Do")]
    Do,
    /// Interpreting the response.
    #[display("Decode")]
    Decode,
}

impl Domain {
    /// All domains, in pipeline order.
    pub const ALL: [Self; 4] = [Self::NewRequest, Self::Encode, Self::Do, Self::Decode];
}

/// A failed transport call, tagged with the stage that failed.
///
/// Exactly one domain is attached; stages after the failing one never ran.
#[derive(Debug, Display)]
#[display("{domain}: {source}")]
pub struct Error {
    domain: Domain,
    source: BoxError,
}

impl Error {
    /// Wrap a cause with its domain.
    pub fn new(domain: Domain, source: impl Into<BoxError>) -> Self {
        Self {
            domain,
            source: source.into(),
        }
    }

    /// The stage that failed.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// Returns `true` if this error was produced by `domain`.
    #[must_use]
    pub fn is_domain(&self, domain: Domain) -> bool {
        self.domain == domain
    }

    /// The underlying cause.
    #[must_use]
    pub fn source_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Downcast the underlying cause.
    #[must_use]
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        self.source.downcast_ref()
    }

    /// Consume into the underlying cause.
    #[must_use]
    pub fn into_source(self) -> BoxError {
        self.source
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Find the transport [`Error`] inside an endpoint failure.
///
/// Middleware may wrap the transport error, so the whole `source()` chain is searched.
#[must_use]
pub fn find_error<'a>(error: &'a (dyn std::error::Error + 'static)) -> Option<&'a Error> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<Error>() {
            return Some(found);
        }
        current = err.source();
    }
    None
}

// ============================================================================
// HTTP Error Causes
// ============================================================================

/// Concrete failures raised by the HTTP plumbing.
#[derive(Debug, Display, Error, From)]
pub enum HttpError {
    /// Method text that is not a supported HTTP method.
    #[display("invalid HTTP method: {_0}")]
    #[from(skip)]
    InvalidMethod(#[error(not(source))] String),

    /// Target URL with a scheme other than `http` or `https`.
    #[display("unsupported URL scheme: {_0}")]
    #[from(skip)]
    UnsupportedScheme(#[error(not(source))] String),

    /// Request that cannot be turned into a wire request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// Unexpected (non-2xx) status code.
    #[display("unexpected HTTP status {status}")]
    #[from(skip)]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if it could be read.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Failure while reading the response body.
    #[display("body error: {_0}")]
    #[from(skip)]
    Body(#[error(not(source))] String),

    /// Read attempted after the response body was closed.
    #[display("response body closed")]
    #[from(skip)]
    BodyClosed,

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Form URL-encoded serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_urlencoded::ser::Error),

    /// Query string serialization error.
    #[display("query serialization error: {_0}")]
    #[from]
    QuerySerialization(serde_html_form::ser::Error),
}

impl HttpError {
    /// Create an unexpected-status error.
    #[must_use]
    pub fn status(status: u16, body: Option<bytes::Bytes>) -> Self {
        Self::Status { status, body }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a body read error.
    #[must_use]
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the HTTP status code if this is an unexpected-status error.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_some_and(|s| (500..600).contains(&s))
    }
}
