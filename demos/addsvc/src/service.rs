//! Service definition, basic implementation and service middleware.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use conduit::{BoxError, Context, Counter, Logger};
use derive_more::Display;

/// Largest allowed concatenation result, in bytes.
pub const MAX_LEN: usize = 102_400;

/// Result type alias using [`ServiceError`].
pub type Result<T> = std::result::Result<T, ServiceError>;

/// A service that adds things together.
#[async_trait]
pub trait Service: Send + Sync {
    /// Add two integers.
    async fn sum(&self, ctx: Context, a: i32, b: i32) -> Result<i32>;

    /// Concatenate two strings.
    async fn concat(&self, ctx: Context, a: String, b: String) -> Result<String>;
}

/// Errors of the adding service.
///
/// Each business error states which channel the endpoint layer uses for it: a
/// condition meaning the service misbehaves goes through the endpoint error channel,
/// where failure-counting middleware sees it; an expected outcome is carried
/// inside the response value.
#[derive(Debug, Display)]
pub enum ServiceError {
    /// Business rule of `sum`. Expected outcome: carried in the response.
    #[display("can't sum two zeroes")]
    TwoZeroes,

    /// Overflow guard of `sum`. Goes through the error channel.
    #[display("integer overflow")]
    IntOverflow,

    /// Size guard of `concat`. Expected outcome: carried in the response.
    #[display("result exceeds maximum size")]
    MaxSizeExceeded,

    /// Error message received from a remote service that matches no known error.
    #[display("{_0}")]
    Remote(String),

    /// The call to a remote service failed.
    #[display("{_0}")]
    Transport(BoxError),
}

impl ServiceError {
    /// Rebuild an error from its message, as carried in a response body.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        match message {
            "can't sum two zeroes" => Self::TwoZeroes,
            "integer overflow" => Self::IntOverflow,
            "result exceeds maximum size" => Self::MaxSizeExceeded,
            other => Self::Remote(other.to_string()),
        }
    }

    /// Classify an endpoint failure: a service error is kept, anything else is transport.
    #[must_use]
    pub fn from_endpoint(err: BoxError) -> Self {
        match err.downcast::<Self>() {
            Ok(err) => *err,
            Err(err) => Self::Transport(err),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(&**err),
            _ => None,
        }
    }
}

// ============================================================================
// Basic Service
// ============================================================================

/// Naive, stateless implementation of [`Service`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicService;

#[async_trait]
impl Service for BasicService {
    async fn sum(&self, _ctx: Context, a: i32, b: i32) -> Result<i32> {
        if a == 0 && b == 0 {
            return Err(ServiceError::TwoZeroes);
        }
        a.checked_add(b).ok_or(ServiceError::IntOverflow)
    }

    async fn concat(&self, _ctx: Context, a: String, b: String) -> Result<String> {
        if a.len() + b.len() > MAX_LEN {
            return Err(ServiceError::MaxSizeExceeded);
        }
        Ok(a + &b)
    }
}

/// Create a basic service.
#[must_use]
pub fn new_basic_service() -> Arc<dyn Service> {
    Arc::new(BasicService)
}

// ============================================================================
// Service Middleware
// ============================================================================

/// Service (as opposed to endpoint) middleware.
pub type Middleware = Box<dyn Fn(Arc<dyn Service>) -> Arc<dyn Service> + Send + Sync>;

/// Middleware logging the parameters and result of each call.
///
/// Each call produces one record with `method`, the inputs, `result`, `error` and `took`.
#[must_use]
pub fn logging_middleware(logger: Arc<dyn Logger>) -> Middleware {
    Box::new(move |next: Arc<dyn Service>| -> Arc<dyn Service> {
        Arc::new(LoggingMiddleware {
            logger: Arc::clone(&logger),
            next,
        })
    })
}

struct LoggingMiddleware {
    logger: Arc<dyn Logger>,
    next: Arc<dyn Service>,
}

#[async_trait]
impl Service for LoggingMiddleware {
    async fn sum(&self, ctx: Context, a: i32, b: i32) -> Result<i32> {
        let begin = Instant::now();
        let result = self.next.sum(ctx, a, b).await;

        let value = result.as_ref().ok();
        let error = result.as_ref().err().map(ToString::to_string);
        self.logger.log(&[
            ("method", &"sum"),
            ("a", &a),
            ("b", &b),
            ("result", &value),
            ("error", &error),
            ("took", &begin.elapsed()),
        ]);
        result
    }

    async fn concat(&self, ctx: Context, a: String, b: String) -> Result<String> {
        let begin = Instant::now();
        let result = self.next.concat(ctx, a.clone(), b.clone()).await;

        let value = result.as_ref().ok();
        let error = result.as_ref().err().map(ToString::to_string);
        self.logger.log(&[
            ("method", &"concat"),
            ("a", &a),
            ("b", &b),
            ("result", &value),
            ("error", &error),
            ("took", &begin.elapsed()),
        ]);
        result
    }
}

/// Middleware counting integers summed and characters concatenated.
///
/// `ints` grows by the magnitude of each sum, `chars` by the byte length of each
/// concatenation. Failed calls carry no result and count nothing.
#[must_use]
pub fn instrumenting_middleware(ints: Arc<dyn Counter>, chars: Arc<dyn Counter>) -> Middleware {
    Box::new(move |next: Arc<dyn Service>| -> Arc<dyn Service> {
        Arc::new(InstrumentingMiddleware {
            ints: Arc::clone(&ints),
            chars: Arc::clone(&chars),
            next,
        })
    })
}

struct InstrumentingMiddleware {
    ints: Arc<dyn Counter>,
    chars: Arc<dyn Counter>,
    next: Arc<dyn Service>,
}

#[async_trait]
impl Service for InstrumentingMiddleware {
    async fn sum(&self, ctx: Context, a: i32, b: i32) -> Result<i32> {
        let result = self.next.sum(ctx, a, b).await;
        if let Ok(v) = &result {
            self.ints.add(u64::from(v.unsigned_abs()));
        }
        result
    }

    async fn concat(&self, ctx: Context, a: String, b: String) -> Result<String> {
        let result = self.next.concat(ctx, a, b).await;
        if let Ok(v) = &result {
            self.chars.add(u64::try_from(v.len()).unwrap_or(u64::MAX));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[tokio::test]
    async fn sum_rules() {
        let svc = BasicService;

        check!(svc.sum(Context::background(), 2, 3).await.ok() == Some(5));
        check!(svc.sum(Context::background(), 0, 7).await.ok() == Some(7));
        let_assert!(Err(ServiceError::TwoZeroes) = svc.sum(Context::background(), 0, 0).await);
        let_assert!(
            Err(ServiceError::IntOverflow) = svc.sum(Context::background(), i32::MAX, 1).await
        );
        let_assert!(
            Err(ServiceError::IntOverflow) = svc.sum(Context::background(), i32::MIN, -1).await
        );
        check!(svc.sum(Context::background(), i32::MAX, -1).await.ok() == Some(i32::MAX - 1));
    }

    #[tokio::test]
    async fn concat_size_limit() {
        let svc = BasicService;
        let half = "x".repeat(MAX_LEN / 2);

        let at_limit = svc
            .concat(Context::background(), half.clone(), half.clone())
            .await
            .expect("exactly at the limit");
        check!(at_limit.len() == MAX_LEN);

        let over = format!("{half}x");
        let_assert!(
            Err(ServiceError::MaxSizeExceeded) = svc.concat(Context::background(), half, over).await
        );
    }

    #[test]
    fn messages_round_trip() {
        for err in [
            ServiceError::TwoZeroes,
            ServiceError::IntOverflow,
            ServiceError::MaxSizeExceeded,
        ] {
            let message = err.to_string();
            check!(ServiceError::from_message(&message).to_string() == message);
        }
        let_assert!(ServiceError::Remote(message) = ServiceError::from_message("boom"));
        check!(message == "boom");
    }

    #[test]
    fn from_endpoint_keeps_service_errors() {
        let_assert!(
            ServiceError::IntOverflow = ServiceError::from_endpoint(ServiceError::IntOverflow.into())
        );
        let_assert!(ServiceError::Transport(err) = ServiceError::from_endpoint("refused".into()));
        check!(err.to_string() == "refused");
    }
}
