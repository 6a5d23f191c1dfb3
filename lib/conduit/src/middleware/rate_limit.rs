//! Rate limiting middleware using governor.
//!
//! This middleware limits the rate of endpoint calls using a token bucket algorithm.

use std::num::NonZeroU32;
use std::sync::Arc;

use derive_more::{Display, Error};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::InMemoryState};

use crate::{BoxError, Endpoint, Middleware};

/// Type alias for the governor rate limiter.
type GovernorLimiter = RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>;

/// Returned by [`RateLimit::erroring`] when no capacity is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("rate limit exceeded")]
pub struct RateLimited;

/// Token bucket shared by every endpoint it is applied to.
///
/// # Example
///
/// ```ignore
/// use std::num::NonZeroU32;
/// use conduit::middleware::RateLimit;
///
/// // Allow 10 calls per second, rejecting the rest
/// let limit = RateLimit::per_second(NonZeroU32::new(10).unwrap());
/// let endpoint = client.endpoint().with(limit.erroring());
/// ```
#[derive(Debug, Clone)]
pub struct RateLimit {
    limiter: Arc<GovernorLimiter>,
}

impl RateLimit {
    /// Allow `count` calls per second.
    #[must_use]
    pub fn per_second(count: NonZeroU32) -> Self {
        Self::with_quota(Quota::per_second(count))
    }

    /// Allow `count` calls per minute.
    #[must_use]
    pub fn per_minute(count: NonZeroU32) -> Self {
        Self::with_quota(Quota::per_minute(count))
    }

    /// Use a custom quota.
    #[must_use]
    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Middleware rejecting calls with [`RateLimited`] when the bucket is empty.
    ///
    /// Rejected calls never reach the wrapped endpoint.
    pub fn erroring<Req, Resp>(&self) -> impl Middleware<Req, Resp> + use<Req, Resp>
    where
        Req: Send + 'static,
        Resp: Send + 'static,
    {
        let limiter = Arc::clone(&self.limiter);
        move |next: Endpoint<Req, Resp>| {
            let limiter = Arc::clone(&limiter);
            Endpoint::<Req, Resp>::new(move |ctx, request| {
                let next = next.clone();
                let allowed = limiter.check().is_ok();
                async move {
                    if !allowed {
                        return Err(BoxError::from(RateLimited));
                    }
                    next.call(ctx, request).await
                }
            })
        }
    }

    /// Middleware waiting for capacity before delegating.
    ///
    /// Gives up with the context error if the call context is done first.
    pub fn delaying<Req, Resp>(&self) -> impl Middleware<Req, Resp> + use<Req, Resp>
    where
        Req: Send + 'static,
        Resp: Send + 'static,
    {
        let limiter = Arc::clone(&self.limiter);
        move |next: Endpoint<Req, Resp>| {
            let limiter = Arc::clone(&limiter);
            Endpoint::<Req, Resp>::new(move |ctx, request| {
                let next = next.clone();
                let limiter = Arc::clone(&limiter);
                async move {
                    tokio::select! {
                        biased;
                        reason = ctx.done() => return Err(BoxError::from(reason)),
                        () = limiter.until_ready() => {}
                    }
                    next.call(ctx, request).await
                }
            })
        }
    }
}
