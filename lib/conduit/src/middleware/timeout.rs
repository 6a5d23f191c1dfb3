//! Deadline middleware.

use std::time::Duration;

use crate::{Endpoint, Middleware};

/// Middleware giving each call at most `duration` from the moment it enters.
///
/// The call context gets the deadline; an earlier deadline from the caller is kept.
/// Endpoints that watch their context (such as transport endpoints) stop with
/// [`ContextError::DeadlineExceeded`](crate::ContextError::DeadlineExceeded).
pub fn timeout<Req, Resp>(duration: Duration) -> impl Middleware<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    move |next: Endpoint<Req, Resp>| {
        Endpoint::<Req, Resp>::new(move |ctx, request| {
            next.call(ctx.with_timeout(duration), request)
        })
    }
}
