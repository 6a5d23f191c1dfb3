//! Endpoint call logging.
//!
//! This middleware logs every endpoint call using the `tracing` crate.

use std::time::Instant;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::{Endpoint, Error, Middleware, find_error};

/// Middleware logging each call of the endpoint `name`.
///
/// Each call runs inside an `endpoint` span. Success is logged at info level,
/// failure at warn level together with the failing transport stage when there is one.
/// The outcome is passed through untouched.
///
/// # Example
///
/// ```ignore
/// use conduit::middleware::logging;
///
/// let endpoint = client.endpoint().with(logging("sum"));
/// ```
pub fn logging<Req, Resp>(name: &'static str) -> impl Middleware<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    move |next: Endpoint<Req, Resp>| {
        Endpoint::<Req, Resp>::new(move |ctx, request| {
            let next = next.clone();
            let span = info_span!("endpoint", endpoint = name);

            async move {
                let start = Instant::now();
                debug!("calling endpoint");

                let result = next.call(ctx, request).await;

                // Saturating conversion to u64
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(_) => info!(elapsed_ms, "endpoint call succeeded"),
                    Err(err) => match find_error(&**err).map(Error::domain) {
                        Some(domain) => {
                            warn!(error = %err, %domain, elapsed_ms, "endpoint call failed");
                        }
                        None => warn!(error = %err, elapsed_ms, "endpoint call failed"),
                    },
                }

                result
            }
            .instrument(span)
        })
    }
}
