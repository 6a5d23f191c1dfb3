//! Endpoint metrics using the metrics crate facade.
//!
//! Records per-endpoint call metrics using the `metrics` crate, which allows
//! integration with various metrics backends (Prometheus, `StatsD`, etc.).

use std::time::Instant;

use crate::{Endpoint, Middleware};

/// Labels used for metrics.
const LABEL_ENDPOINT: &str = "endpoint";
const LABEL_OUTCOME: &str = "outcome";

/// Metric names.
const METRIC_CALLS_TOTAL: &str = "conduit_endpoint_calls_total";
const METRIC_CALL_DURATION: &str = "conduit_endpoint_duration_seconds";

/// Middleware recording metrics for the endpoint `name`.
///
/// Records the following metrics:
/// - `conduit_endpoint_calls_total` (counter): calls, labeled by endpoint and outcome
///   (`success` or `error`)
/// - `conduit_endpoint_duration_seconds` (histogram): call duration, labeled by endpoint
///
/// Nothing is recorded until a recorder is installed by the application.
pub fn metrics<Req, Resp>(name: &'static str) -> impl Middleware<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    move |next: Endpoint<Req, Resp>| {
        Endpoint::<Req, Resp>::new(move |ctx, request| {
            let next = next.clone();
            async move {
                let start = Instant::now();
                let result = next.call(ctx, request).await;

                metrics::histogram!(METRIC_CALL_DURATION, LABEL_ENDPOINT => name)
                    .record(start.elapsed().as_secs_f64());

                let outcome = if result.is_ok() { "success" } else { "error" };
                metrics::counter!(
                    METRIC_CALLS_TOTAL,
                    LABEL_ENDPOINT => name,
                    LABEL_OUTCOME => outcome
                )
                .increment(1);

                result
            }
        })
    }
}
