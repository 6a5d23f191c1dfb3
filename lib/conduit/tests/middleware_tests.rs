//! Integration tests for endpoint middleware stacked on a transport endpoint.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert2::{check, let_assert};
use conduit::middleware::{
    ConcurrencyLimitLayer, RateLimit, RateLimited, layer, logging, metrics, timeout,
};
use conduit::{
    BoxError, Chain, Client, Context, ContextError, Domain, Endpoint, Request, Response,
    find_error,
};
use url::Url;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::path};

fn ping_endpoint(server: &MockServer) -> Endpoint<(), String> {
    let url = Url::parse(&format!("{}/ping", server.uri())).expect("url");
    Client::builder(
        "GET",
        url,
        |_ctx: &Context, _request: &mut Request, (): ()| Ok(()),
        |_ctx: Context, response: Response| async move {
            Ok::<_, BoxError>(response.error_for_status().await?.text().await?)
        },
    )
    .build()
    .endpoint()
}

async fn pong_server(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(path("/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("pong")
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn full_stack_passes_the_response_through() {
    let server = pong_server(Duration::ZERO).await;
    let limit = RateLimit::per_second(NonZeroU32::new(100).expect("non-zero"));

    let endpoint = ping_endpoint(&server).with(
        Chain::new()
            .with(logging("ping"))
            .with(metrics("ping"))
            .with(limit.erroring())
            .with(layer(ConcurrencyLimitLayer::new(4)))
            .with(timeout(Duration::from_secs(5))),
    );

    let pong = endpoint.call(Context::background(), ()).await.expect("ping");
    check!(pong == "pong");
}

#[tokio::test]
async fn timeout_middleware_stops_a_slow_call() {
    let server = pong_server(Duration::from_secs(10)).await;
    let endpoint = ping_endpoint(&server).with(
        Chain::new()
            .with(logging("slow"))
            .with(timeout(Duration::from_millis(100))),
    );

    let err = endpoint
        .call(Context::background(), ())
        .await
        .expect_err("too slow");

    let_assert!(Some(transport) = find_error(err.as_ref()));
    check!(transport.domain() == Domain::Do);
    check!(transport.downcast_ref::<ContextError>() == Some(&ContextError::DeadlineExceeded));
}

#[tokio::test]
async fn rate_limit_short_circuits_before_the_network() {
    let server = MockServer::start().await;
    Mock::given(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .expect(1)
        .mount(&server)
        .await;

    let limit = RateLimit::per_minute(NonZeroU32::new(1).expect("non-zero"));
    let endpoint = ping_endpoint(&server).with(limit.erroring());

    endpoint.call(Context::background(), ()).await.expect("first");
    let err = endpoint
        .call(Context::background(), ())
        .await
        .expect_err("second is limited");

    check!(err.downcast_ref::<RateLimited>().is_some());
    check!(find_error(err.as_ref()).is_none());
}

#[tokio::test]
async fn chain_runs_outer_middleware_first() {
    let server = pong_server(Duration::ZERO).await;
    let trace = Arc::new(Mutex::new(Vec::new()));

    let tracing_layer = |label: &'static str| {
        let trace = Arc::clone(&trace);
        move |next: Endpoint<(), String>| {
            let trace = Arc::clone(&trace);
            Endpoint::new(move |ctx, request| {
                let next = next.clone();
                let trace = Arc::clone(&trace);
                async move {
                    trace.lock().expect("lock").push(format!("{label} in"));
                    let result = next.call(ctx, request).await;
                    trace.lock().expect("lock").push(format!("{label} out"));
                    result
                }
            })
        }
    };

    let endpoint = ping_endpoint(&server).with(
        Chain::new()
            .with(tracing_layer("outer"))
            .with(logging("ping"))
            .with(tracing_layer("inner")),
    );
    endpoint.call(Context::background(), ()).await.expect("ping");

    let trace = trace.lock().expect("lock").clone();
    check!(trace == ["outer in", "inner in", "inner out", "outer out"]);
}

#[tokio::test]
async fn middleware_can_rewrite_the_error() {
    let server = MockServer::start().await;
    Mock::given(path("/ping"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fallback = |next: Endpoint<(), String>| {
        Endpoint::new(move |ctx, request| {
            let next = next.clone();
            async move {
                let result = next.call(ctx, request).await;
                let decode_failed = result.as_ref().is_err_and(|err| {
                    find_error(&**err).is_some_and(|e| e.is_domain(Domain::Decode))
                });
                if decode_failed {
                    Ok("fallback".to_string())
                } else {
                    result
                }
            }
        })
    };

    let endpoint = ping_endpoint(&server).with(fallback);
    let value = endpoint.call(Context::background(), ()).await.expect("fallback");

    check!(value == "fallback");
}
