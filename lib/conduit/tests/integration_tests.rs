//! Integration tests for the transport `Client` using wiremock.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assert2::{check, let_assert};
use conduit::{
    BoxError, Client, ClientBuilder, Context, ContextError, Domain, Error, HttpClient, HttpError,
    HyperClient, Request, Response, ResponseBody, SendFuture, find_error,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use url::Url;
use wiremock::{
    Mock, MockServer, Respond, ResponseTemplate,
    matchers::{body_string, header, method, path, query_param},
};

#[derive(Debug, Clone, Copy, Serialize)]
struct SumRequest {
    a: i64,
    b: i64,
}

#[derive(Debug, Deserialize)]
struct SumReply {
    sum: i64,
}

fn target(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{route}", server.uri())).expect("url")
}

fn encode_sum(_ctx: &Context, request: &mut Request, sum: SumRequest) -> Result<(), BoxError> {
    request.set_query(&sum)?;
    Ok(())
}

async fn decode_sum(_ctx: Context, response: Response) -> Result<i64, BoxError> {
    let reply: SumReply = response.error_for_status().await?.json().await?;
    Ok(reply.sum)
}

fn sum_client(url: Url) -> ClientBuilder<SumRequest, i64> {
    Client::builder("GET", url, encode_sum, decode_sum)
}

fn transport_error(err: &BoxError) -> &Error {
    find_error(&**err).expect("transport error")
}

/// Answers `/sum?a=..&b=..` with the actual sum.
struct Adder;

impl Respond for Adder {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let total: i64 = request
            .url
            .query_pairs()
            .filter_map(|(_, value)| value.parse::<i64>().ok())
            .sum();
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "sum": total }))
    }
}

/// HTTP client counting calls and failing each one.
#[derive(Default)]
struct Unreachable {
    calls: AtomicUsize,
}

impl HttpClient for Unreachable {
    fn send(&self, _request: Request) -> SendFuture {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(HttpError::connection("unreachable")) })
    }
}

#[tokio::test]
async fn sum_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sum"))
        .and(query_param("a", "2"))
        .and(query_param("b", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"sum":5}"#))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = sum_client(target(&server, "/sum")).build().endpoint();
    let sum = endpoint
        .call(Context::background(), SumRequest { a: 2, b: 3 })
        .await
        .expect("sum");

    check!(sum == 5);
}

#[tokio::test]
async fn server_error_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/sum"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let endpoint = sum_client(target(&server, "/sum")).build().endpoint();
    let err = endpoint
        .call(Context::background(), SumRequest { a: 1, b: 1 })
        .await
        .expect_err("500 fails");

    let transport = transport_error(&err);
    check!(transport.domain() == Domain::Decode);
    let_assert!(Some(HttpError::Status { status, body }) = transport.downcast_ref::<HttpError>());
    check!(*status == 500);
    check!(body.is_none());
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/sum"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"sum":"five"}"#))
        .mount(&server)
        .await;

    let endpoint = sum_client(target(&server, "/sum")).build().endpoint();
    let err = endpoint
        .call(Context::background(), SumRequest { a: 2, b: 3 })
        .await
        .expect_err("bad body");

    let transport = transport_error(&err);
    check!(transport.domain() == Domain::Decode);
    let_assert!(
        Some(HttpError::JsonDeserialization { path, .. }) = transport.downcast_ref::<HttpError>()
    );
    check!(path == "sum");
}

#[tokio::test]
async fn encode_failure_skips_the_network() {
    let http = Arc::new(Unreachable::default());
    let endpoint = Client::builder(
        "POST",
        Url::parse("http://svc/concat").expect("url"),
        |_ctx: &Context, _request: &mut Request, _text: String| -> Result<(), BoxError> {
            Err("refusing to encode".into())
        },
        |_ctx: Context, response: Response| async move { Ok::<_, BoxError>(response.text().await?) },
    )
    .http_client(Arc::clone(&http) as Arc<dyn HttpClient>)
    .build()
    .endpoint();

    let err = endpoint
        .call(Context::background(), "abc".to_string())
        .await
        .expect_err("encode fails");

    let transport = transport_error(&err);
    check!(transport.domain() == Domain::Encode);
    check!(transport.to_string() == "Encode: refusing to encode");
    check!(http.calls.load(Ordering::SeqCst) == 0);
}

#[tokio::test]
async fn invalid_method_is_a_new_request_failure() {
    let http = Arc::new(Unreachable::default());
    let endpoint = Client::builder(
        "G E T",
        Url::parse("http://svc/sum").expect("url"),
        encode_sum,
        decode_sum,
    )
    .http_client(Arc::clone(&http) as Arc<dyn HttpClient>)
    .build()
    .endpoint();

    let err = endpoint
        .call(Context::background(), SumRequest { a: 1, b: 2 })
        .await
        .expect_err("bad method");

    let transport = transport_error(&err);
    check!(transport.domain() == Domain::NewRequest);
    let_assert!(Some(HttpError::InvalidMethod(_)) = transport.downcast_ref::<HttpError>());
    check!(http.calls.load(Ordering::SeqCst) == 0);
}

#[tokio::test]
async fn unsupported_scheme_is_a_new_request_failure() {
    let endpoint = sum_client(Url::parse("ftp://svc/sum").expect("url"))
        .http_client(Arc::new(Unreachable::default()))
        .build()
        .endpoint();

    let err = endpoint
        .call(Context::background(), SumRequest { a: 1, b: 2 })
        .await
        .expect_err("bad scheme");

    check!(transport_error(&err).domain() == Domain::NewRequest);
}

#[tokio::test]
async fn connection_refused_is_a_do_failure() {
    let endpoint = sum_client(Url::parse("http://127.0.0.1:1/sum").expect("url"))
        .http_client(Arc::new(
            HyperClient::builder()
                .connect_timeout(Duration::from_secs(2))
                .build(),
        ))
        .build()
        .endpoint();

    let err = endpoint
        .call(Context::background(), SumRequest { a: 1, b: 2 })
        .await
        .expect_err("nothing listens");

    let transport = transport_error(&err);
    check!(transport.domain() == Domain::Do);
    let_assert!(Some(http_error) = transport.downcast_ref::<HttpError>());
    check!(http_error.is_connection());
}

#[tokio::test]
async fn deadline_aborts_the_network_call() {
    let server = MockServer::start().await;
    Mock::given(path("/sum"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"sum":5}"#)
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let endpoint = sum_client(target(&server, "/sum")).build().endpoint();
    let ctx = Context::background().with_timeout(Duration::from_millis(100));

    let started = std::time::Instant::now();
    let err = endpoint
        .call(ctx, SumRequest { a: 2, b: 3 })
        .await
        .expect_err("deadline passes");

    check!(started.elapsed() < Duration::from_secs(5));
    let transport = transport_error(&err);
    check!(transport.domain() == Domain::Do);
    check!(transport.downcast_ref::<ContextError>() == Some(&ContextError::DeadlineExceeded));
}

#[tokio::test]
async fn caller_cancellation_aborts_the_network_call() {
    let server = MockServer::start().await;
    Mock::given(path("/sum"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"sum":5}"#)
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let endpoint = sum_client(target(&server, "/sum")).build().endpoint();
    let ctx = Context::background();
    let caller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        caller.cancel();
    });

    let err = endpoint
        .call(ctx, SumRequest { a: 2, b: 3 })
        .await
        .expect_err("canceled");

    let transport = transport_error(&err);
    check!(transport.domain() == Domain::Do);
    check!(transport.downcast_ref::<ContextError>() == Some(&ContextError::Canceled));
}

#[tokio::test]
async fn hooks_run_in_order_and_feed_the_decoder() {
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Tag(&'static str);

    let server = MockServer::start().await;
    Mock::given(path("/sum"))
        .and(header("x-first", "1"))
        .and(header("x-second", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"sum":3}"#))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = Client::builder(
        "GET",
        target(&server, "/sum"),
        encode_sum,
        |ctx: Context, response: Response| async move {
            let reply: SumReply = response.json().await?;
            let tag = ctx.value::<Tag>().cloned();
            Ok::<_, BoxError>((reply.sum, tag))
        },
    )
    .before(|ctx, request: &mut Request| {
        request.set_header("x-first", "1");
        ctx
    })
    .before(|ctx: Context, request: &mut Request| {
        let first = request.header("x-first").unwrap_or_default().to_string();
        request.set_header("x-second", format!("{first}2"));
        ctx.with_value(Tag("from-hook"))
    })
    .build()
    .endpoint();

    let (sum, tag) = endpoint
        .call(Context::background(), SumRequest { a: 1, b: 2 })
        .await
        .expect("call");

    check!(sum == 3);
    check!(tag == Some(Tag("from-hook")));
}

#[tokio::test]
async fn form_body_reaches_the_server() {
    #[derive(Serialize)]
    struct ConcatRequest<'a> {
        a: &'a str,
        b: &'a str,
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/concat"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("a=foo&b=bar"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"concat":"foobar"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = Client::builder(
        "POST",
        target(&server, "/concat"),
        |_ctx: &Context, request: &mut Request, (a, b): (String, String)| {
            request.set_form(&ConcatRequest { a: &a, b: &b })?;
            Ok::<_, BoxError>(())
        },
        |_ctx: Context, response: Response| async move {
            let reply: serde_json::Value = response.json().await?;
            Ok::<_, BoxError>(reply["concat"].as_str().unwrap_or_default().to_string())
        },
    )
    .build()
    .endpoint();

    let concat = endpoint
        .call(Context::background(), ("foo".to_string(), "bar".to_string()))
        .await
        .expect("concat");

    check!(concat == "foobar");
}

fn body_client(url: Url, buffered: bool) -> Client<(), ResponseBody> {
    Client::builder(
        "GET",
        url,
        |_ctx: &Context, _request: &mut Request, (): ()| Ok(()),
        |_ctx: Context, response: Response| async move { Ok::<_, BoxError>(response.into_body()) },
    )
    .buffered_stream(buffered)
    .build()
}

#[tokio::test]
async fn body_is_closed_when_the_call_returns() {
    let server = MockServer::start().await;
    Mock::given(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string("chunk"))
        .mount(&server)
        .await;

    let body = body_client(target(&server, "/stream"), false)
        .endpoint()
        .call(Context::background(), ())
        .await
        .expect("call");

    check!(body.is_closed());
    let_assert!(Err(HttpError::BodyClosed) = body.bytes().await);
}

#[tokio::test]
async fn buffered_stream_keeps_the_body_open() {
    let server = MockServer::start().await;
    Mock::given(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string("chunk"))
        .mount(&server)
        .await;

    let body = body_client(target(&server, "/stream"), true)
        .endpoint()
        .call(Context::background(), ())
        .await
        .expect("call");

    check!(!body.is_closed());
    let bytes = body.bytes().await.expect("body stays readable");
    check!(bytes.as_ref() == b"chunk");
}

type BodySlot = Arc<Mutex<Option<ResponseBody>>>;

/// Client whose decoder keeps the body aside, then fails.
fn failing_decode_client(url: Url, buffered: bool, slot: &BodySlot) -> Client<(), ()> {
    let slot = Arc::clone(slot);
    Client::builder(
        "GET",
        url,
        |_ctx: &Context, _request: &mut Request, (): ()| Ok(()),
        move |_ctx: Context, response: Response| {
            let slot = Arc::clone(&slot);
            async move {
                *slot.lock().expect("lock") = Some(response.into_body());
                Err::<(), BoxError>("unexpected payload".into())
            }
        },
    )
    .buffered_stream(buffered)
    .build()
}

#[tokio::test]
async fn body_is_closed_when_decoding_fails() {
    let server = MockServer::start().await;
    Mock::given(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string("chunk"))
        .mount(&server)
        .await;

    for buffered in [false, true] {
        let slot = BodySlot::default();
        let err = failing_decode_client(target(&server, "/stream"), buffered, &slot)
            .endpoint()
            .call(Context::background(), ())
            .await
            .expect_err("decode fails");

        check!(transport_error(&err).domain() == Domain::Decode);
        let_assert!(Some(body) = slot.lock().expect("lock").take());
        check!(body.is_closed() == !buffered);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_do_not_interfere() {
    let server = MockServer::start().await;
    Mock::given(path("/sum"))
        .respond_with(Adder)
        .expect(32)
        .mount(&server)
        .await;

    let endpoint = sum_client(target(&server, "/sum")).build().endpoint();

    let mut tasks = JoinSet::new();
    for a in 0..32 {
        let endpoint = endpoint.clone();
        tasks.spawn(async move {
            let sum = endpoint
                .call(Context::background(), SumRequest { a, b: 100 })
                .await
                .expect("sum");
            (a, sum)
        });
    }

    while let Some(result) = tasks.join_next().await {
        let (a, sum) = result.expect("join");
        check!(sum == a + 100);
    }
}
