//! Adding service demo.
//!
//! Runs a few calls through the service middleware and the endpoint layer. When
//! `ADDSVC_URL` is set, the same calls also go to the remote service found there.

#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use std::sync::Arc;

use addsvc::{
    Endpoints, Service, instrumenting_middleware, logging_middleware, new_basic_service,
    new_http_client,
};
use conduit::prelude::*;
use conduit::{AtomicCounter, TracingLogger};
use tracing_subscriber::EnvFilter;
use url::Url;

// ============================================================================
// Calls
// ============================================================================

async fn run(label: &str, svc: &dyn Service) {
    println!("\n=== {label} ===");

    for (a, b) in [(2, 3), (0, 0), (i32::MAX, 1), (-7, 4)] {
        match svc.sum(Context::background(), a, b).await {
            Ok(v) => println!("sum({a}, {b}) = {v}"),
            Err(err) => println!("sum({a}, {b}) failed: {err}"),
        }
    }

    for (a, b) in [("foo", "bar"), ("", "")] {
        match svc
            .concat(Context::background(), a.to_string(), b.to_string())
            .await
        {
            Ok(v) => println!("concat({a:?}, {b:?}) = {v:?}"),
            Err(err) => println!("concat({a:?}, {b:?}) failed: {err}"),
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ints = Arc::new(AtomicCounter::new());
    let chars = Arc::new(AtomicCounter::new());

    let mut svc = new_basic_service();
    svc = logging_middleware(Arc::new(TracingLogger::new()))(svc);
    svc = instrumenting_middleware(Arc::clone(&ints) as _, Arc::clone(&chars) as _)(svc);

    run("local service", svc.as_ref()).await;
    run("local endpoints", &Endpoints::new(&svc)).await;

    println!("\nintegers summed: {}", ints.get());
    println!("characters concatenated: {}", chars.get());

    if let Ok(url) = std::env::var("ADDSVC_URL") {
        let remote = new_http_client(&Url::parse(&url)?, Arc::new(HyperClient::new()))?;
        run(&format!("remote service at {url}"), &remote).await;
    }

    Ok(())
}
