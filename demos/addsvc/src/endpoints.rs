//! Endpoint layer: one endpoint per service method.
//!
//! The endpoint constructors decide, per business error, whether it goes through the
//! endpoint error channel or is carried inside the response value. See
//! [`ServiceError`] for the classification.

use std::sync::Arc;

use async_trait::async_trait;
use conduit::{BoxError, Context, Endpoint};
use serde::Serialize;

use crate::service::{Result, Service, ServiceError};

/// Request of the `sum` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SumRequest {
    /// First operand.
    pub a: i32,
    /// Second operand.
    pub b: i32,
}

/// Response of the `sum` method.
#[derive(Debug)]
pub struct SumResponse {
    /// The sum, `0` when `err` is set.
    pub v: i32,
    /// Business error carried in the response.
    pub err: Option<ServiceError>,
}

/// Request of the `concat` method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcatRequest {
    /// Left part.
    pub a: String,
    /// Right part.
    pub b: String,
}

/// Response of the `concat` method.
#[derive(Debug)]
pub struct ConcatResponse {
    /// The concatenation, empty when `err` is set.
    pub v: String,
    /// Business error carried in the response.
    pub err: Option<ServiceError>,
}

/// Endpoint for [`Service::sum`].
///
/// [`ServiceError::IntOverflow`] goes through the error channel; any other
/// error is carried in the response.
#[must_use]
pub fn make_sum_endpoint(svc: Arc<dyn Service>) -> Endpoint<SumRequest, SumResponse> {
    Endpoint::new(move |ctx, request: SumRequest| {
        let svc = Arc::clone(&svc);
        async move {
            match svc.sum(ctx, request.a, request.b).await {
                Ok(v) => Ok(SumResponse { v, err: None }),
                Err(ServiceError::IntOverflow) => Err(BoxError::from(ServiceError::IntOverflow)),
                Err(err) => Ok(SumResponse {
                    v: 0,
                    err: Some(err),
                }),
            }
        }
    })
}

/// Endpoint for [`Service::concat`].
///
/// Every error is carried in the response.
#[must_use]
pub fn make_concat_endpoint(svc: Arc<dyn Service>) -> Endpoint<ConcatRequest, ConcatResponse> {
    Endpoint::new(move |ctx, request: ConcatRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let response = match svc.concat(ctx, request.a, request.b).await {
                Ok(v) => ConcatResponse { v, err: None },
                Err(err) => ConcatResponse {
                    v: String::new(),
                    err: Some(err),
                },
            };
            Ok::<_, BoxError>(response)
        }
    })
}

/// All endpoints of the service.
///
/// Also a [`Service`] itself, typically the client side of a remote service.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// The `sum` endpoint.
    pub sum: Endpoint<SumRequest, SumResponse>,
    /// The `concat` endpoint.
    pub concat: Endpoint<ConcatRequest, ConcatResponse>,
}

impl Endpoints {
    /// Endpoints calling `svc` directly.
    #[must_use]
    pub fn new(svc: &Arc<dyn Service>) -> Self {
        Self {
            sum: make_sum_endpoint(Arc::clone(svc)),
            concat: make_concat_endpoint(Arc::clone(svc)),
        }
    }
}

#[async_trait]
impl Service for Endpoints {
    async fn sum(&self, ctx: Context, a: i32, b: i32) -> Result<i32> {
        let response = self
            .sum
            .call(ctx, SumRequest { a, b })
            .await
            .map_err(ServiceError::from_endpoint)?;
        response.err.map_or(Ok(response.v), Err)
    }

    async fn concat(&self, ctx: Context, a: String, b: String) -> Result<String> {
        let response = self
            .concat
            .call(ctx, ConcatRequest { a, b })
            .await
            .map_err(ServiceError::from_endpoint)?;
        response.err.map_or(Ok(response.v), Err)
    }
}
