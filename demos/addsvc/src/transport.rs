//! HTTP client binding of the service.
//!
//! Wire format:
//!
//! | Method | Request | Response body |
//! |--------|---------|---------------|
//! | `sum` | `GET /sum?a=<int>&b=<int>` | `{"sum": <int>, "err": <string?>}` |
//! | `concat` | `POST /concat`, form body `a=<str>&b=<str>` | `{"concat": <string>, "err": <string?>}` |
//!
//! A non-2xx status is a decode failure.

use std::sync::Arc;

use conduit::{BoxError, Client, Context, HttpClient, Request, Response};
use serde::Deserialize;
use url::Url;

use crate::endpoints::{ConcatRequest, ConcatResponse, Endpoints, SumRequest, SumResponse};
use crate::service::ServiceError;

#[derive(Debug, Deserialize)]
struct SumBody {
    sum: i32,
    #[serde(default)]
    err: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConcatBody {
    concat: String,
    #[serde(default)]
    err: Option<String>,
}

/// Put the operands of a `sum` call in the query string.
pub fn encode_sum_request(
    _ctx: &Context,
    request: &mut Request,
    sum: SumRequest,
) -> Result<(), BoxError> {
    request.set_query(&sum)?;
    Ok(())
}

/// Read a `sum` reply.
pub async fn decode_sum_response(
    _ctx: Context,
    response: Response,
) -> Result<SumResponse, BoxError> {
    let body: SumBody = response.error_for_status().await?.json().await?;
    Ok(SumResponse {
        v: body.sum,
        err: body.err.as_deref().map(ServiceError::from_message),
    })
}

/// Put the operands of a `concat` call in a form body.
pub fn encode_concat_request(
    _ctx: &Context,
    request: &mut Request,
    concat: ConcatRequest,
) -> Result<(), BoxError> {
    request.set_form(&concat)?;
    Ok(())
}

/// Read a `concat` reply.
pub async fn decode_concat_response(
    _ctx: Context,
    response: Response,
) -> Result<ConcatResponse, BoxError> {
    let body: ConcatBody = response.error_for_status().await?.json().await?;
    Ok(ConcatResponse {
        v: body.concat,
        err: body.err.as_deref().map(ServiceError::from_message),
    })
}

/// Endpoints of a remote service reachable at `base`.
///
/// Method paths are resolved against `base` (`<base>/sum`, `<base>/concat`); `http`
/// executes both endpoints and shares its connection pool between them.
pub fn new_http_client(
    base: &Url,
    http: Arc<dyn HttpClient>,
) -> Result<Endpoints, url::ParseError> {
    let sum = Client::builder(
        "GET",
        base.join("sum")?,
        encode_sum_request,
        decode_sum_response,
    )
    .http_client(Arc::clone(&http))
    .build()
    .endpoint();

    let concat = Client::builder(
        "POST",
        base.join("concat")?,
        encode_concat_request,
        decode_concat_response,
    )
    .http_client(http)
    .build()
    .endpoint();

    Ok(Endpoints { sum, concat })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};
    use conduit::{HttpError, ResponseBody};

    use super::*;

    fn request(method: &str) -> Request {
        Request::new(method, Url::parse("http://svc/").expect("url")).expect("request")
    }

    fn reply(status: u16, body: &'static str) -> Response {
        Response::new(status, HashMap::new(), ResponseBody::from(body))
    }

    #[test]
    fn sum_goes_in_the_query() {
        let mut request = request("GET");
        encode_sum_request(&Context::background(), &mut request, SumRequest { a: 2, b: 3 })
            .expect("encode");

        check!(request.url().query() == Some("a=2&b=3"));
        check!(request.body().is_none());
    }

    #[test]
    fn concat_goes_in_a_form_body() {
        let mut request = request("POST");
        let concat = ConcatRequest {
            a: "foo bar".to_string(),
            b: "&baz".to_string(),
        };
        encode_concat_request(&Context::background(), &mut request, concat).expect("encode");

        let_assert!(Some(body) = request.body());
        check!(body.as_ref() == b"a=foo+bar&b=%26baz");
    }

    #[tokio::test]
    async fn sum_reply_with_embedded_error() {
        let response = decode_sum_response(
            Context::background(),
            reply(200, r#"{"sum":0,"err":"can't sum two zeroes"}"#),
        )
        .await
        .expect("decode");

        check!(response.v == 0);
        let_assert!(Some(ServiceError::TwoZeroes) = response.err);
    }

    #[tokio::test]
    async fn concat_reply_without_error_field() {
        let response =
            decode_concat_response(Context::background(), reply(200, r#"{"concat":"ab"}"#))
                .await
                .expect("decode");

        check!(response.v == "ab");
        check!(response.err.is_none());
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let err = decode_sum_response(Context::background(), reply(500, ""))
            .await
            .expect_err("500");

        let_assert!(Some(HttpError::Status { status: 500, .. }) = err.downcast_ref::<HttpError>());
    }
}
