//! `HttpClient` implementation on the hyper-util pooled client.

use std::collections::HashMap;
use std::error::Error as _;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{self, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::connector::https_connector;
use crate::{HttpClient, HttpError, Request, Response, ResponseBody, Result, SendFuture, header};

type Pool = legacy::Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Network executor backed by a pooled hyper client, with rustls for `https`.
///
/// This is the handle a transport [`Client`](crate::Client) uses unless told
/// otherwise. Clones share the connection pool.
///
/// ```ignore
/// use std::time::Duration;
///
/// use conduit::HyperClient;
///
/// let http = HyperClient::builder()
///     .timeout(Duration::from_secs(5))
///     .http2(false)
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    pool: Pool,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Client with [`ClientConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Client with the given settings.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let pool = legacy::Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(&config));
        Self { pool, config }
    }

    /// Builder starting from the default settings.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder {
            config: ClientConfig::builder(),
        }
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Convert a conduit request, adding the configured `User-Agent` unless the
    /// request sets its own.
    fn build_hyper_request(
        request: Request,
        user_agent: Option<&str>,
    ) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let has_user_agent = headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(header::USER_AGENT.as_str()));

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(user_agent) = user_agent.filter(|_| !has_user_agent) {
            builder = builder.header(header::USER_AGENT, user_agent);
        }

        builder
            .body(body.map_or_else(Full::default, Full::new))
            .map_err(|err| HttpError::invalid_request(err.to_string()))
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let request = Self::build_hyper_request(request, self.config.user_agent.as_deref())?;

        let response = tokio::time::timeout(self.config.timeout, self.pool.request(request))
            .await
            .map_err(|_elapsed| HttpError::Timeout)?
            .map_err(|err| classify(&err))?;

        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        Ok(Response::new(
            status,
            headers,
            ResponseBody::new(response.into_body()),
        ))
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for HyperClient {
    fn send(&self, request: Request) -> SendFuture {
        let this = self.clone();
        Box::pin(async move { this.execute(request).await })
    }
}

/// Headers with a visible-ASCII value; others are skipped.
///
/// Repeated fields are combined in order, separated by `, `.
fn header_map(headers: &http::HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::<String, String>::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        map.entry(name.to_string())
            .and_modify(|combined| {
                combined.push_str(", ");
                combined.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    map
}

/// Map a hyper failure by walking its cause chain.
fn classify(err: &legacy::Error) -> HttpError {
    let message = err.to_string();
    let mut cause = err.source();
    while let Some(current) = cause {
        if current.downcast_ref::<rustls::Error>().is_some() {
            return HttpError::tls(format!("{message}: {current}"));
        }
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return HttpError::Timeout;
            }
            if io.get_ref().is_some_and(|inner| inner.is::<rustls::Error>()) {
                return HttpError::tls(format!("{message}: {current}"));
            }
        }
        cause = current.source();
    }
    HttpError::connection(match err.source() {
        Some(source) => format!("{message}: {source}"),
        None => message,
    })
}

/// Builder for [`HyperClient`]; see [`ClientConfigBuilder`] for every setting.
#[derive(Debug, Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
}

impl HyperClientBuilder {
    /// See [`ClientConfigBuilder::timeout`].
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        self.map(|config| config.timeout(timeout))
    }

    /// See [`ClientConfigBuilder::connect_timeout`].
    #[must_use]
    pub fn connect_timeout(self, timeout: Duration) -> Self {
        self.map(|config| config.connect_timeout(timeout))
    }

    /// See [`ClientConfigBuilder::pool_idle_per_host`].
    #[must_use]
    pub fn pool_idle_per_host(self, count: usize) -> Self {
        self.map(|config| config.pool_idle_per_host(count))
    }

    /// See [`ClientConfigBuilder::pool_idle_timeout`].
    #[must_use]
    pub fn pool_idle_timeout(self, timeout: Duration) -> Self {
        self.map(|config| config.pool_idle_timeout(timeout))
    }

    /// See [`ClientConfigBuilder::user_agent`].
    #[must_use]
    pub fn user_agent(self, user_agent: impl Into<String>) -> Self {
        self.map(|config| config.user_agent(user_agent))
    }

    /// See [`ClientConfigBuilder::http2`].
    #[must_use]
    pub fn http2(self, enabled: bool) -> Self {
        self.map(|config| config.http2(enabled))
    }

    /// Create the client.
    #[must_use]
    pub fn build(self) -> HyperClient {
        HyperClient::with_config(self.config.build())
    }

    fn map(self, f: impl FnOnce(ClientConfigBuilder) -> ClientConfigBuilder) -> Self {
        Self {
            config: f(self.config),
        }
    }
}
