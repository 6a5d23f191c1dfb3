//! Outgoing HTTP request.
//!
//! A transport client creates an empty [`Request`] for its method and target, then
//! hands it, mutably, to the encode function and to each pre-request hook.
//!
//! # Example
//!
//! ```
//! use conduit_core::{Method, Request};
//!
//! let url = "https://svc.example.com/sum".parse().unwrap();
//! let mut request = Request::new("GET", url).unwrap();
//! request.set_header("Accept", "application/json");
//! request.append_query("a", "2");
//!
//! assert_eq!(request.method(), Method::Get);
//! assert_eq!(request.url().as_str(), "https://svc.example.com/sum?a=2");
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::{ContentType, HttpError, Method, Result};

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl Request {
    /// Create an empty request.
    ///
    /// Fails if `method` is not a supported method name or if `url` is not an
    /// `http`/`https` URL.
    pub fn new(method: &str, url: url::Url) -> Result<Self> {
        let method = method.parse()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HttpError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        })
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Mutable access to the URL.
    pub fn url_mut(&mut self) -> &mut url::Url {
        &mut self.url
    }

    /// Request headers, keyed by lowercase name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to headers.
    ///
    /// Keys must be lowercase for [`header`](Self::header) and
    /// [`set_header`](Self::set_header) to find them.
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Single header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Sets a header, replacing any previous value whatever the case of its name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let mut name = name.into();
        name.make_ascii_lowercase();
        self.headers.insert(name, value.into());
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Sets the request body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = Some(body.into());
    }

    /// Appends a query parameter to the URL.
    pub fn append_query(&mut self, name: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(name, value);
    }

    /// Replaces the URL query with the serialized `value`.
    pub fn set_query<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        let query = crate::to_query_string(value)?;
        self.url
            .set_query(if query.is_empty() { None } else { Some(&query) });
        Ok(())
    }

    /// Sets a JSON body and its content type.
    pub fn set_json<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        let body = crate::to_json(value)?;
        self.set_header("Content-Type", ContentType::Json.as_str());
        self.body = Some(body);
        Ok(())
    }

    /// Sets a form-urlencoded body and its content type.
    pub fn set_form<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        let body = crate::to_form(value)?;
        self.set_header("Content-Type", ContentType::FormUrlEncoded.as_str());
        self.body = Some(body);
        Ok(())
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}
