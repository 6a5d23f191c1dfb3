//! Wire helpers for encode and decode functions.
//!
//! Nothing here is mandatory: an encode function may write any bytes it likes
//! into the request.

use bytes::Bytes;
use derive_more::Display;

use crate::{HttpError, Result};

/// Content type set by the request body helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ContentType {
    /// `application/json`
    #[display("application/json")]
    Json,
    /// `application/x-www-form-urlencoded`
    #[display("application/x-www-form-urlencoded")]
    FormUrlEncoded,
}

impl ContentType {
    /// MIME type, as sent in the `Content-Type` header.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

/// JSON body bytes.
///
/// ```
/// use conduit_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Sum { a: i32, b: i32 }
///
/// let bytes = to_json(&Sum { a: 2, b: 3 }).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"a":2,"b":3}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Form body bytes (`a=1&b=2`, spaces as `+`).
pub fn to_form<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_urlencoded::to_string(value)?))
}

/// Query string, without the leading `?`.
///
/// Sequences become repeated keys (`k=a&k=b`).
///
/// ```
/// use conduit_core::to_query_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Sum { a: i32, b: i32 }
///
/// assert_eq!(to_query_string(&Sum { a: 2, b: 3 }).expect("serialize"), "a=2&b=3");
/// ```
pub fn to_query_string<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_html_form::to_string(value)?)
}

/// Parse a JSON body.
///
/// A failure names the path of the offending field, e.g. `result.sum`.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        HttpError::json_deserialization(err.path().to_string(), err.inner().to_string())
    })
}
