//! The JSON envelope every endpoint answers with.
//!
//! ```json
//! {
//!   "header": {"status": 0, "statusmessage": "OK", "apiversion": 3, "cacheable": true, "count": 1},
//!   "body": [{"id": "APPLICATION"}]
//! }
//! ```

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use streamone_core::{Error, Result};

/// Status used for envelopes synthesized from a response the server did not
/// wrap in an envelope.
pub const STATUS_UNRECOGNIZED: i64 = -1;

/// Header field holding the HTTP status of a response that was not a 2xx.
const HTTP_STATUS_FIELD: &str = "httpstatus";

/// Header part of a [`ResponseEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// `0` on success, anything else is an application error.
    pub status: i64,
    /// Human readable status.
    #[serde(rename = "statusmessage", default)]
    pub status_message: String,
    /// API version that produced the response.
    #[serde(rename = "apiversion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<i64>,
    /// Whether the response may be cached.
    #[serde(default)]
    pub cacheable: bool,
    /// Command specific fields such as `count`, `sessiontimeout` and `timezone`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseHeader {
    /// Get a command specific header field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Number of items in the body, sent by list style actions.
    pub fn count(&self) -> Option<u64> {
        self.get("count").and_then(Value::as_u64)
    }

    /// Seconds left on the current session, sent when a session is used.
    pub fn session_timeout(&self) -> Option<u64> {
        self.get("sessiontimeout").and_then(Value::as_u64)
    }

    /// Timezone the server formats dates in.
    pub fn timezone(&self) -> Option<&str> {
        self.get("timezone").and_then(Value::as_str)
    }

    /// HTTP status of the response, recorded only when it was not a 2xx.
    pub fn http_status(&self) -> Option<StatusCode> {
        self.get(HTTP_STATUS_FIELD)
            .and_then(Value::as_u64)
            .and_then(|v| u16::try_from(v).ok())
            .and_then(|v| StatusCode::from_u16(v).ok())
    }
}

/// Parsed API response.
///
/// The body shape depends on command and action: some return one object,
/// list actions return an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Response header.
    pub header: ResponseHeader,
    /// Response body.
    #[serde(default)]
    pub body: Value,
}

/// Used when the body is broken but the header is still readable.
#[derive(Deserialize)]
struct HeaderOnly {
    header: ResponseHeader,
}

impl ResponseEnvelope {
    /// Parse an envelope from raw response bytes.
    ///
    /// A payload whose header parses but whose body does not is accepted with
    /// a null body, so the status can still be inspected.
    pub fn parse(bs: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<ResponseEnvelope>(bs) {
            Ok(v) => Ok(v),
            Err(err) => match serde_json::from_slice::<HeaderOnly>(bs) {
                Ok(v) => Ok(ResponseEnvelope {
                    header: v.header,
                    body: Value::Null,
                }),
                Err(_) => Err(Error::unexpected("response is not a StreamOne envelope")
                    .with_source(err)),
            },
        }
    }

    /// Build an envelope for a response that carried no envelope at all.
    pub fn unrecognized(status: StatusCode, body: &[u8]) -> Self {
        ResponseEnvelope {
            header: ResponseHeader {
                status: STATUS_UNRECOGNIZED,
                status_message: format!("unrecognized response with HTTP status {status}"),
                api_version: None,
                cacheable: false,
                extra: Map::new(),
            },
            body: Value::String(String::from_utf8_lossy(body).into_owned()),
        }
        .with_http_status(status)
    }

    /// Record the HTTP status of the response in the header.
    ///
    /// 2xx statuses are not recorded.
    pub fn with_http_status(mut self, status: StatusCode) -> Self {
        if !status.is_success() {
            self.header
                .extra
                .insert(HTTP_STATUS_FIELD.to_string(), Value::from(status.as_u16()));
        }
        self
    }

    /// Application status from the header.
    pub fn status(&self) -> i64 {
        self.header.status
    }

    /// Status message from the header.
    pub fn status_message(&self) -> &str {
        &self.header.status_message
    }

    /// Whether the header reports success.
    pub fn is_success(&self) -> bool {
        self.header.status == 0
    }

    /// Body as a sequence.
    ///
    /// - array: its items
    /// - null: empty
    /// - anything else: one item
    pub fn body_items(&self) -> &[Value] {
        match &self.body {
            Value::Array(items) => items,
            Value::Null => &[],
            v => std::slice::from_ref(v),
        }
    }

    /// Deserialize the body into `T`.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.body)?)
    }
}
