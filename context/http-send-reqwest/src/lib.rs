//! Reqwest based HTTP transport for the StreamOne client.
//!
//! ```no_run
//! use std::time::Duration;
//! use streamone_core::Context;
//! use streamone_http_send_reqwest::ReqwestHttpSend;
//!
//! let client = reqwest::Client::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .expect("client must build");
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};
use streamone_core::{Error, HttpSend, Result};

/// HttpSend implementation backed by a [`reqwest::Client`].
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::spec_invalid("failed to convert request").with_source(e))?;

        debug!("sending request: {} {}", req.method(), req.url());
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(classify_send_error)?
            .into();

        let (parts, body) = resp.into_parts();
        // The status is known at this point, but a body cut short is still a lost connection.
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

fn classify_send_error(err: reqwest::Error) -> Error {
    if err.is_builder() {
        return Error::spec_invalid("invalid http request").with_source(err);
    }

    let message = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "failed to connect"
    } else {
        "failed to send request"
    };
    Error::transport(message).with_source(err)
}
