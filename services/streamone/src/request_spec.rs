use std::collections::BTreeMap;

use streamone_core::time::DateTime;
use streamone_core::{Error, Result, SigningRequest};

use crate::{Credential, RequestSigner, SignedRequest};

/// A frozen description of one API call.
///
/// Built with [`RequestSpec::builder`]. Once built it can't be changed, so
/// the parameters that get signed are the parameters that get sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    command: String,
    action: String,
    parameters: BTreeMap<String, String>,
    arguments: BTreeMap<String, String>,
}

impl RequestSpec {
    /// Start building a request for `command`/`action`, e.g. `session`/`create`.
    pub fn builder(command: impl Into<String>, action: impl Into<String>) -> RequestSpecBuilder {
        RequestSpecBuilder {
            command: command.into(),
            action: action.into(),
            parameters: BTreeMap::new(),
            arguments: BTreeMap::new(),
        }
    }

    /// Resource family, e.g. `application`.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Verb, e.g. `view`.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Authentication parameters set by the caller. Sent in the query string.
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Call arguments. Sent as form encoded body.
    pub fn arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    /// Endpoint path: `/api/<command>/<action>`.
    pub fn path(&self) -> String {
        format!("/api/{}/{}", self.command, self.action)
    }

    /// Sign this request for `credential` at `timestamp`.
    ///
    /// Same inputs always give the same signature.
    pub fn sign(&self, credential: &Credential, timestamp: DateTime) -> Result<SignedRequest> {
        RequestSigner::new()
            .with_time(timestamp)
            .sign_spec(self, credential)
    }

    pub(crate) fn to_signing_request(&self) -> SigningRequest {
        let mut req = SigningRequest::new(self.path());
        for (k, v) in &self.parameters {
            req.query_push(k, v);
        }
        for (k, v) in &self.arguments {
            req.form_push(k, v);
        }
        req
    }
}

/// Builder for [`RequestSpec`].
#[derive(Debug, Clone)]
pub struct RequestSpecBuilder {
    command: String,
    action: String,
    parameters: BTreeMap<String, String>,
    arguments: BTreeMap<String, String>,
}

impl RequestSpecBuilder {
    /// Set an authentication parameter, replacing an earlier value.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Set several authentication parameters.
    pub fn parameters<K, V>(mut self, iter: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set a call argument, replacing an earlier value.
    pub fn argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Set several call arguments.
    pub fn arguments<K, V>(mut self, iter: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.arguments
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Freeze the request.
    ///
    /// Fails with [`streamone_core::ErrorKind::SpecInvalid`] when command or
    /// action is empty or is not a single path segment.
    pub fn build(self) -> Result<RequestSpec> {
        check_segment("command", &self.command)?;
        check_segment("action", &self.action)?;

        Ok(RequestSpec {
            command: self.command,
            action: self.action,
            parameters: self.parameters,
            arguments: self.arguments,
        })
    }
}

fn check_segment(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::spec_invalid(format!("{name} must not be empty")));
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '/' | '?' | '&' | '#') || c.is_whitespace())
    {
        return Err(Error::spec_invalid(format!(
            "{name} {value:?} contains invalid character {c:?}"
        )));
    }
    Ok(())
}
