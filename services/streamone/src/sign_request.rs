//! StreamOne request signer.
use std::mem;

use async_trait::async_trait;
use log::debug;
use streamone_core::hash::hex_hmac_sha1;
use streamone_core::time::{format_timestamp, now, parse_timestamp, DateTime};
use streamone_core::{Context, Error, Result, SignRequest, SigningRequest};

use crate::constants::*;
use crate::{AuthenticationType, Credential, RequestSpec, SessionToken};

/// RequestSigner that implements StreamOne request authentication.
///
/// The signature is the lowercase hex `HMAC-SHA1` of
///
/// ```text
/// path + "?" + sorted(parameters) + "&" + sorted(arguments)
/// ```
///
/// keyed with the pre-shared key, followed by the session key when a session
/// is in use. Both lists are form urlencoded, and `signature` itself is left
/// out of the parameters.
#[derive(Debug, Clone, Default)]
pub struct RequestSigner {
    session: Option<SessionToken>,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a signer without a session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign requests within the given session.
    pub fn with_session(mut self, session: SessionToken) -> Self {
        self.session = Some(session);
        self
    }

    /// Session requests are signed within.
    pub fn session(&self) -> Option<&SessionToken> {
        self.session.as_ref()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// Signatures are bound to their timestamp and expire on the server.
    /// Only pin the time to reproduce a request, never for live traffic.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign a request spec.
    pub fn sign_spec(&self, spec: &RequestSpec, credential: &Credential) -> Result<SignedRequest> {
        let mut req = spec.to_signing_request();
        self.sign_with(&mut req, credential)?;

        SignedRequest::from_signing_request(spec, req)
    }

    fn sign_with(&self, req: &mut SigningRequest, cred: &Credential) -> Result<()> {
        if cred.psk.is_empty() {
            return Err(Error::signing_failed("pre-shared key is empty"));
        }

        let now = self.time.unwrap_or_else(now);
        if let Some(session) = &self.session {
            if session.is_expired(now) {
                return Err(Error::credential_expired(format!(
                    "session {} expired at {}",
                    session.id, session.expires_at
                )));
            }
        }

        // Both are derived at signing time.
        req.query_remove(PARAM_SIGNATURE);
        req.query_remove(PARAM_TIMESTAMP);

        set_default(req, PARAM_API, API_VERSION);
        set_default(req, PARAM_FORMAT, FORMAT_JSON);
        set_default(
            req,
            PARAM_AUTHENTICATION_TYPE,
            cred.authentication_type.as_str(),
        );
        if req.query_get(PARAM_AUTHENTICATION_TYPE) == Some(cred.authentication_type.as_str()) {
            set_default(
                req,
                cred.authentication_type.actor_parameter(),
                &cred.actor_id,
            );
        }
        if let Some(customer) = &cred.customer {
            set_default(req, PARAM_CUSTOMER, customer);
        }
        if let Some(session) = &self.session {
            set_default(req, PARAM_SESSION, &session.id);
        }
        req.query_push(PARAM_TIMESTAMP, format_timestamp(now));
        req.query = wire_order(mem::take(&mut req.query));

        check_parameters(&req.query, false)?;

        let string_to_sign = req.string_to_sign();
        debug!("string to sign: {}", &string_to_sign);

        let signature = hex_hmac_sha1(
            signing_key(cred, self.session.as_ref()).as_bytes(),
            string_to_sign.as_bytes(),
        );
        req.query_push(PARAM_SIGNATURE, signature);

        Ok(())
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        req: &mut SigningRequest,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred =
            credential.ok_or_else(|| Error::credential_invalid("no StreamOne credential found"))?;

        self.sign_with(req, cred)
    }
}

/// A request with its timestamp and signature, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    command: String,
    action: String,
    request: SigningRequest,
}

impl SignedRequest {
    pub(crate) fn from_signing_request(spec: &RequestSpec, request: SigningRequest) -> Result<Self> {
        check_parameters(&request.query, true)?;

        Ok(Self {
            command: spec.command().to_string(),
            action: spec.action().to_string(),
            request,
        })
    }

    /// Rebuild a request from a spec and the timestamp and signature it was
    /// sent with.
    ///
    /// `spec` must carry every authentication parameter itself; nothing is
    /// filled in. Missing parameters, or a signature that is not 40 lowercase
    /// hex characters, fail with [`streamone_core::ErrorKind::SpecInvalid`].
    pub fn from_parts(spec: &RequestSpec, timestamp: &str, signature: &str) -> Result<Self> {
        let mut req = spec.to_signing_request();
        req.query_remove(PARAM_SIGNATURE);
        req.query_remove(PARAM_TIMESTAMP);
        req.query_push(PARAM_TIMESTAMP, timestamp);
        req.query = wire_order(mem::take(&mut req.query));
        req.query_push(PARAM_SIGNATURE, signature);

        Self::from_signing_request(spec, req)
    }

    /// Resource family, e.g. `session`.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Verb, e.g. `create`.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Endpoint path.
    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Timestamp the request was signed at, in unix seconds.
    pub fn timestamp(&self) -> &str {
        self.parameter(PARAM_TIMESTAMP).unwrap_or_default()
    }

    /// Hex encoded signature.
    pub fn signature(&self) -> &str {
        self.parameter(PARAM_SIGNATURE).unwrap_or_default()
    }

    /// Get a query parameter.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.request.query_get(key)
    }

    /// Encoded query string, signature last.
    pub fn query_string(&self) -> String {
        self.request.query_string()
    }

    /// Encoded form body.
    pub fn body(&self) -> String {
        self.request.form_string()
    }

    /// The canonical string the signature was computed over.
    pub fn string_to_sign(&self) -> String {
        let mut req = self.request.clone();
        req.query_remove(PARAM_SIGNATURE);
        req.string_to_sign()
    }

    /// Check the signature against `credential` and an optional session.
    pub fn verify(&self, credential: &Credential, session: Option<&SessionToken>) -> bool {
        let expected = hex_hmac_sha1(
            signing_key(credential, session).as_bytes(),
            self.string_to_sign().as_bytes(),
        );
        expected == self.signature()
    }

    /// Build the HTTP request against `endpoint`.
    pub fn to_http_request(&self, endpoint: &str) -> Result<http::Request<bytes::Bytes>> {
        self.request.to_http_request(endpoint)
    }
}

/// Pre-shared key, followed by the session key when there is a session.
fn signing_key(cred: &Credential, session: Option<&SessionToken>) -> String {
    let mut key = cred.psk.clone();
    if let Some(session) = session {
        key.push_str(&session.key);
    }
    key
}

fn set_default(req: &mut SigningRequest, key: &str, value: &str) {
    if req.query_get(key).is_none() {
        req.query_push(key, value);
    }
}

/// Put well known parameters first, in the order the server documents them.
fn wire_order(mut query: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut ordered = Vec::with_capacity(query.len());
    for key in WIRE_ORDER {
        if let Some(idx) = query.iter().position(|(k, _)| k == key) {
            ordered.push(query.remove(idx));
        }
    }
    query.sort();
    ordered.extend(query);
    ordered
}

fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

fn require<'a>(query: &'a [(String, String)], key: &str) -> Result<&'a str> {
    param(query, key).ok_or_else(|| Error::spec_invalid(format!("missing parameter {key}")))
}

fn check_parameters(query: &[(String, String)], signed: bool) -> Result<()> {
    require(query, PARAM_API)?;
    require(query, PARAM_FORMAT)?;

    let auth = require(query, PARAM_AUTHENTICATION_TYPE)?;
    let auth: AuthenticationType = auth.parse().map_err(|_| {
        Error::spec_invalid(format!("unknown {PARAM_AUTHENTICATION_TYPE} {auth:?}"))
    })?;
    require(query, auth.actor_parameter())?;

    parse_timestamp(require(query, PARAM_TIMESTAMP)?)?;

    if signed {
        let signature = require(query, PARAM_SIGNATURE)?;
        let is_hex = signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if signature.len() != 40 || !is_hex {
            return Err(Error::spec_invalid(
                "signature must be 40 lowercase hex characters",
            ));
        }
    }

    Ok(())
}
