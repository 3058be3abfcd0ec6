use std::time::Duration;

use log::{debug, warn};
use streamone_core::time::now;
use streamone_core::{Context, Error, ErrorKind, ProvideCredential, Result, Signer};

use crate::config::normalize_endpoint;
use crate::{
    Config, ConfigCredentialProvider, Credential, DefaultCredentialProvider, RequestSigner,
    RequestSpec, ResponseEnvelope, SessionChallenge, SessionToken, SignedRequest,
};

/// Result of a single dispatch.
///
/// Every dispatch resolves to exactly one of these.
#[derive(Debug)]
pub enum Outcome {
    /// The server accepted the request.
    Success(ResponseEnvelope),
    /// The server answered, but reported a non-zero status or no envelope at all.
    ApplicationError(ResponseEnvelope),
    /// No answer: the connection failed or the deadline elapsed.
    LostConnection(Error),
}

impl Outcome {
    /// Whether this is [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The envelope, if the server answered.
    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            Outcome::Success(env) | Outcome::ApplicationError(env) => Some(env),
            Outcome::LostConnection(_) => None,
        }
    }

    /// Convert into a `Result`, failing on anything but success.
    pub fn into_result(self) -> Result<ResponseEnvelope> {
        match self {
            Outcome::Success(env) => Ok(env),
            Outcome::ApplicationError(env) => Err(Error::application(format!(
                "{} (status {})",
                env.status_message(),
                env.status()
            ))),
            Outcome::LostConnection(err) => Err(err),
        }
    }
}

/// Client for the StreamOne API.
///
/// Cloning is cheap; clones share the credential cache.
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    endpoint: String,
    signer: Signer<Credential>,
    session: Option<SessionToken>,
    timeout: Option<Duration>,
}

impl Client {
    /// Create a client against `endpoint`, signing with `signer`.
    ///
    /// Requests are sent through the HTTP implementation of `ctx`.
    pub fn new(ctx: Context, endpoint: &str, signer: Signer<Credential>) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::config_invalid("endpoint is empty"));
        }

        Ok(Self {
            ctx,
            endpoint: normalize_endpoint(endpoint),
            signer,
            session: None,
            timeout: None,
        })
    }

    /// Create a client from `config`, falling back to the environment for
    /// anything the config leaves out.
    pub fn from_config(ctx: Context, config: Config) -> Result<Self> {
        let config = config.from_env(&ctx);
        let endpoint = config.endpoint()?;

        let loader = DefaultCredentialProvider::new()
            .push_front(ConfigCredentialProvider::new(config.clone()));

        let signer = Signer::new(ctx.clone(), loader, RequestSigner::new());
        let mut client = Self::new(ctx, &endpoint, signer)?;
        client.timeout = config.timeout;
        Ok(client)
    }

    /// Create a client with a custom credential loader.
    pub fn with_loader(
        ctx: Context,
        endpoint: &str,
        loader: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self> {
        let signer = Signer::new(ctx.clone(), loader, RequestSigner::new());
        Self::new(ctx, endpoint, signer)
    }

    /// Resolve a dispatch as lost connection when no response arrives in time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sign later requests within `session`.
    pub fn with_session(mut self, session: SessionToken) -> Self {
        self.signer = self
            .signer
            .with_builder(RequestSigner::new().with_session(session.clone()));
        self.session = Some(session);
        self
    }

    /// Normalized endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Session requests are signed within.
    pub fn session(&self) -> Option<&SessionToken> {
        self.session.as_ref()
    }

    /// Sign `spec` with the loaded credential.
    pub async fn sign(&self, spec: &RequestSpec) -> Result<SignedRequest> {
        let mut req = spec.to_signing_request();
        self.signer.sign(&mut req).await?;

        SignedRequest::from_signing_request(spec, req)
    }

    /// Sign and dispatch `spec`.
    pub async fn send(&self, spec: &RequestSpec) -> Result<Outcome> {
        let signed = self.sign(spec).await?;
        self.dispatch(&signed).await
    }

    /// Dispatch an already signed request.
    ///
    /// Only problems with the request itself are returned as `Err`. Anything
    /// that happens on the wire resolves to an [`Outcome`].
    pub async fn dispatch(&self, req: &SignedRequest) -> Result<Outcome> {
        let http_req = req.to_http_request(&self.endpoint)?;
        debug!(
            "dispatching {}/{} to {}",
            req.command(),
            req.action(),
            self.endpoint
        );

        let sent = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.ctx.http_send(http_req)).await
            {
                Ok(resp) => resp,
                Err(_) => Err(Error::transport(format!(
                    "no response within {}ms",
                    timeout.as_millis()
                ))),
            },
            None => self.ctx.http_send(http_req).await,
        };

        let resp = match sent {
            Ok(resp) => resp,
            Err(err) if matches!(err.kind(), ErrorKind::SpecInvalid | ErrorKind::ConfigInvalid) => {
                return Err(err)
            }
            Err(err) => {
                warn!("lost connection to {}: {err}", self.endpoint);
                return Ok(Outcome::LostConnection(err));
            }
        };

        let status = resp.status();
        let body = resp.into_body();
        let outcome = match ResponseEnvelope::parse(&body) {
            Ok(env) if env.is_success() && status.is_success() => Outcome::Success(env),
            // A non-2xx response never counts as success, even with status 0.
            Ok(env) => Outcome::ApplicationError(env.with_http_status(status)),
            Err(err) => {
                debug!("response with HTTP status {status} is not an envelope: {err}");
                Outcome::ApplicationError(ResponseEnvelope::unrecognized(status, &body))
            }
        };

        if let Outcome::ApplicationError(env) = &outcome {
            warn!(
                "{}/{} failed: {} (status {}, HTTP status {status})",
                req.command(),
                req.action(),
                env.status_message(),
                env.status()
            );
        }
        Ok(outcome)
    }

    /// Start a session for `user`, who connects from `user_ip`.
    pub async fn initialize_session(&self, user: &str, user_ip: &str) -> Result<SessionChallenge> {
        let spec = RequestSpec::builder("session", "initialize")
            .argument("user", user)
            .argument("userip", user_ip)
            .build()?;

        self.send(&spec).await?.into_result()?.body_as()
    }

    /// Answer `challenge` and create the session.
    ///
    /// `response` is the hashed answer to the challenge. Pass the returned
    /// token to [`Client::with_session`].
    pub async fn create_session(&self, challenge: &str, response: &str) -> Result<SessionToken> {
        let spec = RequestSpec::builder("session", "create")
            .argument("challenge", challenge)
            .argument("response", response)
            .build()?;

        let outcome = self.send(&spec).await?;
        let received_at = now();
        match outcome {
            Outcome::LostConnection(err) => Err(err),
            Outcome::Success(env) | Outcome::ApplicationError(env) => {
                SessionToken::from_envelope(&env, received_at)
            }
        }
    }
}
