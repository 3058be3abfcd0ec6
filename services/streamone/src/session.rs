use std::fmt::{Debug, Formatter};

use chrono::TimeDelta;
use serde::Deserialize;
use streamone_core::time::DateTime;
use streamone_core::utils::Redact;
use streamone_core::{Error, Result};

use crate::ResponseEnvelope;

/// Challenge returned by `session/initialize`.
///
/// The caller turns it into the `response` argument of `session/create`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionChallenge {
    /// Random challenge to answer.
    pub challenge: String,
    /// Salt for hashing the user's password.
    pub salt: String,
    /// Whether the password must be hashed with the v2 scheme first.
    #[serde(default)]
    pub needsv2hash: bool,
}

/// An authenticated session returned by `session/create`.
///
/// Requests signed with a session carry `session=<id>` and use the pre-shared
/// key followed by the session key as signing key.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Session id, sent as the `session` parameter.
    pub id: String,
    /// Session key, appended to the pre-shared key when signing.
    pub key: String,
    /// Moment the session stops being accepted.
    pub expires_at: DateTime,
    /// User the session belongs to.
    pub user: Option<String>,
}

#[derive(Deserialize)]
struct SessionBody {
    id: String,
    key: String,
    timeout: i64,
    user: Option<String>,
}

impl SessionToken {
    /// Create a session token.
    pub fn new(id: impl Into<String>, key: impl Into<String>, expires_at: DateTime) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            expires_at,
            user: None,
        }
    }

    /// Read the token from a `session/create` response received at `now`.
    pub fn from_envelope(env: &ResponseEnvelope, now: DateTime) -> Result<Self> {
        if !env.is_success() {
            return Err(Error::application(format!(
                "session was not created: {} (status {})",
                env.status_message(),
                env.status()
            )));
        }

        let body: SessionBody = env.body_as()?;
        if body.id.is_empty() || body.key.is_empty() {
            return Err(Error::credential_invalid(
                "session response carries an empty id or key",
            ));
        }
        let timeout = TimeDelta::try_seconds(body.timeout)
            .filter(|t| *t > TimeDelta::zero())
            .ok_or_else(|| {
                Error::credential_invalid(format!("invalid session timeout {}", body.timeout))
            })?;

        Ok(Self {
            id: body.id,
            key: body.key,
            expires_at: now + timeout,
            user: body.user,
        })
    }

    /// Whether the session is expired at `now`.
    pub fn is_expired(&self, now: DateTime) -> bool {
        now >= self.expires_at
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("id", &self.id)
            .field("key", &Redact::from(&self.key))
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}
