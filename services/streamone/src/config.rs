use std::fmt::{Debug, Formatter};
use std::time::Duration;

use log::warn;
use streamone_core::{utils::Redact, Context, Error, Result};

use crate::constants::*;
use crate::{AuthenticationType, Credential};

/// Config carries all the configuration for the StreamOne client.
#[derive(Clone, Default)]
pub struct Config {
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STREAMONE_ENDPOINT`]
    ///
    /// A bare `host:port` is taken as `http://host:port`.
    pub endpoint: Option<String>,
    /// `authentication_type` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STREAMONE_AUTHENTICATION_TYPE`]
    /// - `user` when only a user is configured, `application` otherwise
    pub authentication_type: Option<AuthenticationType>,
    /// `application` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STREAMONE_APPLICATION`]
    pub application: Option<String>,
    /// `user` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STREAMONE_USER`]
    pub user: Option<String>,
    /// `psk` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STREAMONE_PSK`]
    pub psk: Option<String>,
    /// `customer` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STREAMONE_CUSTOMER`]
    pub customer: Option<String>,
    /// `timeout` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`STREAMONE_TIMEOUT`], in seconds
    ///
    /// A dispatch without a response within this deadline resolves as a lost connection.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set authentication_type
    pub fn with_authentication_type(mut self, authentication_type: AuthenticationType) -> Self {
        self.authentication_type = Some(authentication_type);
        self
    }

    /// Set application
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Set user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set psk
    pub fn with_psk(mut self, psk: impl Into<String>) -> Self {
        self.psk = Some(psk.into());
        self
    }

    /// Set customer
    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load config from env.
    ///
    /// Fields already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(STREAMONE_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(STREAMONE_AUTHENTICATION_TYPE) {
            match v.parse() {
                Ok(v) => {
                    self.authentication_type.get_or_insert(v);
                }
                Err(err) => warn!("ignoring {STREAMONE_AUTHENTICATION_TYPE}: {err}"),
            }
        }
        if let Some(v) = ctx.env_var(STREAMONE_APPLICATION) {
            self.application.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(STREAMONE_USER) {
            self.user.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(STREAMONE_PSK) {
            self.psk.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(STREAMONE_CUSTOMER) {
            self.customer.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(STREAMONE_TIMEOUT) {
            match v.parse::<u64>() {
                Ok(secs) => {
                    self.timeout.get_or_insert(Duration::from_secs(secs));
                }
                Err(err) => warn!("ignoring {STREAMONE_TIMEOUT} {v:?}: {err}"),
            }
        }

        self
    }

    /// Normalized endpoint, with scheme and without trailing slash.
    pub fn endpoint(&self) -> Result<String> {
        let endpoint = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("endpoint is not configured"))?;

        Ok(normalize_endpoint(endpoint))
    }

    /// Build the credential described by this config.
    ///
    /// Returns `None` when the actor or the pre-shared key is missing.
    pub fn credential(&self) -> Option<Credential> {
        let psk = self.psk.clone()?;
        let authentication_type = self.authentication_type.unwrap_or(
            if self.application.is_none() && self.user.is_some() {
                AuthenticationType::User
            } else {
                AuthenticationType::Application
            },
        );

        let cred = match authentication_type {
            AuthenticationType::Application => Credential::application(self.application.clone()?, psk),
            AuthenticationType::User => Credential::user(self.user.clone()?, psk),
        };

        Some(match &self.customer {
            Some(customer) => cred.with_customer(customer),
            None => cred,
        })
    }
}

pub(crate) fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("authentication_type", &self.authentication_type)
            .field("application", &self.application)
            .field("user", &self.user)
            .field("psk", &self.psk.as_ref().map(Redact::from))
            .field("customer", &self.customer)
            .field("timeout", &self.timeout)
            .finish()
    }
}
