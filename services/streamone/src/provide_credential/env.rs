use crate::{Config, Credential};
use async_trait::async_trait;
use log::debug;
use streamone_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads StreamOne credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `STREAMONE_AUTHENTICATION_TYPE`: `application` or `user` (optional)
/// - `STREAMONE_APPLICATION`: The application id
/// - `STREAMONE_USER`: The user id
/// - `STREAMONE_PSK`: The pre-shared key of the application or user
/// - `STREAMONE_CUSTOMER`: The customer to act on behalf of (optional)
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let cred = Config::new().from_env(ctx).credential();
        if cred.is_none() {
            debug!("no complete StreamOne credential in environment");
        }
        Ok(cred)
    }
}
