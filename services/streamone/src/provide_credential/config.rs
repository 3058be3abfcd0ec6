use crate::{Config, Credential};
use async_trait::async_trait;
use streamone_core::{Context, ProvideCredential, Result};

/// ConfigCredentialProvider loads the credential described by a [`Config`].
///
/// Fields left empty in the config are not filled from the environment; chain
/// an [`crate::EnvCredentialProvider`] for that.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Config,
}

impl ConfigCredentialProvider {
    /// Create a new ConfigCredentialProvider.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(self.config.credential())
    }
}
