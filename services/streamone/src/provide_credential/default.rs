use crate::provide_credential::EnvCredentialProvider;
use crate::Credential;
use async_trait::async_trait;
use streamone_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider is a loader that will try to load credential via default chains.
///
/// Resolution order:
///
/// 1. Environment variables
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new().push(EnvCredentialProvider::new());

        Self { chain }
    }

    /// Add a credential provider to the front of the default chain.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use streamone::{DefaultCredentialProvider, StaticCredentialProvider};
    ///
    /// let provider = DefaultCredentialProvider::new()
    ///     .push_front(StaticCredentialProvider::application("APPLICATION", "psk"));
    /// ```
    pub fn push_front(mut self, provider: impl ProvideCredential<Credential = Credential>) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::StaticCredentialProvider;
    use std::collections::HashMap;
    use streamone_core::StaticEnv;

    #[tokio::test]
    async fn test_default_loader_without_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::new(),
        });

        let loader = DefaultCredentialProvider::new();
        let credential = loader.provide_credential(&ctx).await.unwrap();

        assert!(credential.is_none());
    }

    #[tokio::test]
    async fn test_default_loader_with_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (STREAMONE_USER.to_string(), "user".to_string()),
                (STREAMONE_PSK.to_string(), "psk".to_string()),
            ]),
        });

        let loader = DefaultCredentialProvider::new();
        let credential = loader.provide_credential(&ctx).await.unwrap().unwrap();

        assert_eq!(credential.actor_id, "user");
        assert_eq!(credential.psk, "psk");
    }

    #[tokio::test]
    async fn test_push_front_wins() {
        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (STREAMONE_USER.to_string(), "user".to_string()),
                (STREAMONE_PSK.to_string(), "psk".to_string()),
            ]),
        });

        let loader = DefaultCredentialProvider::new()
            .push_front(StaticCredentialProvider::application("APPLICATION", "other"));
        let credential = loader.provide_credential(&ctx).await.unwrap().unwrap();

        assert_eq!(credential.actor_id, "APPLICATION");
    }
}
