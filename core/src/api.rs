use crate::{Context, Result, SigningRequest};
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;

/// SigningCredential is the trait used by signer as the signing key.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    ///
    /// An invalid credential is dropped from the signer cache and loaded again.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(ctx) = self else {
            return false;
        };

        ctx.is_valid()
    }
}

/// ProvideCredential is the trait used by signer to load the credential from the environment.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this loader.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load signing credential from current env.
    ///
    /// Returns `Ok(None)` when this provider has nothing to offer, so a chain
    /// can move on to the next one.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// SignRequest is the trait used by signer to sign the request.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place.
    ///
    /// Implementations add their authentication parameters to `req` and push
    /// the computed signature last.
    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut SigningRequest,
        credential: Option<&Self::Credential>,
    ) -> Result<()>;
}

/// ProvideCredentialChain tries a list of providers in order and returns the
/// first credential found.
pub struct ProvideCredentialChain<C> {
    providers: Vec<Arc<dyn ProvideCredential<Credential = C>>>,
}

impl<C> Default for ProvideCredentialChain<C> {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
        }
    }
}

impl<C> Debug for ProvideCredentialChain<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvideCredentialChain")
            .field("providers", &self.providers)
            .finish()
    }
}

impl<C: Send + Sync + Unpin + 'static> ProvideCredentialChain<C> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider to the end of the chain.
    pub fn push(mut self, provider: impl ProvideCredential<Credential = C>) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Insert a provider at the front of the chain.
    pub fn push_front(mut self, provider: impl ProvideCredential<Credential = C>) -> Self {
        self.providers.insert(0, Arc::new(provider));
        self
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait::async_trait]
impl<C: Send + Sync + Unpin + 'static> ProvideCredential for ProvideCredentialChain<C> {
    type Credential = C;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        for provider in &self.providers {
            debug!("trying credential provider: {provider:?}");
            if let Some(cred) = provider.provide_credential(ctx).await? {
                return Ok(Some(cred));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(Option<&'static str>);

    #[async_trait::async_trait]
    impl ProvideCredential for Fixed {
        type Credential = String;

        async fn provide_credential(&self, _: &Context) -> Result<Option<String>> {
            Ok(self.0.map(|v| v.to_string()))
        }
    }

    #[tokio::test]
    async fn test_chain_returns_first_hit() -> Result<()> {
        let chain = ProvideCredentialChain::new()
            .push(Fixed(None))
            .push(Fixed(Some("second")))
            .push(Fixed(Some("third")));
        assert_eq!(chain.len(), 3);

        let cred = chain.provide_credential(&Context::new()).await?;
        assert_eq!(cred.as_deref(), Some("second"));
        Ok(())
    }

    #[tokio::test]
    async fn test_chain_push_front() -> Result<()> {
        let chain = ProvideCredentialChain::new()
            .push(Fixed(Some("default")))
            .push_front(Fixed(Some("override")));

        let cred = chain.provide_credential(&Context::new()).await?;
        assert_eq!(cred.as_deref(), Some("override"));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_chain() -> Result<()> {
        let chain: ProvideCredentialChain<String> = ProvideCredentialChain::new();
        assert!(chain.is_empty());
        assert!(chain.provide_credential(&Context::new()).await?.is_none());
        Ok(())
    }
}
