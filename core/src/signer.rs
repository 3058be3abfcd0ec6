use crate::{Context, ProvideCredential, Result, SignRequest, SigningCredential, SigningRequest};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded lazily and cached until it reports itself as invalid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the signing logic while keeping the loader and cached credential.
    pub fn with_builder(mut self, builder: impl SignRequest<Credential = K>) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// Load the credential, reusing the cached one while it is valid.
    pub async fn credential(&self) -> Result<Option<K>> {
        let cred = self.credential.lock().expect("lock poisoned").clone();
        if cred.is_valid() {
            return Ok(cred);
        }

        let cred = self.loader.provide_credential(&self.ctx).await?;
        *self.credential.lock().expect("lock poisoned") = cred.clone();
        Ok(cred)
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut SigningRequest) -> Result<()> {
        let cred = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, cred.as_ref())
            .await
    }
}
