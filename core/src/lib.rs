//! Core components for signing and sending StreamOne API requests.
//!
//! This crate provides the foundational types and traits shared by the
//! StreamOne client crates.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for HTTP sending and environment access
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Signer**: The orchestrator that coordinates credential loading and request signing
//!
//! ## Example
//!
//! ```no_run
//! use streamone_core::{Context, Signer, ProvideCredential, SignRequest, SigningCredential, SigningRequest};
//! use async_trait::async_trait;
//! use streamone_core::Result;
//!
//! // Define your credential type
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! // Implement credential loader
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             key: "my-key".to_string(),
//!         }))
//!     }
//! }
//!
//! // Implement request signer
//! #[derive(Debug)]
//! struct MySigner;
//!
//! #[async_trait]
//! impl SignRequest for MySigner {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         req: &mut SigningRequest,
//!         cred: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         let cred = cred.expect("credential must be loaded");
//!         let signature = streamone_core::hash::hex_hmac_sha1(
//!             cred.key.as_bytes(),
//!             req.string_to_sign().as_bytes(),
//!         );
//!         req.query_push("signature", signature);
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new();
//! let signer = Signer::new(ctx, MyLoader, MySigner);
//!
//! let mut req = SigningRequest::new("/api/application/view");
//! req.form_push("limit", "3");
//! signer.sign(&mut req).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: HMAC helpers
//! - [`time`]: Time helpers
//! - [`utils`]: Data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, ProvideCredentialChain, SignRequest, SigningCredential};
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;
