//! StreamOne API client
//!
//! Requests are signed with `HMAC-SHA1` over the path and the sorted
//! parameters and arguments, posted as a form, and resolve to an [`Outcome`].
//!
//! ```no_run
//! use streamone::{Client, Config, Outcome, RequestSpec};
//! use streamone_core::{Context, OsEnv};
//! use streamone_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> streamone_core::Result<()> {
//! let ctx = Context::new()
//!     .with_env(OsEnv)
//!     .with_http_send(ReqwestHttpSend::default());
//! let client = Client::from_config(
//!     ctx,
//!     Config::new()
//!         .with_endpoint("https://api.streamone.nl")
//!         .with_application("APPLICATION")
//!         .with_psk("AAAAABBBBBCCCCCDDDDD000000111111222222"),
//! )?;
//!
//! let spec = RequestSpec::builder("application", "view")
//!     .argument("application", "APPLICATION")
//!     .build()?;
//! match client.send(&spec).await? {
//!     Outcome::Success(env) => println!("{:?}", env.body_items()),
//!     Outcome::ApplicationError(env) => println!("failed: {}", env.status_message()),
//!     Outcome::LostConnection(err) => println!("lost connection: {err}"),
//! }
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::AuthenticationType;
pub use credential::Credential;

mod envelope;
pub use envelope::ResponseEnvelope;
pub use envelope::ResponseHeader;
pub use envelope::STATUS_UNRECOGNIZED;

mod session;
pub use session::SessionChallenge;
pub use session::SessionToken;

mod request_spec;
pub use request_spec::RequestSpec;
pub use request_spec::RequestSpecBuilder;

mod sign_request;
pub use sign_request::RequestSigner;
pub use sign_request::SignedRequest;

mod provide_credential;
pub use provide_credential::*;

mod client;
pub use client::Client;
pub use client::Outcome;
