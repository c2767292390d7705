//! # objectscale-client
//!
//! Typed async client for the ObjectScale management REST API.
//!
//! Every resource client sits on top of one [`RemoteCaller`]. The HTTP
//! implementation joins paths onto the endpoint, attaches the session token,
//! renews an expired session once (coalescing concurrent renewals) and maps
//! failures onto a single [`Error`] type.
//!
//! ## Quick Start
//!
//! ```no_run
//! use objectscale_client::{AlertPolicyApi, ClientConfig, ClientSet, ObjectUserApi};
//! use objectscale_client::types::ListParams;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://objectscale.local:4443")
//!         .with_credentials("root", "ChangeMe");
//!     let client = ClientSet::from_config(&config)?;
//!
//!     for policy in client.alert_policies().list().await? {
//!         println!("{} enabled={}", policy.policy_name, policy.is_enabled);
//!     }
//!
//!     let page = client.object_users().list(&ListParams::default()).await?;
//!     println!("{} users", page.users.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Custom transports
//!
//! Resource clients only need an `Arc<dyn RemoteCaller>`, so tests and
//! alternative transports can implement [`RemoteCaller::execute`] directly.

pub mod alert_policy;
pub mod auth;
pub mod caller;
pub mod client;
pub mod codec;
pub mod config;
pub mod crr;
pub mod error;
pub mod object_user;
pub mod request;
pub mod status;
pub mod types;

pub use alert_policy::{AlertPolicyApi, AlertPolicyClient};
pub use auth::{Authenticator, Login, PasswordLogin, Session, SessionAuthenticator, StaticToken};
pub use caller::{HttpRemoteCaller, HttpRemoteCallerBuilder, RemoteCaller, RemoteCallerExt};
pub use client::ClientSet;
pub use config::{ClientConfig, TlsVerification};
pub use crr::{CrrAction, CrrApi, CrrClient};
pub use error::{Error, Result};
pub use object_user::{ObjectUserApi, ObjectUserClient};
pub use request::{ContentType, Method, Request};
pub use status::{StatusApi, StatusClient};
