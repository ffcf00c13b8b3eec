//! HTTP client for the workflow builder's OAuth credential directory.
//!
//! # Example
//!
//! ```no_run
//! use keyway_client::{KeywayClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = KeywayClient::builder()
//!     .base_url("http://localhost:3000")
//!     .auth_token("secret")
//!     .build()?;
//!
//! let credentials = client.credentials().list("google-sheets").await?;
//! for credential in &credentials {
//!     println!("{} ({})", credential.name, credential.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`KeywayClient`] also implements [`keyway_types::CredentialDirectory`], so
//! it can back a credential selector directly.

pub mod api;
pub mod client;
pub mod error;

pub use api::{CredentialsApi, DisconnectRequest, DisconnectResponse};
pub use client::{ClientBuilder, KeywayClient};
pub use error::{Error, Result};
pub use keyway_types::{Credential, CredentialsResponse};
