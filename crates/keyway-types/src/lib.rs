//! Shared types for Keyway credential resolution.
//!
//! The credential model and the directory trait live here so that the HTTP
//! client (`keyway-client`) and the selector (`keyway-selector`) can meet
//! without depending on each other.

pub mod credential;
pub mod directory;

pub use credential::{Credential, CredentialsResponse};
pub use directory::{CredentialDirectory, DirectoryError, SharedCredentialDirectory};
