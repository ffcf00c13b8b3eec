//! API endpoint implementations.

mod credentials;

pub use credentials::{CredentialsApi, DisconnectRequest, DisconnectResponse};
