//! OAuth provider registry and sign-in flow for Keyway.
//!
//! # Components
//!
//! - [`registry`] - built-in OAuth providers and their services
//! - [`display`] - name/icon lookup with a fixed fallback chain
//! - [`pkce`] - PKCE challenge, state generation, authorization URL
//! - [`pending`] - storage for OAuth requests awaiting their redirect
//! - [`signin`] - connect/resume flow tying the pieces together

pub mod display;
pub mod error;
pub mod pending;
pub mod pkce;
pub mod registry;
pub mod signin;

pub use display::{DisplaySource, ProviderDisplay, lookup_display};
pub use error::{OAuthError, Result};
pub use pending::{
    FilePendingStore, InMemoryPendingStore, PendingOAuthRequest, PendingRequestStore,
    SharedPendingStore,
};
pub use pkce::{OAuthEndpoints, PkceChallenge};
pub use registry::{GENERIC_ICON, OAuthProvider, OAuthService, ProviderRegistry};
pub use signin::{
    AuthClient, AuthorizeUrlClient, ConnectRequest, ResumedSignIn, SharedAuthClient, SignInFlow,
    SignInRedirect, SignInRequest,
};
