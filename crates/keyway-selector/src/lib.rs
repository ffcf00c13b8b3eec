//! Credential resolution for OAuth-backed workflow blocks.
//!
//! A block declares a provider, the scopes it needs and optionally an
//! explicit service id. This crate turns that into a concrete service id and
//! OAuth provider id ([`resolution`]), fetches the user's credentials for the
//! provider id, and keeps one selected credential per selector instance
//! ([`selector`]) according to a fixed auto-select policy ([`policy`]).

pub mod error;
pub mod policy;
pub mod resolution;
pub mod selector;

pub use error::{Result, SelectorError};
pub use policy::{AutoSelection, SelectionReason, auto_select};
pub use resolution::{
    Resolution, ResolutionRequest, ServiceSource, resolve, resolve_provider_id,
    resolve_service_id,
};
pub use selector::{
    ConnectAction, CredentialSelector, RefreshOutcome, SelectionCallback, SelectorView, ViewState,
};
