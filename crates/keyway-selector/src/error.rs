//! Selector error types.

/// Result type alias for selector operations.
pub type Result<T> = std::result::Result<T, SelectorError>;

/// Errors reported by a credential selector.
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    /// The id is not among the last fetched credentials.
    #[error("credential '{0}' is not available for this provider")]
    UnknownCredential(String),
}
