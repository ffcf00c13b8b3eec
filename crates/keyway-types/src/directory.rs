//! Credential directory abstraction.
//!
//! The directory is the external store that owns credentials. The HTTP
//! implementation lives in `keyway-client`; tests use in-process fakes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::credential::Credential;

/// Errors a credential directory can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    /// The directory could not be reached.
    #[error("directory unreachable: {0}")]
    Unreachable(String),

    /// The directory answered with a non-success status.
    #[error("directory returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed directory response: {0}")]
    Malformed(String),
}

/// Source of the credentials a user has stored for an OAuth provider.
#[async_trait]
pub trait CredentialDirectory: Send + Sync {
    /// List all credentials issued for `provider_id`, in directory order.
    async fn list_credentials(&self, provider_id: &str)
    -> Result<Vec<Credential>, DirectoryError>;
}

/// Shared directory handle for use across crates.
pub type SharedCredentialDirectory = Arc<dyn CredentialDirectory>;

#[async_trait]
impl<T: CredentialDirectory + ?Sized> CredentialDirectory for Arc<T> {
    async fn list_credentials(
        &self,
        provider_id: &str,
    ) -> Result<Vec<Credential>, DirectoryError> {
        (**self).list_credentials(provider_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Credential>);

    #[async_trait]
    impl CredentialDirectory for Fixed {
        async fn list_credentials(
            &self,
            provider_id: &str,
        ) -> Result<Vec<Credential>, DirectoryError> {
            Ok(self
                .0
                .iter()
                .filter(|c| c.provider == provider_id)
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn test_shared_directory_delegates() {
        let shared: SharedCredentialDirectory = Arc::new(Fixed(vec![
            Credential::new("a", "A", "google-drive"),
            Credential::new("b", "B", "github-repo"),
        ]));

        let creds = shared.list_credentials("google-drive").await.unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].id, "a");
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "directory returned status 503: unavailable");
    }
}
