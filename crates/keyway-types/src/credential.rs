//! Credential model as served by the credential directory.

use serde::{Deserialize, Serialize};

/// A stored, user-authorized OAuth grant.
///
/// Owned by the external credential store. Callers hold read-only copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Unique credential id.
    pub id: String,
    /// Display name (usually the account email or handle).
    pub name: String,
    /// OAuth provider id this credential was issued for.
    pub provider: String,
    /// Whether the user marked this credential as their default.
    #[serde(default)]
    pub is_default: bool,
    /// Service the credential was created through, if the directory knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Last time a block used the credential (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<String>,
}

impl Credential {
    /// Create a credential with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider: provider.into(),
            is_default: false,
            service_id: None,
            last_used: None,
        }
    }

    /// Mark the credential as the user's default.
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

/// Body of the credential listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsResponse {
    #[serde(default)]
    pub credentials: Vec<Credential>,
}
