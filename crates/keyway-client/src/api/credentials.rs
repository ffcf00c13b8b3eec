//! OAuth credentials API.

use serde::{Deserialize, Serialize};

use crate::client::KeywayClient;
use crate::error::Result;
use keyway_types::{Credential, CredentialsResponse};

/// Query parameters for listing credentials.
#[derive(Debug, Serialize)]
struct ListCredentialsQuery<'a> {
    provider: &'a str,
}

/// Request to disconnect a provider's credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    /// Base provider (e.g. `google`).
    pub provider: String,
    /// Specific OAuth provider id to disconnect. All of the base's
    /// credentials are removed when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// Response to a disconnect request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisconnectResponse {
    #[serde(default)]
    pub success: bool,
}

/// Credentials API client.
pub struct CredentialsApi {
    client: KeywayClient,
}

impl CredentialsApi {
    pub(crate) fn new(client: KeywayClient) -> Self {
        Self { client }
    }

    /// List credentials issued under `provider_id`, in server order.
    pub async fn list(&self, provider_id: &str) -> Result<Vec<Credential>> {
        let response: CredentialsResponse = self
            .client
            .get_with_query(
                "auth/oauth/credentials",
                &ListCredentialsQuery {
                    provider: provider_id,
                },
            )
            .await?;
        tracing::debug!(
            provider_id,
            count = response.credentials.len(),
            "Fetched credentials"
        );
        Ok(response.credentials)
    }

    /// Disconnect credentials for a provider.
    pub async fn disconnect(&self, request: DisconnectRequest) -> Result<DisconnectResponse> {
        self.client.post("auth/oauth/disconnect", &request).await
    }
}
