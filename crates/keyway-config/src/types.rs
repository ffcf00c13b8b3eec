//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]                     # credential directory connection
//! url = "http://localhost:3000"
//! token_env = "KEYWAY_API_TOKEN"
//!
//! [oauth]
//! callback_url = "http://localhost:3000/workspace"
//!
//! [oauth.endpoints.google]     # per-provider authorization endpoints
//! client_id = "..."
//! authorize_url = "https://accounts.google.com/o/oauth2/v2/auth"
//!
//! [[providers]]                # extra registry entries
//! id = "acme"
//! name = "Acme"
//! default_service = "crm"
//!
//! [[providers.services]]
//! key = "crm"
//! name = "Acme CRM"
//! provider_id = "acme-crm"
//! scopes = ["crm.read"]
//!
//! [logging]
//! filter = "keyway=debug"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default credential directory URL.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Default environment variable holding the directory bearer token.
pub const DEFAULT_TOKEN_ENV: &str = "KEYWAY_API_TOKEN";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywayConfig {
    /// Credential directory connection.
    pub server: Option<ServerConfig>,

    /// OAuth sign-in settings.
    pub oauth: Option<OAuthConfig>,

    /// Extra providers merged into the built-in registry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderConfig>,

    /// Log filter settings.
    pub logging: Option<LoggingConfig>,
}

impl KeywayConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections replace wholesale. Providers merge by id, and OAuth endpoints
    /// merge by provider key.
    pub fn merge(&mut self, other: KeywayConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if let Some(incoming) = other.oauth {
            match self.oauth.as_mut() {
                Some(existing) => existing.merge(incoming),
                None => self.oauth = Some(incoming),
            }
        }

        for provider in other.providers {
            match self.providers.iter_mut().find(|p| p.id == provider.id) {
                Some(existing) => *existing = provider,
                None => self.providers.push(provider),
            }
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Server settings, or defaults when the section is absent.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Reject provider entries the registry could not use.
    pub fn validate(&self) -> Result<()> {
        for provider in &self.providers {
            provider.validate()?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Credential directory connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the workflow builder serving the credentials endpoint.
    pub url: String,
    /// Environment variable holding the bearer token.
    pub token_env: String,
    /// Plaintext bearer token. Prefer `token_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OAuth Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// OAuth sign-in settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Page to return to after sign-in when the caller gives none.
    pub callback_url: Option<String>,
    /// Directory for pending sign-in state. Defaults to the config dir.
    pub data_dir: Option<PathBuf>,
    /// Authorization endpoints keyed by provider id or base provider.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, EndpointConfig>,
}

impl OAuthConfig {
    fn merge(&mut self, other: OAuthConfig) {
        if other.callback_url.is_some() {
            self.callback_url = other.callback_url;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        self.endpoints.extend(other.endpoints);
    }
}

/// Authorization endpoints for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub client_id: String,
    pub authorize_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider Registry Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// An OAuth provider entry (`[[providers]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base provider name.
    pub id: String,
    pub name: String,
    /// Icon identifier. Defaults to the provider id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Default service key. Defaults to the first service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_service: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

impl ProviderConfig {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ConfigError::InvalidProvider {
            provider: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.services.is_empty() {
            return Err(invalid("at least one service is required"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be blank"));
        }
        if self.icon.as_deref().is_some_and(|i| i.trim().is_empty()) {
            return Err(invalid("icon must not be blank"));
        }
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(invalid(&format!("service '{}' has a blank name", service.key)));
            }
            if service.icon.as_deref().is_some_and(|i| i.trim().is_empty()) {
                return Err(invalid(&format!("service '{}' has a blank icon", service.key)));
            }
        }
        if let Some(default) = &self.default_service
            && !self.services.iter().any(|s| &s.key == default)
        {
            return Err(invalid(&format!(
                "default_service '{}' is not one of its services",
                default
            )));
        }
        Ok(())
    }
}

/// A service under a configured provider (`[[providers.services]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub key: String,
    /// Service id. Defaults to `key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub provider_id: String,
    /// Icon identifier. Defaults to `provider_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive for the console layer.
    pub filter: Option<String>,
    /// Directory for the rolling JSON log. Defaults to `<config dir>/logs`.
    pub dir: Option<PathBuf>,
}
