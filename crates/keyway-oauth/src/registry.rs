//! OAuth provider registry.
//!
//! A provider (e.g. `google`) offers one or more services (e.g. `sheets`),
//! each bound to its own OAuth provider id (e.g. `google-sheets`) and scope
//! set. The built-in registry is process-wide and read-only; callers that
//! need extra providers clone it and extend the copy before sharing.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Icon used when nothing more specific is registered.
pub const GENERIC_ICON: &str = "key";

/// A scoped capability offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthService {
    /// Key within the provider's service map (e.g. `sheets`).
    pub key: String,
    /// Service id as referenced by blocks. Usually equal to `key`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// OAuth provider id credentials for this service are issued under.
    pub provider_id: String,
    /// Icon identifier.
    pub icon: String,
    /// Scopes this service grants.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl OAuthService {
    /// Create a service whose id equals its key.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        provider_id: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        let key = key.into();
        Self {
            id: key.clone(),
            key,
            name: name.into(),
            provider_id: provider_id.into(),
            icon: icon.into(),
            scopes: Vec::new(),
        }
    }

    /// Set the granted scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this service grants `scope`.
    pub fn grants(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// A base OAuth provider and its services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthProvider {
    /// Base provider name (e.g. `google`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Icon identifier.
    pub icon: String,
    /// Key of the service used when nothing narrows the choice.
    pub default_service: String,
    /// Services in registration order.
    pub services: Vec<OAuthService>,
}

impl OAuthProvider {
    /// Look up a service by its map key.
    pub fn service(&self, key: &str) -> Option<&OAuthService> {
        self.services.iter().find(|s| s.key == key)
    }

    /// Look up a service by key, id, or provider id field, in that order.
    pub fn find_service(&self, needle: &str) -> Option<&OAuthService> {
        self.services
            .iter()
            .find(|s| s.key == needle)
            .or_else(|| self.services.iter().find(|s| s.id == needle))
            .or_else(|| self.services.iter().find(|s| s.provider_id == needle))
    }

    /// The declared default service, falling back to the first registered.
    pub fn primary_service(&self) -> Option<&OAuthService> {
        self.service(&self.default_service)
            .or_else(|| self.services.first())
    }
}

/// Split a provider id into its base and the remainder after the first dash.
///
/// `google-sheets` → (`google`, `Some("sheets")`), `slack` → (`slack`, `None`).
pub fn split_provider_id(provider_id: &str) -> (&str, Option<&str>) {
    match provider_id.split_once('-') {
        Some((base, rest)) if !base.is_empty() && !rest.is_empty() => (base, Some(rest)),
        _ => (provider_id, None),
    }
}

/// Ordered collection of OAuth providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<OAuthProvider>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Build a registry from providers. Later duplicates replace earlier ones.
    pub fn new(providers: impl IntoIterator<Item = OAuthProvider>) -> Self {
        let mut registry = Self::default();
        for provider in providers {
            registry.insert(provider);
        }
        registry
    }

    /// The process-wide built-in registry.
    pub fn builtin() -> &'static ProviderRegistry {
        static REGISTRY: OnceLock<ProviderRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| ProviderRegistry::new(builtin_providers()))
    }

    /// Return a copy extended with `extra` providers.
    ///
    /// A provider whose id is already registered replaces the existing entry
    /// in place; new ids are appended.
    pub fn with_providers(mut self, extra: impl IntoIterator<Item = OAuthProvider>) -> Self {
        for provider in extra {
            self.insert(provider);
        }
        self
    }

    fn insert(&mut self, provider: OAuthProvider) {
        match self.index.get(&provider.id) {
            Some(&idx) => self.providers[idx] = provider,
            None => {
                self.index.insert(provider.id.clone(), self.providers.len());
                self.providers.push(provider);
            }
        }
    }

    /// Look up a base provider by name.
    pub fn provider(&self, base: &str) -> Option<&OAuthProvider> {
        self.index.get(base).map(|&idx| &self.providers[idx])
    }

    /// All providers in registration order.
    pub fn providers(&self) -> impl Iterator<Item = &OAuthProvider> {
        self.providers.iter()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The base provider for a possibly compound provider id.
    ///
    /// Tries the whole id first so that registered names containing a dash
    /// still resolve.
    pub fn base_provider(&self, provider_id: &str) -> Option<&OAuthProvider> {
        self.provider(provider_id)
            .or_else(|| self.provider(split_provider_id(provider_id).0))
    }

    /// Find the service registered under `service_id` (matched by id, then
    /// key) across all providers.
    pub fn service_by_id(&self, service_id: &str) -> Option<(&OAuthProvider, &OAuthService)> {
        self.providers
            .iter()
            .find_map(|p| p.services.iter().find(|s| s.id == service_id).map(|s| (p, s)))
            .or_else(|| {
                self.providers.iter().find_map(|p| {
                    p.services
                        .iter()
                        .find(|s| s.key == service_id)
                        .map(|s| (p, s))
                })
            })
    }
}

fn service(key: &str, name: &str, provider_id: &str, scopes: &[&str]) -> OAuthService {
    OAuthService::new(key, name, provider_id, provider_id).with_scopes(scopes.iter().copied())
}

fn provider(id: &str, name: &str, default_service: &str, services: Vec<OAuthService>) -> OAuthProvider {
    OAuthProvider {
        id: id.to_string(),
        name: name.to_string(),
        icon: id.to_string(),
        default_service: default_service.to_string(),
        services,
    }
}

fn builtin_providers() -> Vec<OAuthProvider> {
    vec![
        provider(
            "google",
            "Google",
            "gmail",
            vec![
                service(
                    "gmail",
                    "Gmail",
                    "google-email",
                    &[
                        "https://www.googleapis.com/auth/gmail.send",
                        "https://www.googleapis.com/auth/gmail.modify",
                        "https://www.googleapis.com/auth/gmail.labels",
                    ],
                ),
                service(
                    "drive",
                    "Google Drive",
                    "google-drive",
                    &["https://www.googleapis.com/auth/drive.file"],
                ),
                service(
                    "docs",
                    "Google Docs",
                    "google-docs",
                    &["https://www.googleapis.com/auth/drive.file"],
                ),
                service(
                    "sheets",
                    "Google Sheets",
                    "google-sheets",
                    &[
                        "https://www.googleapis.com/auth/drive.file",
                        "https://www.googleapis.com/auth/spreadsheets",
                    ],
                ),
                service(
                    "calendar",
                    "Google Calendar",
                    "google-calendar",
                    &["https://www.googleapis.com/auth/calendar"],
                ),
            ],
        ),
        provider(
            "microsoft",
            "Microsoft",
            "outlook",
            vec![
                service(
                    "outlook",
                    "Outlook",
                    "microsoft-outlook",
                    &["Mail.ReadWrite", "Mail.Send", "offline_access"],
                ),
                service(
                    "teams",
                    "Microsoft Teams",
                    "microsoft-teams",
                    &["ChannelMessage.Send", "Chat.ReadWrite", "offline_access"],
                ),
                service(
                    "excel",
                    "Microsoft Excel",
                    "microsoft-excel",
                    &["Files.ReadWrite", "offline_access"],
                ),
            ],
        ),
        provider(
            "github",
            "GitHub",
            "repo",
            vec![service(
                "repo",
                "GitHub",
                "github-repo",
                &["repo", "user:email", "read:user", "workflow"],
            )],
        ),
        provider(
            "slack",
            "Slack",
            "slack",
            vec![service(
                "slack",
                "Slack",
                "slack",
                &["channels:read", "chat:write", "chat:write.public", "users:read"],
            )],
        ),
        provider(
            "notion",
            "Notion",
            "notion",
            vec![service(
                "notion",
                "Notion",
                "notion",
                &["workspace.content", "workspace.name", "page.read", "page.write"],
            )],
        ),
        provider(
            "x",
            "X",
            "x",
            vec![service(
                "x",
                "X",
                "x",
                &["tweet.read", "tweet.write", "users.read", "offline.access"],
            )],
        ),
        provider(
            "linear",
            "Linear",
            "linear",
            vec![service("linear", "Linear", "linear", &["read", "write"])],
        ),
        provider(
            "airtable",
            "Airtable",
            "airtable",
            vec![service(
                "airtable",
                "Airtable",
                "airtable",
                &["data.records:read", "data.records:write"],
            )],
        ),
    ]
}
