//! Builds the provider registry and sign-in endpoints from configuration.

use std::collections::HashMap;

use keyway_config::{KeywayConfig, ProviderConfig};
use keyway_oauth::{OAuthEndpoints, OAuthProvider, OAuthService, ProviderRegistry};

/// Built-in providers extended (or overridden) by `[[providers]]` entries.
pub fn build_registry(config: &KeywayConfig) -> ProviderRegistry {
    ProviderRegistry::builtin()
        .clone()
        .with_providers(config.providers.iter().map(provider_from_config))
}

/// Authorization endpoints keyed by provider id.
pub fn build_endpoints(config: &KeywayConfig) -> HashMap<String, OAuthEndpoints> {
    config
        .oauth
        .iter()
        .flat_map(|oauth| oauth.endpoints.iter())
        .map(|(provider, endpoint)| {
            (
                provider.clone(),
                OAuthEndpoints {
                    client_id: endpoint.client_id.clone(),
                    authorize_url: endpoint.authorize_url.clone(),
                    redirect_uri: endpoint.redirect_uri.clone(),
                },
            )
        })
        .collect()
}

fn provider_from_config(provider: &ProviderConfig) -> OAuthProvider {
    let services: Vec<OAuthService> = provider
        .services
        .iter()
        .map(|s| {
            let icon = s.icon.clone().unwrap_or_else(|| s.provider_id.clone());
            let mut service = OAuthService::new(&s.key, &s.name, &s.provider_id, icon)
                .with_scopes(s.scopes.iter().cloned());
            if let Some(id) = &s.id {
                service.id = id.clone();
            }
            service
        })
        .collect();

    let default_service = provider
        .default_service
        .clone()
        .or_else(|| services.first().map(|s| s.key.clone()))
        .unwrap_or_default();

    OAuthProvider {
        id: provider.id.clone(),
        name: provider.name.clone(),
        icon: provider.icon.clone().unwrap_or_else(|| provider.id.clone()),
        default_service,
        services,
    }
}
