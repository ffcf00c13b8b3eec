//! Service id and provider id resolution.
//!
//! Service derivation walks [`SERVICE_STRATEGIES`] in order; the first
//! strategy that yields a service id wins. When none does, the provider id
//! passes through unchanged. The same inputs always resolve the same way.

use keyway_oauth::ProviderRegistry;
use keyway_oauth::registry::split_provider_id;
use serde::Serialize;

/// What a block asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionRequest {
    /// Provider id as declared by the block (e.g. `google-sheets`).
    pub provider: String,
    /// Required OAuth scopes. May be empty.
    pub scopes: Vec<String>,
    /// Explicit service id override.
    pub service_id: Option<String>,
}

impl ResolutionRequest {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }
}

/// How the service id was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceSource {
    /// Supplied by the caller.
    Explicit,
    /// Named by a compound `base-service` provider id.
    CompoundId,
    /// A service grants every requested scope.
    ScopeCover,
    /// A service grants at least one requested scope.
    ScopeOverlap,
    /// The base provider's default service.
    DefaultService,
    /// Unregistered provider; the provider id is used as the service id.
    Passthrough,
}

/// Concrete ids for a [`ResolutionRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub service_id: String,
    pub provider_id: String,
    pub source: ServiceSource,
}

type ServiceStrategy = fn(&ProviderRegistry, &str, &[String]) -> Option<String>;

/// Derivation strategies, most specific first.
const SERVICE_STRATEGIES: &[(ServiceSource, ServiceStrategy)] = &[
    (ServiceSource::CompoundId, compound_id),
    (ServiceSource::ScopeCover, scope_cover),
    (ServiceSource::ScopeOverlap, scope_overlap),
    (ServiceSource::DefaultService, default_service),
];

/// Resolve both ids for a request.
pub fn resolve(registry: &ProviderRegistry, request: &ResolutionRequest) -> Resolution {
    let (service_id, source) = resolve_service_id(
        registry,
        &request.provider,
        &request.scopes,
        request.service_id.as_deref(),
    );
    let provider_id = resolve_provider_id(registry, &service_id);

    tracing::debug!(
        provider = %request.provider,
        service_id = %service_id,
        provider_id = %provider_id,
        ?source,
        "Resolved credential provider"
    );

    Resolution {
        service_id,
        provider_id,
        source,
    }
}

/// Resolve the service id for (provider, scopes, explicit override).
pub fn resolve_service_id(
    registry: &ProviderRegistry,
    provider: &str,
    scopes: &[String],
    explicit: Option<&str>,
) -> (String, ServiceSource) {
    if let Some(explicit) = explicit.filter(|s| !s.is_empty()) {
        return (explicit.to_string(), ServiceSource::Explicit);
    }

    SERVICE_STRATEGIES
        .iter()
        .find_map(|(source, strategy)| strategy(registry, provider, scopes).map(|id| (id, *source)))
        .unwrap_or_else(|| (provider.to_string(), ServiceSource::Passthrough))
}

/// Map a service id to the OAuth provider id its credentials live under.
///
/// A bare base provider name maps through its default service. Unknown ids
/// pass through unchanged.
pub fn resolve_provider_id(registry: &ProviderRegistry, service_id: &str) -> String {
    if let Some((_, service)) = registry.service_by_id(service_id) {
        return service.provider_id.clone();
    }

    registry
        .provider(service_id)
        .and_then(|p| p.primary_service())
        .map(|s| s.provider_id.clone())
        .unwrap_or_else(|| service_id.to_string())
}

fn compound_id(registry: &ProviderRegistry, provider: &str, _scopes: &[String]) -> Option<String> {
    let (base, rest) = split_provider_id(provider);
    let rest = rest?;
    let base = registry.provider(base)?;
    base.find_service(rest)
        .or_else(|| base.find_service(provider))
        .map(|s| s.id.clone())
}

fn scope_cover(registry: &ProviderRegistry, provider: &str, scopes: &[String]) -> Option<String> {
    if scopes.is_empty() {
        return None;
    }
    registry
        .base_provider(provider)?
        .services
        .iter()
        .find(|s| scopes.iter().all(|scope| s.grants(scope)))
        .map(|s| s.id.clone())
}

fn scope_overlap(registry: &ProviderRegistry, provider: &str, scopes: &[String]) -> Option<String> {
    registry
        .base_provider(provider)?
        .services
        .iter()
        .find(|s| scopes.iter().any(|scope| s.grants(scope)))
        .map(|s| s.id.clone())
}

fn default_service(
    registry: &ProviderRegistry,
    provider: &str,
    _scopes: &[String],
) -> Option<String> {
    registry
        .base_provider(provider)?
        .primary_service()
        .map(|s| s.id.clone())
}
