//! Display name and icon lookup for provider ids.
//!
//! Resolution walks [`DISPLAY_STRATEGIES`] in order and stops at the first
//! strategy that produces a result. The last strategy always succeeds, so
//! every input yields something displayable.

use serde::Serialize;

use crate::registry::{GENERIC_ICON, ProviderRegistry, split_provider_id};

/// Name shown for an empty provider id.
const UNKNOWN_PROVIDER: &str = "Unknown Provider";

/// Which strategy produced a [`ProviderDisplay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySource {
    /// Registered base provider with a registered service id.
    Exact,
    /// Compound `base-service` id matched one of the base's services.
    Compound,
    /// Only the base provider is registered.
    BaseProvider,
    /// Nothing registered; name derived from the raw id.
    Synthesized,
}

/// Display name and icon for a provider/service pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDisplay {
    pub name: String,
    pub icon: String,
    pub source: DisplaySource,
}

type DisplayStrategy = fn(&ProviderRegistry, &str, Option<&str>) -> Option<ProviderDisplay>;

/// Lookup strategies, most specific first.
const DISPLAY_STRATEGIES: &[DisplayStrategy] = &[exact, compound, base_provider];

/// Resolve a display name and icon for `provider_id`, optionally narrowed by
/// `service_id`. Never fails.
pub fn lookup_display(
    registry: &ProviderRegistry,
    provider_id: &str,
    service_id: Option<&str>,
) -> ProviderDisplay {
    let provider_id = provider_id.trim();
    let service_id = service_id.map(str::trim).filter(|s| !s.is_empty());

    DISPLAY_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(registry, provider_id, service_id))
        .unwrap_or_else(|| synthesized(provider_id))
}

fn exact(
    registry: &ProviderRegistry,
    provider_id: &str,
    service_id: Option<&str>,
) -> Option<ProviderDisplay> {
    let provider = registry.provider(provider_id)?;
    let service = provider.service(service_id?)?;
    registered(&service.name, &service.icon, DisplaySource::Exact)
}

fn compound(
    registry: &ProviderRegistry,
    provider_id: &str,
    _service_id: Option<&str>,
) -> Option<ProviderDisplay> {
    let (base, rest) = split_provider_id(provider_id);
    let rest = rest?;
    let provider = registry.provider(base)?;
    let service = provider
        .service(rest)
        .or_else(|| provider.services.iter().find(|s| s.id == provider_id))
        .or_else(|| provider.services.iter().find(|s| s.provider_id == provider_id))?;
    registered(&service.name, &service.icon, DisplaySource::Compound)
}

fn base_provider(
    registry: &ProviderRegistry,
    provider_id: &str,
    _service_id: Option<&str>,
) -> Option<ProviderDisplay> {
    let provider = registry.base_provider(provider_id)?;
    registered(&provider.name, &provider.icon, DisplaySource::BaseProvider)
}

/// A registry hit is usable only with a non-blank name. A blank icon falls
/// back to the generic one.
fn registered(name: &str, icon: &str, source: DisplaySource) -> Option<ProviderDisplay> {
    if name.trim().is_empty() {
        return None;
    }
    let icon = if icon.trim().is_empty() { GENERIC_ICON } else { icon };
    Some(ProviderDisplay {
        name: name.to_string(),
        icon: icon.to_string(),
        source,
    })
}

fn synthesized(provider_id: &str) -> ProviderDisplay {
    let name = title_case_segments(provider_id);
    ProviderDisplay {
        name: if name.is_empty() {
            UNKNOWN_PROVIDER.to_string()
        } else {
            name
        },
        icon: GENERIC_ICON.to_string(),
        source: DisplaySource::Synthesized,
    }
}

/// `my-custom-api` → `My Custom Api`. Empty segments are dropped.
fn title_case_segments(raw: &str) -> String {
    raw.split('-')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
