//! Per-block credential selector.
//!
//! A selector owns the fetched credential list and the current selection for
//! one block. Every fetch takes a request token; a response is applied only
//! if its token is still the latest when it arrives, so an older response
//! can never overwrite a newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use keyway_oauth::{ConnectRequest, ProviderDisplay, ProviderRegistry, lookup_display};
use keyway_types::{Credential, DirectoryError, SharedCredentialDirectory};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SelectorError};
use crate::policy::{SelectionReason, auto_select};
use crate::resolution::{Resolution, ResolutionRequest, resolve};

/// Invoked with the new selection (empty string when cleared).
pub type SelectionCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// What happened to a single fetch.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The response was applied and the policy ran.
    Applied {
        selected: Option<String>,
        reason: SelectionReason,
        changed: bool,
    },
    /// A newer fetch started before this one finished; the response was dropped.
    Stale { token: u64 },
    /// The directory call failed; selection and cached list are unchanged.
    Failed(DirectoryError),
}

/// Action offered when no credentials exist for the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectAction {
    pub service_id: String,
    pub provider_id: String,
    pub provider_name: String,
    pub icon: String,
    pub scopes: Vec<String>,
}

/// What the selector should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewState {
    /// A fetch is outstanding and nothing is cached yet.
    Loading,
    /// No credentials; offer to connect an account.
    Empty { connect: ConnectAction },
    /// Credentials are available to pick from.
    Ready,
}

/// Point-in-time snapshot of a selector.
#[derive(Debug, Clone, Serialize)]
pub struct SelectorView {
    pub service_id: String,
    pub provider_id: String,
    pub display: ProviderDisplay,
    pub credentials: Vec<Credential>,
    pub selected: Option<String>,
    pub loading: bool,
    pub state: ViewState,
}

#[derive(Debug, Default)]
struct SelectorState {
    credentials: Vec<Credential>,
    selected: Option<String>,
    loading: bool,
}

/// Clears `loading` when a refresh ends, including when its future is
/// dropped mid-flight, unless a newer refresh has taken over.
struct LoadingGuard<'a> {
    selector: &'a CredentialSelector,
    token: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.selector.state.lock();
        if self.selector.latest_token.load(Ordering::SeqCst) == self.token {
            state.loading = false;
        }
    }
}

/// Credential selector for one block instance.
pub struct CredentialSelector {
    directory: SharedCredentialDirectory,
    resolution: Resolution,
    scopes: Vec<String>,
    display: ProviderDisplay,
    state: Mutex<SelectorState>,
    latest_token: AtomicU64,
    on_change: Option<SelectionCallback>,
}

impl std::fmt::Debug for CredentialSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSelector")
            .field("resolution", &self.resolution)
            .field("state", &*self.state.lock())
            .field("latest_token", &self.latest_token.load(Ordering::SeqCst))
            .finish()
    }
}

impl CredentialSelector {
    /// Resolve the request against `registry` and build an idle selector.
    pub fn new(
        directory: SharedCredentialDirectory,
        registry: &ProviderRegistry,
        request: &ResolutionRequest,
    ) -> Self {
        let resolution = resolve(registry, request);
        let display = lookup_display(
            registry,
            &resolution.provider_id,
            Some(&resolution.service_id),
        );

        Self {
            directory,
            resolution,
            scopes: request.scopes.clone(),
            display,
            state: Mutex::new(SelectorState::default()),
            latest_token: AtomicU64::new(0),
            on_change: None,
        }
    }

    /// Seed the selection persisted by the workflow.
    ///
    /// The value is not checked until the first fetch applies the policy.
    pub fn with_selection(self, selected: impl Into<String>) -> Self {
        let selected = selected.into();
        self.state.lock().selected = (!selected.is_empty()).then_some(selected);
        self
    }

    /// Register the selection change callback.
    pub fn on_change(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(callback));
        self
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn selected(&self) -> Option<String> {
        self.state.lock().selected.clone()
    }

    /// First fetch after the block is shown.
    pub async fn mount(&self) -> RefreshOutcome {
        debug!(provider_id = %self.resolution.provider_id, "Credential selector mounted");
        self.refresh().await
    }

    /// The dropdown was opened; fetch again so new connections show up.
    pub async fn open(&self) -> RefreshOutcome {
        debug!(provider_id = %self.resolution.provider_id, "Credential selector opened");
        self.refresh().await
    }

    /// Fetch credentials for the resolved provider id and apply the policy.
    pub async fn refresh(&self) -> RefreshOutcome {
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().loading = true;
        let _loading = LoadingGuard {
            selector: self,
            token,
        };

        let result = self
            .directory
            .list_credentials(&self.resolution.provider_id)
            .await;

        let (outcome, notify) = {
            let mut state = self.state.lock();
            if self.latest_token.load(Ordering::SeqCst) != token {
                debug!(token, "Discarding stale credential response");
                return RefreshOutcome::Stale { token };
            }
            state.loading = false;

            match result {
                Ok(credentials) => {
                    let pick = auto_select(state.selected.as_deref(), &credentials);
                    let changed = state.selected != pick.selected;
                    debug!(
                        provider_id = %self.resolution.provider_id,
                        count = credentials.len(),
                        reason = ?pick.reason,
                        changed,
                        "Fetched credentials"
                    );
                    state.credentials = credentials;
                    state.selected = pick.selected.clone();

                    let notify = changed.then(|| pick.selected.clone().unwrap_or_default());
                    let outcome = RefreshOutcome::Applied {
                        selected: pick.selected,
                        reason: pick.reason,
                        changed,
                    };
                    (outcome, notify)
                }
                Err(e) => {
                    warn!(
                        provider_id = %self.resolution.provider_id,
                        error = %e,
                        "Failed to fetch credentials"
                    );
                    (RefreshOutcome::Failed(e), None)
                }
            }
        };

        if let Some(selected) = notify {
            self.notify(&selected);
        }
        outcome
    }

    /// Select a credential from the cached list.
    pub fn select(&self, credential_id: &str) -> Result<()> {
        let changed = {
            let mut state = self.state.lock();
            if !state.credentials.iter().any(|c| c.id == credential_id) {
                return Err(SelectorError::UnknownCredential(credential_id.to_string()));
            }
            let changed = state.selected.as_deref() != Some(credential_id);
            state.selected = Some(credential_id.to_string());
            changed
        };

        if changed {
            info!(credential_id, "Credential selected");
            self.notify(credential_id);
        }
        Ok(())
    }

    /// Clear the selection.
    pub fn clear(&self) {
        let changed = self.state.lock().selected.take().is_some();
        if changed {
            self.notify("");
        }
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> SelectorView {
        let state = self.state.lock();
        let view_state = match (state.credentials.is_empty(), state.loading) {
            (false, _) => ViewState::Ready,
            (true, true) => ViewState::Loading,
            (true, false) => ViewState::Empty {
                connect: self.connect_action(),
            },
        };

        SelectorView {
            service_id: self.resolution.service_id.clone(),
            provider_id: self.resolution.provider_id.clone(),
            display: self.display.clone(),
            credentials: state.credentials.clone(),
            selected: state.selected.clone(),
            loading: state.loading,
            state: view_state,
        }
    }

    /// Connect action for the empty state.
    pub fn connect_action(&self) -> ConnectAction {
        ConnectAction {
            service_id: self.resolution.service_id.clone(),
            provider_id: self.resolution.provider_id.clone(),
            provider_name: self.display.name.clone(),
            icon: self.display.icon.clone(),
            scopes: self.scopes.clone(),
        }
    }

    /// Sign-in request for connecting a new account, returning to `return_url`.
    pub fn connect_request(&self, return_url: impl Into<String>) -> ConnectRequest {
        ConnectRequest {
            service_id: self.resolution.service_id.clone(),
            provider_id: self.resolution.provider_id.clone(),
            requested_scopes: self.scopes.clone(),
            return_url: return_url.into(),
        }
    }

    fn notify(&self, selected: &str) {
        if let Some(callback) = &self.on_change {
            callback(selected);
        }
    }
}
