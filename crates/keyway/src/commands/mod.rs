//! CLI command handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::Style;
use keyway_client::KeywayClient;
use keyway_config::KeywayConfig;
use keyway_oauth::{AuthorizeUrlClient, FilePendingStore, ProviderRegistry, SignInFlow};
use keyway_selector::{CredentialSelector, ResolutionRequest};

use crate::registry;

pub mod connect;
pub mod credentials;
pub mod disconnect;
pub mod lookup;
pub mod providers;
pub mod resolve;
pub mod resume;
pub mod select;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Credential directory URL.
    pub server_url: String,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Merged configuration.
    pub config: KeywayConfig,
}

impl Context {
    /// HTTP client for the credential directory.
    pub fn client(&self) -> Result<KeywayClient> {
        let server = self.config.server();
        let mut builder = KeywayClient::builder()
            .base_url(&self.server_url)
            .timeout(Duration::from_secs(server.timeout_secs));

        if let Some(token) = keyway_config::resolve_server_token(&server) {
            tracing::debug!(source = %token.source, "Using directory token");
            builder = builder.auth_token(token.value);
        }

        Ok(builder.build()?)
    }

    /// Provider registry including configured providers.
    pub fn registry(&self) -> ProviderRegistry {
        registry::build_registry(&self.config)
    }

    /// Connect/resume flow backed by the pending request file.
    pub fn sign_in_flow(&self) -> Result<SignInFlow> {
        let data_dir = self
            .config
            .oauth
            .as_ref()
            .and_then(|o| o.data_dir.clone())
            .or_else(keyway_config::xdg_config_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let store = Arc::new(FilePendingStore::new(&data_dir));
        let auth = Arc::new(AuthorizeUrlClient::new(registry::build_endpoints(
            &self.config,
        )));
        Ok(SignInFlow::new(store, auth))
    }

    /// Selector over the HTTP directory for `target`.
    pub fn selector(&self, target: &TargetArgs) -> Result<CredentialSelector> {
        let client = Arc::new(self.client()?);
        Ok(CredentialSelector::new(
            client,
            &self.registry(),
            &target.to_request(),
        ))
    }
}

/// Block inputs shared by the resolution commands.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Provider id declared by the block (e.g. google-sheets)
    pub provider: String,

    /// Required OAuth scope (repeatable)
    #[arg(short, long = "scope")]
    pub scopes: Vec<String>,

    /// Explicit service id override
    #[arg(long)]
    pub service: Option<String>,
}

impl TargetArgs {
    pub fn to_request(&self) -> ResolutionRequest {
        let request = ResolutionRequest::new(&self.provider).with_scopes(self.scopes.iter().cloned());
        match &self.service {
            Some(service) => request.with_service_id(service),
            None => request,
        }
    }
}

/// Print an error line in the standard style.
pub(crate) fn print_error(message: impl std::fmt::Display) {
    let red = Style::new().red();
    eprintln!("{} {}", red.apply_to("Error:"), message);
}
