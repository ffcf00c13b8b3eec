//! Keyway - OAuth credential resolution for workflow blocks
//!
//! Main entry point for the Keyway CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod registry;

use commands::{connect, credentials, disconnect, lookup, providers, resolve, resume, select};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Keyway - OAuth credential resolution for workflow blocks
#[derive(Parser)]
#[command(name = "keyway")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Credential directory URL (default: http://localhost:3000)
    #[arg(long, global = true, env = "KEYWAY_SERVER_URL")]
    pub server: Option<String>,

    /// Load this config file instead of discovering config layers
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the service id and provider id for a block
    Resolve(resolve::ResolveArgs),

    /// Fetch credentials and apply auto-selection
    Credentials(credentials::CredentialsArgs),

    /// Select a credential by id
    Select(select::SelectArgs),

    /// Look up the display name and icon for a provider id
    Lookup(lookup::LookupArgs),

    /// List registered OAuth providers and services
    Providers(providers::ProvidersArgs),

    /// Start an OAuth sign-in to connect a new account
    Connect(connect::ConnectArgs),

    /// Complete a sign-in from its callback URL
    Resume(resume::ResumeArgs),

    /// Disconnect a provider's credentials
    Disconnect(disconnect::DisconnectArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => keyway_config::LoadedConfig {
            config: keyway_config::load_config_file(path)?,
            sources: vec![keyway_config::ConfigSource {
                path: path.clone(),
                loaded: true,
            }],
            warnings: Vec::new(),
        },
        None => keyway_config::load_config(None)?,
    };
    let logging = loaded.config.logging.clone().unwrap_or_default();

    // Console (human-readable) + rotating JSON file
    let filter = match (&logging.filter, cli.verbose) {
        (_, true) => {
            "keyway=debug,keyway_selector=debug,keyway_client=debug,keyway_oauth=debug,keyway_config=debug,info".to_string()
        }
        (Some(filter), false) => filter.clone(),
        (None, false) => {
            "keyway=info,keyway_selector=info,keyway_client=info,keyway_oauth=info,warn".to_string()
        }
    };

    let log_dir = logging
        .dir
        .clone()
        .or_else(|| keyway_config::xdg_config_dir().map(|d| d.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "keyway.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "keyway=trace,keyway_selector=trace,keyway_client=trace,keyway_oauth=trace,keyway_config=trace,info",
                )),
        )
        .init();

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::debug!(sources = ?loaded.loaded_from(), "Configuration loaded");

    // Flag and env win over the config file
    let server_url = cli
        .server
        .unwrap_or_else(|| loaded.config.server().url);

    let ctx = commands::Context {
        server_url,
        json_output: cli.json,
        verbose: cli.verbose,
        config: loaded.config,
    };

    match cli.command {
        Commands::Resolve(args) => resolve::run(args, &ctx).await,
        Commands::Credentials(args) => credentials::run(args, &ctx).await,
        Commands::Select(args) => select::run(args, &ctx).await,
        Commands::Lookup(args) => lookup::run(args, &ctx).await,
        Commands::Providers(args) => providers::run(args, &ctx).await,
        Commands::Connect(args) => connect::run(args, &ctx).await,
        Commands::Resume(args) => resume::run(args, &ctx).await,
        Commands::Disconnect(args) => disconnect::run(args, &ctx).await,
    }
}
