//! Providers command - list the provider registry.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::Context;

/// Arguments for the providers command.
#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Show granted scopes for each service
    #[arg(long)]
    pub scopes: bool,
}

/// Run the providers command.
pub async fn run(args: ProvidersArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();

    if ctx.json_output {
        let providers: Vec<_> = registry.providers().collect();
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style("OAuth Providers").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    for provider in registry.providers() {
        println!();
        println!("{} {}", style(&provider.name).bold(), dim.apply_to(&provider.id));
        for service in &provider.services {
            let default = if service.key == provider.default_service {
                dim.apply_to(" (default)").to_string()
            } else {
                String::new()
            };
            println!(
                "  {:<12} {:<22} {}{}",
                service.id,
                service.provider_id,
                service.name,
                default
            );
            if args.scopes || ctx.verbose {
                for scope in &service.scopes {
                    println!("    {}", dim.apply_to(scope));
                }
            }
        }
    }
    Ok(())
}
