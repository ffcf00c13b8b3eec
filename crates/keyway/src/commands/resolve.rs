//! Resolve command - show how a block's provider resolves.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::{Context, TargetArgs};

/// Arguments for the resolve command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run the resolve command.
pub async fn run(args: ResolveArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();
    let resolution = keyway_selector::resolve(&registry, &args.target.to_request());
    let display = keyway_oauth::lookup_display(
        &registry,
        &resolution.provider_id,
        Some(&resolution.service_id),
    );

    if ctx.json_output {
        let output = serde_json::json!({
            "serviceId": resolution.service_id,
            "providerId": resolution.provider_id,
            "source": resolution.source,
            "display": display,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style("Resolution").bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!("  Service:   {}", resolution.service_id);
    println!("  Provider:  {}", resolution.provider_id);
    println!("  Name:      {} {}", display.name, dim.apply_to(format!("({})", display.icon)));
    if ctx.verbose {
        println!("  Via:       {}", dim.apply_to(format!("{:?}", resolution.source)));
    }

    Ok(())
}
