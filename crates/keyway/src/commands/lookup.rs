//! Lookup command - display name and icon for a provider id.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the lookup command.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Provider id (e.g. google-drive)
    pub provider_id: String,

    /// Service id to narrow the lookup
    #[arg(long)]
    pub service: Option<String>,
}

/// Run the lookup command.
pub async fn run(args: LookupArgs, ctx: &Context) -> Result<()> {
    let display = keyway_oauth::lookup_display(
        &ctx.registry(),
        &args.provider_id,
        args.service.as_deref(),
    );

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&display)?);
    } else {
        let dim = Style::new().dim();
        println!("{} {}", display.name, dim.apply_to(format!("({})", display.icon)));
        if ctx.verbose {
            println!("{}", dim.apply_to(format!("matched: {:?}", display.source)));
        }
    }
    Ok(())
}
