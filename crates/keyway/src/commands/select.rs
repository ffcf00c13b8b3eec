//! Select command - pick a credential by id.

use anyhow::Result;
use clap::Args;
use console::Style;
use keyway_selector::RefreshOutcome;

use super::{Context, TargetArgs};

/// Arguments for the select command.
#[derive(Args, Debug)]
pub struct SelectArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Credential id to select
    pub credential: String,
}

/// Run the select command.
pub async fn run(args: SelectArgs, ctx: &Context) -> Result<()> {
    let selector = ctx.selector(&args.target)?;

    if let RefreshOutcome::Failed(e) = selector.mount().await {
        return Err(anyhow::anyhow!("Could not fetch credentials: {}", e));
    }
    selector.select(&args.credential)?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&selector.view())?);
    } else {
        let green = Style::new().green();
        println!("{} Selected: {}", green.apply_to("✓"), args.credential);
    }
    Ok(())
}
