//! Disconnect command - remove a provider's stored credentials.

use anyhow::Result;
use clap::Args;
use console::Style;
use keyway_client::DisconnectRequest;

use super::Context;

/// Arguments for the disconnect command.
#[derive(Args, Debug)]
pub struct DisconnectArgs {
    /// Base provider (e.g. google)
    pub provider: String,

    /// Specific OAuth provider id (e.g. google-drive)
    #[arg(long)]
    pub provider_id: Option<String>,
}

/// Run the disconnect command.
pub async fn run(args: DisconnectArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let request = DisconnectRequest {
        provider: args.provider.clone(),
        provider_id: args.provider_id.clone(),
    };

    match client.credentials().disconnect(request).await {
        Ok(response) => {
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else if response.success {
                let green = Style::new().green();
                let target = args.provider_id.as_deref().unwrap_or(&args.provider);
                println!("{} Disconnected {}", green.apply_to("✓"), target);
            } else {
                super::print_error("Directory declined the disconnect");
            }
        }
        Err(e) => super::print_error(e),
    }
    Ok(())
}
