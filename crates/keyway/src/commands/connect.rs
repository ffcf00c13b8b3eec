//! Connect command - start an OAuth sign-in for a new account.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::{Context, TargetArgs};

/// Arguments for the connect command.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Page to return to after sign-in (default: [oauth].callback_url)
    #[arg(long)]
    pub return_url: Option<String>,
}

/// Run the connect command.
pub async fn run(args: ConnectArgs, ctx: &Context) -> Result<()> {
    let return_url = args
        .return_url
        .or_else(|| ctx.config.oauth.as_ref().and_then(|o| o.callback_url.clone()))
        .ok_or_else(|| {
            anyhow::anyhow!("No return URL: pass --return-url or set [oauth].callback_url")
        })?;

    let selector = ctx.selector(&args.target)?;
    let request = selector.connect_request(return_url);
    let flow = ctx.sign_in_flow()?;

    let redirect = match flow.connect(request).await {
        Ok(redirect) => redirect,
        Err(e) => {
            super::print_error(&e);
            return Ok(());
        }
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&redirect)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let view = selector.view();
    println!("{}", style(format!("Connect {}", view.display.name)).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!();
    println!("Open this URL in your browser:");
    println!();
    println!("  {}", redirect.url);
    println!();
    println!("After signing in, finish with:");
    println!("  {}", style("keyway resume '<callback url>'").cyan());
    if ctx.verbose {
        println!();
        println!("{}", dim.apply_to(format!("state: {}", redirect.state)));
    }
    Ok(())
}
