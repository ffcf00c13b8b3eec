//! Resume command - match a sign-in callback to its pending request.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the resume command.
#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Callback URL, or `code#state`
    pub callback: String,
}

/// Run the resume command.
pub async fn run(args: ResumeArgs, ctx: &Context) -> Result<()> {
    let flow = ctx.sign_in_flow()?;
    let resumed = flow
        .resume(args.callback.trim())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to resume sign-in: {}", e))?;
    let request = &resumed.request;

    if ctx.json_output {
        let output = serde_json::json!({
            "serviceId": request.service_id,
            "providerId": request.provider_id,
            "requestedScopes": request.requested_scopes,
            "returnUrl": request.return_url,
            "code": resumed.code,
            "codeVerifier": request.code_verifier,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    let age = Utc::now() - request.created_at;

    println!("{} Sign-in resumed for {}", green.apply_to("✓"), request.provider_id);
    println!("  Service:  {}", request.service_id);
    if !request.requested_scopes.is_empty() {
        println!("  Scopes:   {}", request.requested_scopes.join(" "));
    }
    println!("  Return:   {}", request.return_url);
    println!(
        "{}",
        dim.apply_to(format!("Started {}s ago", age.num_seconds().max(0)))
    );
    Ok(())
}
