//! Credentials command - fetch and auto-select.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use keyway_selector::{RefreshOutcome, SelectorView, ViewState};

use super::{Context, TargetArgs};

/// Arguments for the credentials command.
#[derive(Args, Debug)]
pub struct CredentialsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Currently persisted selection
    #[arg(long)]
    pub current: Option<String>,
}

/// Run the credentials command.
pub async fn run(args: CredentialsArgs, ctx: &Context) -> Result<()> {
    let mut selector = ctx.selector(&args.target)?;
    if let Some(current) = args.current {
        selector = selector.with_selection(current);
    }
    let selector = selector.on_change(|id| tracing::info!(selected = %id, "Selection changed"));

    let outcome = selector.mount().await;
    let view = selector.view();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if let RefreshOutcome::Failed(e) = &outcome {
        super::print_error(format!("Could not fetch credentials: {}", e));
    }
    print_view(&view);
    Ok(())
}

/// Human rendering of a selector view.
pub(crate) fn print_view(view: &SelectorView) {
    let dim = Style::new().dim();
    let green = Style::new().green();

    println!(
        "{} {}",
        style(&view.display.name).bold(),
        dim.apply_to(format!("({})", view.provider_id))
    );
    println!("{}", dim.apply_to("─".repeat(50)));

    match &view.state {
        ViewState::Loading => println!("{}", dim.apply_to("Loading...")),
        ViewState::Empty { connect } => {
            println!("{}", dim.apply_to("No credentials connected"));
            println!();
            let mut hint = format!("keyway connect {}", connect.provider_id);
            if !connect.service_id.is_empty() && connect.service_id != connect.provider_id {
                hint.push_str(&format!(" --service {}", connect.service_id));
            }
            for scope in &connect.scopes {
                hint.push_str(&format!(" --scope {}", scope));
            }
            println!("Connect {} with: {}", connect.provider_name, style(hint).cyan());
        }
        ViewState::Ready => {
            for credential in &view.credentials {
                let selected = view.selected.as_deref() == Some(credential.id.as_str());
                let marker = if selected {
                    green.apply_to("●").to_string()
                } else {
                    dim.apply_to("○").to_string()
                };
                let default = if credential.is_default {
                    dim.apply_to(" (default)").to_string()
                } else {
                    String::new()
                };
                println!(
                    "{} {} {}{}",
                    marker,
                    credential.name,
                    dim.apply_to(format!("[{}]", credential.id)),
                    default
                );
            }
            println!();
            match &view.selected {
                Some(id) => println!("{} Selected: {}", green.apply_to("✓"), id),
                None => println!("{}", dim.apply_to("No credential selected")),
            }
        }
    }
}
