//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::context::CommandContext;
use crate::output;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(ctx: &CommandContext, _args: RefreshArgs) -> Result<()> {
    ctx.manager()
        .restore()
        .await
        .context("Failed to load session")?
        .context("No active session. Run 'sesame login' first.")?;

    eprintln!("{}", "Refreshing session...".dimmed());

    ctx.manager()
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    if let Some(expiry) = ctx.manager().session().and_then(|s| s.expires_at_utc()) {
        output::field("Expires", &expiry.to_rfc3339());
    }

    Ok(())
}
