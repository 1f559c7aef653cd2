//! Permission check command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::context::CommandContext;
use crate::output;

#[derive(Args, Debug)]
pub struct CanArgs {
    /// Permission keys to check, e.g. "employee:read:team"
    #[arg(required = true)]
    pub permissions: Vec<String>,

    /// Grant when any single key matches (the default requires all)
    #[arg(long)]
    pub any: bool,
}

pub async fn run(ctx: &CommandContext, args: CanArgs) -> Result<()> {
    let restored = ctx
        .manager()
        .restore()
        .await
        .context("Failed to load session")?;

    // Without a session every check denies, same as the manager itself.
    if restored.is_none() {
        output::error("No active session. Run 'sesame login' first.");
        std::process::exit(1);
    }

    let granted = if args.any {
        ctx.manager().has_any(&args.permissions)
    } else {
        ctx.manager().has_all(&args.permissions)
    };

    if granted {
        output::success("Granted");
        Ok(())
    } else {
        output::error("Denied");
        std::process::exit(1);
    }
}
