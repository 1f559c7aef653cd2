//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::context::CommandContext;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(ctx: &CommandContext, _args: LogoutArgs) -> Result<()> {
    match ctx.manager().restore().await {
        Ok(Some(_)) => {
            ctx.manager().logout().await;
            output::success("Logged out");
        }
        Ok(None) => println!("Not logged in"),
        Err(err) => {
            // The manager has already discarded the unreadable session.
            output::error(&format!("Discarded an unreadable session: {err}"));
        }
    }

    Ok(())
}
