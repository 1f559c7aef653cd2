//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::context::CommandContext;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct WhoamiOutput<'a> {
    username: &'a str,
    display_name: &'a str,
    email: &'a str,
    permissions: Vec<&'a str>,
    expires_at: Option<String>,
    remembered: bool,
}

pub async fn run(ctx: &CommandContext, args: WhoamiArgs) -> Result<()> {
    let account = ctx
        .manager()
        .restore()
        .await
        .context("Failed to load session")?
        .context("No active session. Run 'sesame login' first.")?;
    let session = ctx
        .manager()
        .session()
        .context("No active session. Run 'sesame login' first.")?;

    let expires_at = session.expires_at_utc().map(|t| t.to_rfc3339());

    if args.json {
        output::json_pretty(&WhoamiOutput {
            username: &account.user().username,
            display_name: account.display_name(),
            email: &account.user().email,
            permissions: account.permissions().iter().collect(),
            expires_at,
            remembered: session.remember(),
        })?;
    } else {
        output::field("User", account.display_name());
        output::field("Username", &account.user().username);
        output::field("Email", &account.user().email);
        let permissions: Vec<&str> = account.permissions().iter().collect();
        output::field("Permissions", &permissions.join(", "));
        if let Some(expires_at) = &expires_at {
            output::field("Expires", expires_at);
        }
        output::field(
            "Scope",
            if session.remember() {
                "remembered"
            } else {
                "this session only"
            },
        );
    }

    Ok(())
}
