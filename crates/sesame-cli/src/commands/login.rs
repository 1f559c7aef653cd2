//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use sesame_core::Credentials;

use crate::context::CommandContext;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Username to authenticate with
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Keep the session across restarts
    #[arg(long)]
    pub remember: bool,
}

pub async fn run(ctx: &CommandContext, args: LoginArgs) -> Result<()> {
    let credentials =
        Credentials::new(&args.username, &args.password).with_remember(args.remember);

    eprintln!("{}", "Logging in...".dimmed());

    let account = ctx
        .manager()
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("User", account.display_name());
    output::field("Username", &account.user().username);
    output::field(
        "Scope",
        if args.remember {
            "remembered"
        } else {
            "this session only"
        },
    );
    if let Some(expiry) = ctx.manager().session().and_then(|s| s.expires_at_utc()) {
        output::field("Expires", &expiry.to_rfc3339());
    }

    Ok(())
}
