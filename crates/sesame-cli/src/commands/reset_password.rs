//! Password reset command implementations.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use sesame_core::IdentityApi;

use crate::context::CommandContext;
use crate::output;

#[derive(Args, Debug)]
pub struct ResetPasswordCommand {
    #[command(subcommand)]
    pub command: ResetPasswordSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ResetPasswordSubcommand {
    /// Email a password reset token to an account
    Request(RequestArgs),

    /// Redeem a reset token for a new password
    Confirm(ConfirmArgs),
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,
}

#[derive(Args, Debug)]
pub struct ConfirmArgs {
    /// Reset token from the email
    #[arg(long)]
    pub token: String,

    /// New password to set
    #[arg(long)]
    pub new_password: String,
}

pub async fn run(ctx: &CommandContext, cmd: ResetPasswordCommand) -> Result<()> {
    match cmd.command {
        ResetPasswordSubcommand::Request(args) => {
            eprintln!("{}", "Requesting password reset...".dimmed());

            ctx.identity()
                .request_password_reset(&args.email)
                .await
                .context("Failed to request a password reset")?;

            output::success("Reset requested");
            println!("Check the account inbox for the reset token.");
        }
        ResetPasswordSubcommand::Confirm(args) => {
            eprintln!("{}", "Resetting password...".dimmed());

            ctx.identity()
                .reset_password(&args.token, &args.new_password)
                .await
                .context("Failed to reset the password")?;

            output::success("Password reset");
            println!("Log in with the new password.");
        }
    }

    Ok(())
}
