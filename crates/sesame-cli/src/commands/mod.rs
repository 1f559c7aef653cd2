//! Command implementations.

pub mod can;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod reset_password;
pub mod watch;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::context::CommandContext;

pub async fn handle(cli: Cli) -> Result<()> {
    let ctx = CommandContext::new(cli.api.as_deref(), cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Login(args) => login::run(&ctx, args).await,
        Commands::Logout(args) => logout::run(&ctx, args).await,
        Commands::Whoami(args) => whoami::run(&ctx, args).await,
        Commands::Refresh(args) => refresh::run(&ctx, args).await,
        Commands::Can(args) => can::run(&ctx, args).await,
        Commands::ResetPassword(cmd) => reset_password::run(&ctx, cmd).await,
        Commands::Watch(args) => watch::run(&ctx, args).await,
    }
}
