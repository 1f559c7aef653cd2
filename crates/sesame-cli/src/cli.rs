//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{can, login, logout, refresh, reset_password, watch, whoami};

/// Session and permission CLI for token-based admin APIs.
#[derive(Parser, Debug)]
#[command(name = "sesame")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Identity API base URL
    #[arg(long, env = "SESAME_API", global = true)]
    pub api: Option<String>,

    /// Directory holding the persisted session
    #[arg(long, env = "SESAME_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new session (login)
    Login(login::LoginArgs),

    /// End the active session
    Logout(logout::LogoutArgs),

    /// Display the active session
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    Refresh(refresh::RefreshArgs),

    /// Check permissions; the exit status reflects the decision
    Can(can::CanArgs),

    /// Request or confirm a password reset
    ResetPassword(reset_password::ResetPasswordCommand),

    /// Stream session phase transitions until interrupted
    Watch(watch::WatchArgs),
}
