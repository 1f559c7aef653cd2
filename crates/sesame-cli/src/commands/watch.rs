//! Watch command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use sesame::SessionPhase;

use crate::context::CommandContext;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Output transitions as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn run(ctx: &CommandContext, args: WatchArgs) -> Result<()> {
    let account = ctx
        .manager()
        .restore()
        .await
        .context("Failed to load session")?
        .context("No active session. Run 'sesame login' first.")?;

    eprintln!(
        "{}",
        format!("Watching the session for {}...", account.display_name()).dimmed()
    );
    eprintln!("{}", "Press Ctrl+C to stop.".dimmed());
    eprintln!();

    let mut phases = ctx.manager().subscribe();
    let refresher = ctx.manager().spawn_refresher();

    print_phase(&phases.borrow_and_update().clone(), args.json);

    loop {
        tokio::select! {
            changed = phases.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = phases.borrow_and_update().clone();
                print_phase(&phase, args.json);
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    refresher.shutdown();
    eprintln!();
    eprintln!("{}", "Stopped.".dimmed());

    Ok(())
}

fn print_phase(phase: &SessionPhase, json_output: bool) {
    if json_output {
        let line = serde_json::json!({
            "phase": phase.to_string(),
            "at": chrono::Utc::now().to_rfc3339(),
        });
        println!("{}", line);
        return;
    }

    match phase {
        SessionPhase::Anonymous => println!("{}", "ANONYMOUS".dimmed()),
        SessionPhase::Authenticating => println!("{}", "AUTHENTICATING".cyan()),
        SessionPhase::Authenticated => println!("{}", "AUTHENTICATED".green()),
        SessionPhase::Refreshing => println!("{}", "REFRESHING".yellow()),
        SessionPhase::Error(message) => println!("{} {}", "ERROR".red(), message),
    }
}
