//! Status command - Show session and workflow settings.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use super::CommandContext;

#[derive(Args)]
pub struct StatusArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: StatusArgs, ctx: &CommandContext) -> Result<()> {
    let session = ctx
        .gate()
        .check_session()
        .context("Cannot read session")?;
    let hold = ctx.config.workflow.hold();

    if args.json {
        let status = json!({
            "authenticated": session.is_some(),
            "session": session,
            "workspace": ctx.workspace,
            "hold": { "min_ms": hold.min().as_millis() as u64, "max_ms": hold.max().as_millis() as u64 },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    match session {
        Some(session) => println!(
            "🔓 Logged in as {} since {}",
            session.username,
            session.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("🔒 Not logged in"),
    }
    if !ctx.quiet {
        println!("   Workspace: {}", ctx.workspace.display());
        println!("   Stage hold: {:?} to {:?}", hold.min(), hold.max());
    }
    Ok(())
}
