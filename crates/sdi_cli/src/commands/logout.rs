//! Logout command - End the session.

use anyhow::{Context, Result};
use clap::Args;

use super::CommandContext;

#[derive(Args)]
pub struct LogoutArgs {}

pub async fn execute(_args: LogoutArgs, ctx: &CommandContext) -> Result<()> {
    ctx.gate().logout().context("Logout failed")?;

    if !ctx.quiet {
        println!("👋 Logged out");
    }
    Ok(())
}
