//! Login command - Start a session.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::CommandContext;

#[derive(Args)]
pub struct LoginArgs {
    /// Username
    #[arg(short, long)]
    username: String,

    /// Password
    #[arg(short, long)]
    password: String,
}

pub async fn execute(args: LoginArgs, ctx: &CommandContext) -> Result<()> {
    info!("Logging in as '{}'", args.username);

    let session = ctx
        .gate()
        .login(&args.username, &args.password)
        .context("Login failed")?;

    if !ctx.quiet {
        println!("✅ Logged in as {}", session.username);
    }
    Ok(())
}
