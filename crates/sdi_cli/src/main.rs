//! Smart Drawing Intelligence CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Authentication required or failed
//! - 4: Generation failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sdi_chat::{ChatError, SessionError};
use sdi_core::CoreError;

mod commands;

use commands::{Cli, CommandContext, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const AUTH_FAILURE: u8 = 3;
    pub const GENERATION_FAILURE: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match CommandContext::from_cli(&cli) {
        Ok(ctx) => match cli.command {
            Commands::Login(args) => commands::login::execute(args, &ctx).await,
            Commands::Logout(args) => commands::logout::execute(args, &ctx).await,
            Commands::Status(args) => commands::status::execute(args, &ctx).await,
            Commands::Generate(args) => commands::generate::execute(args, &ctx).await,
            Commands::Chat(args) => commands::chat::execute(args, &ctx).await,
            Commands::Examples(args) => commands::examples::execute(args, &ctx).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "sdi=debug,info"
    } else if quiet {
        "error"
    } else {
        "sdi=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Ignore a second initialization.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<SessionError>() {
            return match err {
                SessionError::Store(_) => ExitCodes::GENERAL_ERROR,
                _ => ExitCodes::AUTH_FAILURE,
            };
        }
        if let Some(err) = cause.downcast_ref::<ChatError>() {
            match err {
                ChatError::Session(SessionError::Store(_)) => return ExitCodes::GENERAL_ERROR,
                ChatError::Session(_) => return ExitCodes::AUTH_FAILURE,
                ChatError::EmptySubmission => return ExitCodes::INVALID_ARGS,
                _ => {}
            }
        }
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            match err {
                CoreError::Generation { .. } | CoreError::InvalidOutput(_) => {
                    return ExitCodes::GENERATION_FAILURE
                }
                CoreError::Config(_) | CoreError::InvalidPlan(_) => {
                    return ExitCodes::INVALID_ARGS
                }
                _ => {}
            }
        }
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("login required") || msg.contains("credentials") {
        ExitCodes::AUTH_FAILURE
    } else if msg.contains("generation") {
        ExitCodes::GENERATION_FAILURE
    } else if msg.contains("argument") || msg.contains("option") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
