//! CLI command definitions.
//!
//! Each subcommand maps to one user action against the workspace: the
//! session gate, a generation run, or the interactive copilot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use sdi_chat::SessionGate;
use sdi_core::{ImmediateScheduler, SdiConfig, WorkflowEngine, WorkflowEngineBuilder};

pub mod chat;
pub mod examples;
pub mod generate;
pub mod login;
pub mod logout;
pub mod status;

/// Smart Drawing Intelligence - P&ID generation from process descriptions
#[derive(Parser)]
#[command(name = "sdi")]
#[command(version, about = "Smart Drawing Intelligence - P&ID generation copilot")]
#[command(long_about = r#"
Smart Drawing Intelligence turns a natural-language process description into
a P&ID structure in SFILES 2.0 notation with an equipment list.

COMMANDS:
  login      → Start a session
  logout     → End the session
  status     → Show session and workflow settings
  generate   → Run one generation and print the result
  chat       → Interactive copilot conversation
  examples   → List example process descriptions

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Login required or failed
  4 - Generation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Workspace directory holding `.sdi/` (defaults to current directory)
    #[arg(short, long, global = true, env = "SDI_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Config file (defaults to `<workspace>/.sdi/config.toml`)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a session
    Login(login::LoginArgs),

    /// End the current session
    Logout(logout::LogoutArgs),

    /// Show whether a session exists
    Status(status::StatusArgs),

    /// Generate a P&ID from a process description
    Generate(generate::GenerateArgs),

    /// Interactive copilot conversation
    Chat(chat::ChatArgs),

    /// List example process descriptions
    Examples(examples::ExamplesArgs),
}

/// Resolved global options shared by every command.
pub struct CommandContext {
    pub workspace: PathBuf,
    pub config: SdiConfig,
    pub quiet: bool,
}

impl CommandContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let workspace = match &cli.workspace {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };
        let config = SdiConfig::resolve(cli.config.as_deref(), &workspace)
            .context("Failed to load configuration")?;
        debug!("Workspace {:?}, config {:?}", workspace, config);

        Ok(Self {
            workspace,
            config,
            quiet: cli.quiet,
        })
    }

    pub fn gate(&self) -> SessionGate {
        SessionGate::for_workspace(&self.workspace, &self.config.auth)
    }

    /// Engine per the `[workflow]` config. `fast` skips the stage holds;
    /// `seed` overrides the configured seed.
    pub fn engine(&self, fast: bool, seed: Option<u64>) -> Result<Arc<WorkflowEngine>> {
        let mut builder = WorkflowEngineBuilder::from_config(&self.config.workflow)
            .context("Invalid workflow configuration")?;
        if let Some(seed) = seed {
            builder = builder.seed(seed);
        }
        if fast {
            builder = builder.scheduler(Arc::new(ImmediateScheduler));
        }
        Ok(Arc::new(builder.build()))
    }
}
