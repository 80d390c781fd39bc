//! Generate command - Run one generation and print the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tokio::task::JoinHandle;
use tracing::info;

use sdi_chat::{Copilot, Osc52Clipboard, SubmitOutcome};
use sdi_core::render::{equipment_table, graph_summary};
use sdi_core::{GenerationOutput, GraphLayout, WorkflowEngine, WorkflowStage};

use super::CommandContext;

/// Canvas used for the graph layout.
const GRAPH_WIDTH: f64 = 800.0;
const GRAPH_HEIGHT: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// SFILES 2.0 diagram text
    Sfiles,
    /// Equipment list
    Table,
    /// Circular graph layout
    Graph,
    /// Full output as JSON
    Json,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Process description
    text: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "sfiles")]
    format: OutputFormat,

    /// Also write the diagram text to this file or directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Copy the diagram text to the terminal clipboard
    #[arg(long)]
    copy: bool,

    /// Seed for reproducible stage timing
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the stage holds
    #[arg(long)]
    fast: bool,
}

pub async fn execute(args: GenerateArgs, ctx: &CommandContext) -> Result<()> {
    let engine = ctx.engine(args.fast, args.seed)?;
    let copilot =
        Copilot::open(&ctx.gate(), Arc::clone(&engine)).context("Cannot start generation")?;

    info!("Generating P&ID ({} chars of input)", args.text.trim().len());

    let progress = (!ctx.quiet).then(|| spawn_progress(&engine, |line| eprintln!("{}", line)));
    let outcome = copilot.submit(&args.text).await;
    if let Some(handle) = progress {
        let completed = matches!(outcome, Ok(SubmitOutcome::Completed { .. }));
        finish_progress(handle, completed).await;
    }

    let output = match outcome.context("Generation failed")? {
        SubmitOutcome::Completed { output, .. } => output,
        SubmitOutcome::Rejected { stage } => bail!("A generation is already running ({})", stage),
    };

    println!("{}", render(&output, args.format)?);

    if let Some(path) = &args.out {
        if let Some(written) = copilot.download(path).context("Failed to write diagram")? {
            if !ctx.quiet {
                eprintln!("💾 Saved to {}", written.display());
            }
        }
    }

    if args.copy {
        let mut clipboard = Osc52Clipboard::stdout();
        if copilot.copy_diagram(&mut clipboard)? && !ctx.quiet {
            eprintln!("📋 Copied to clipboard");
        }
    }

    Ok(())
}

/// Format a completed output.
pub fn render(output: &GenerationOutput, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Sfiles => output.diagram_text.clone(),
        OutputFormat::Table => equipment_table(&output.equipment),
        OutputFormat::Graph => {
            let layout = GraphLayout::circular(&output.equipment, GRAPH_WIDTH, GRAPH_HEIGHT);
            graph_summary(&layout)
        }
        OutputFormat::Json => serde_json::to_string_pretty(output)?,
    };
    Ok(text.trim_end().to_string())
}

/// One progress line for a working stage.
pub fn progress_line(stage: WorkflowStage) -> Option<String> {
    let position = stage.working_index()? + 1;
    Some(format!(
        "[{}/{}] {} - {}",
        position,
        WorkflowStage::WORKING.len(),
        stage.label(),
        stage.description()
    ))
}

fn spawn_progress<F>(engine: &WorkflowEngine, mut emit: F) -> JoinHandle<()>
where
    F: FnMut(String) + Send + 'static,
{
    let mut rx = engine.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let stage = *rx.borrow();
            if let Some(line) = progress_line(stage) {
                emit(format!("⏳ {}", line));
            }
            if stage == WorkflowStage::Complete {
                emit("✅ Complete".to_string());
                break;
            }
        }
    })
}

/// Let the progress task drain after a completed run; it stops by itself
/// on `Complete`. Any other outcome never reaches `Complete`, so abort.
async fn finish_progress(handle: JoinHandle<()>, completed: bool) {
    if completed {
        let _ = handle.await;
    } else {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use sdi_core::{ImmediateScheduler, SAMPLE_DIAGRAM_TEXT};

    #[tokio::test]
    async fn test_progress_reports_completion() {
        let engine = WorkflowEngine::builder()
            .scheduler(Arc::new(ImmediateScheduler))
            .build();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let handle = spawn_progress(&engine, move |line| sink.lock().unwrap().push(line));

        engine.execute("pump").await.unwrap();
        finish_progress(handle, true).await;

        let lines = lines.lock().unwrap();
        assert_eq!(lines.last().map(String::as_str), Some("✅ Complete"));
    }

    #[tokio::test]
    async fn test_progress_aborted_without_completion() {
        let engine = WorkflowEngine::builder()
            .scheduler(Arc::new(ImmediateScheduler))
            .build();
        let handle = spawn_progress(&engine, |_| {});
        // Returns even though the engine never reaches `Complete`.
        finish_progress(handle, false).await;
    }

    #[test]
    fn test_progress_lines() {
        assert_eq!(
            progress_line(WorkflowStage::Parse).unwrap(),
            "[1/5] Parse Input - Extracting requirements from NL"
        );
        assert_eq!(
            progress_line(WorkflowStage::Export).unwrap(),
            "[5/5] Export - Preparing DEXPI output"
        );
        assert!(progress_line(WorkflowStage::Idle).is_none());
        assert!(progress_line(WorkflowStage::Complete).is_none());
    }

    #[test]
    fn test_render_formats() {
        let output = GenerationOutput::sample();

        assert_eq!(
            render(&output, OutputFormat::Sfiles).unwrap(),
            SAMPLE_DIAGRAM_TEXT.trim_end()
        );
        assert!(render(&output, OutputFormat::Table)
            .unwrap()
            .contains("TIC-101"));
        assert!(render(&output, OutputFormat::Graph)
            .unwrap()
            .contains("E-101 -> P-101"));

        let json = render(&output, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["equipmentList"].as_array().unwrap().len(), 4);
    }
}
