//! Examples command - List example process descriptions.

use anyhow::{Context, Result};
use clap::Args;

use sdi_chat::{find_example, EXAMPLE_PROMPTS};

use super::CommandContext;

#[derive(Args)]
pub struct ExamplesArgs {
    /// Print only the prompt of this example (number or title)
    #[arg(short, long)]
    show: Option<String>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: ExamplesArgs, _ctx: &CommandContext) -> Result<()> {
    if let Some(key) = &args.show {
        let example = find_example(key).with_context(|| format!("Example not found: {}", key))?;
        println!("{}", example.prompt);
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&EXAMPLE_PROMPTS)?);
        return Ok(());
    }

    println!("💡 Try an example:");
    for (i, example) in EXAMPLE_PROMPTS.iter().enumerate() {
        println!();
        println!("  {}. {}", i + 1, example.title);
        println!("     {}", example.prompt);
    }
    println!();
    println!("Run one with: sdi generate \"$(sdi examples --show 1)\"");
    Ok(())
}
