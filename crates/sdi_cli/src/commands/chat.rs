//! Chat command - Interactive copilot conversation over stdin.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use sdi_chat::{find_example, ChatError, Copilot, Osc52Clipboard, SubmitOutcome, EXAMPLE_PROMPTS};
use sdi_core::render::full_preview;

use super::CommandContext;

#[derive(Args)]
pub struct ChatArgs {
    /// Seed for reproducible stage timing
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the stage holds
    #[arg(long)]
    fast: bool,
}

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Blank,
    Quit,
    Help,
    Examples,
    Example(String),
    Copy,
    Save(PathBuf),
    Submit(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Blank;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Submit(line.to_string());
        };
        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        match name {
            "quit" | "exit" | "q" => Self::Quit,
            "examples" => Self::Examples,
            "example" if !rest.is_empty() => Self::Example(rest.to_string()),
            "copy" => Self::Copy,
            "save" => Self::Save(PathBuf::from(if rest.is_empty() { "." } else { rest })),
            _ => Self::Help,
        }
    }
}

const HELP: &str = "Commands: /examples, /example <n>, /copy, /save [path], /quit";

pub async fn execute(args: ChatArgs, ctx: &CommandContext) -> Result<()> {
    let engine = ctx.engine(args.fast, args.seed)?;
    let copilot = Copilot::open(&ctx.gate(), engine).context("Cannot open the copilot")?;

    println!("🤖 Smart Drawing Intelligence copilot. Describe your process.");
    println!("   {}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ChatInput::parse(&line) {
            ChatInput::Blank => {}
            ChatInput::Quit => break,
            ChatInput::Help => println!("{}", HELP),
            ChatInput::Examples => {
                for (i, example) in EXAMPLE_PROMPTS.iter().enumerate() {
                    println!("  {}. {}", i + 1, example.title);
                }
            }
            ChatInput::Example(key) => match find_example(&key) {
                Some(example) => {
                    println!("> {}", example.prompt);
                    submit(&copilot, example.prompt).await?;
                }
                None => println!("Example not found: {}", key),
            },
            ChatInput::Copy => {
                let mut clipboard = Osc52Clipboard::stdout();
                if copilot.copy_diagram(&mut clipboard)? {
                    println!("📋 Copied to clipboard");
                } else {
                    println!("Nothing to copy yet");
                }
            }
            ChatInput::Save(path) => match copilot.download(&path)? {
                Some(written) => println!("💾 Saved to {}", written.display()),
                None => println!("Nothing to save yet"),
            },
            ChatInput::Submit(text) => submit(&copilot, &text).await?,
        }
    }

    println!("👋 Bye");
    Ok(())
}

async fn submit(copilot: &Copilot, text: &str) -> Result<()> {
    match copilot.submit(text).await {
        Ok(SubmitOutcome::Completed { reply, output }) => {
            println!();
            println!("{}", reply.content);
            println!();
            println!("{}", full_preview(&output));
        }
        Ok(SubmitOutcome::Rejected { stage }) => {
            println!("Still working ({}), please wait", stage.label());
        }
        Err(ChatError::EmptySubmission) => {}
        // A failed run leaves the conversation usable.
        Err(ChatError::Core(e)) => {
            warn!("Generation failed: {}", e);
            println!("❌ {}", e);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn print_prompt() {
    use std::io::Write;
    print!("you> ");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(ChatInput::parse("   "), ChatInput::Blank);
        assert_eq!(ChatInput::parse("/quit"), ChatInput::Quit);
        assert_eq!(ChatInput::parse("/example 2"), ChatInput::Example("2".to_string()));
        assert_eq!(ChatInput::parse("/example"), ChatInput::Help);
        assert_eq!(ChatInput::parse("/save"), ChatInput::Save(PathBuf::from(".")));
        assert_eq!(
            ChatInput::parse("/save out/plant.sfiles"),
            ChatInput::Save(PathBuf::from("out/plant.sfiles"))
        );
        assert_eq!(ChatInput::parse("/nope"), ChatInput::Help);
        assert_eq!(
            ChatInput::parse("  a pump feeding a tank "),
            ChatInput::Submit("a pump feeding a tank".to_string())
        );
    }
}
