//! Clipboard sinks for copying diagram text.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ChatResult;

/// Destination for copied text.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> ChatResult<()>;
}

/// Writes an OSC 52 escape sequence so the hosting terminal sets its
/// clipboard.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl Osc52Clipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> ChatResult<()> {
        let encoded = STANDARD.encode(text.as_bytes());
        write!(self.out, "\x1b]52;c;{}\x07", encoded)?;
        self.out.flush()?;
        Ok(())
    }
}

/// In-process clipboard; remembers every write.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Vec<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> ChatResult<()> {
        self.writes.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.set_text("hi").unwrap();
        let bytes = clipboard.into_inner();
        assert_eq!(String::from_utf8(bytes).unwrap(), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert!(clipboard.contents().is_none());
        clipboard.set_text("a").unwrap();
        clipboard.set_text("b").unwrap();
        assert_eq!(clipboard.contents(), Some("b"));
        assert_eq!(clipboard.write_count(), 2);
    }
}
