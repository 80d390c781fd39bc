//! Canned example prompts offered to new users.

use serde::Serialize;

/// An example process description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExamplePrompt {
    pub title: &'static str,
    pub prompt: &'static str,
}

pub const EXAMPLE_PROMPTS: [ExamplePrompt; 3] = [
    ExamplePrompt {
        title: "Heat Exchange System",
        prompt: "Design a heat exchanger system with a shell-and-tube heat exchanger (E-101), connected to a centrifugal pump (P-101) with a temperature indicator controller (TIC-101) for outlet temperature control.",
    },
    ExamplePrompt {
        title: "Storage Tank with Level Control",
        prompt: "Create a storage tank (T-101) with level control. Include a level transmitter (LT-101), level indicator controller (LIC-101), and a control valve (LV-101) on the outlet line.",
    },
    ExamplePrompt {
        title: "Distillation Column Feed",
        prompt: "Generate a distillation column feed section with a preheater (E-102), feed pump (P-102), and flow control loop (FIC-102) regulating the feed rate to the column.",
    },
];

/// Look up an example by 1-based position or case-insensitive title.
pub fn find_example(key: &str) -> Option<&'static ExamplePrompt> {
    if let Ok(n) = key.trim().parse::<usize>() {
        return n.checked_sub(1).and_then(|i| EXAMPLE_PROMPTS.get(i));
    }
    EXAMPLE_PROMPTS
        .iter()
        .find(|e| e.title.eq_ignore_ascii_case(key.trim()))
}
