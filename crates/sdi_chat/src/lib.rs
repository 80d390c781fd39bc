//! # sdi_chat
//!
//! Conversation layer for Smart Drawing Intelligence.
//!
//! - **Session gate**: credential check and the authenticated session,
//!   kept in memory or under the workspace state directory
//! - **Copilot**: the message list; each submission drives one run of the
//!   shared [`sdi_core::WorkflowEngine`] and is answered once it completes
//! - **Clipboard**: sinks for copying the generated diagram text
//! - **Prompts**: example process descriptions
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sdi_chat::{Copilot, SessionGate};
//! use sdi_core::{AuthConfig, WorkflowEngine};
//!
//! let gate = SessionGate::in_memory(&AuthConfig::default());
//! gate.login("corporate", "patria789")?;
//!
//! let copilot = Copilot::open(&gate, Arc::new(WorkflowEngine::new()))?;
//! copilot.submit("A storage tank with level control").await?;
//! ```

pub mod clipboard;
pub mod copilot;
pub mod error;
pub mod prompts;
pub mod session;
pub mod types;

pub use clipboard::{Clipboard, MemoryClipboard, Osc52Clipboard};
pub use copilot::{Copilot, SubmitOutcome, DEFAULT_DOWNLOAD_NAME, REPLY_TEMPLATE};
pub use error::{ChatError, ChatResult};
pub use prompts::{find_example, ExamplePrompt, EXAMPLE_PROMPTS};
pub use session::{
    CredentialVerifier, FileSessionStore, MemorySessionStore, Session, SessionError,
    SessionGate, SessionResult, SessionStore, StaticCredentials, SESSION_FILE,
};
pub use types::{Message, MessageRole};
