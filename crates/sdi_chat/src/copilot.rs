//! Copilot conversation: pairs each submission with a generation run.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use sdi_core::{CoreError, GenerationOutput, WorkflowEngine, WorkflowStage};

use crate::clipboard::Clipboard;
use crate::error::{ChatError, ChatResult};
use crate::session::SessionGate;
use crate::types::Message;

/// File name used when `download` is given a directory.
pub const DEFAULT_DOWNLOAD_NAME: &str = "diagram.sfiles";

/// Reply appended after every completed run.
pub const REPLY_TEMPLATE: &str = "I have analyzed your process description and generated the P&ID structure. 

Generated Components:
- Equipment identified and tagged per industry standards
- Control loops established with proper instrumentation
- Connections mapped in SFILES 2.0 format

The output is now available in the preview panel. You can:
- View the SFILES 2.0 notation
- Explore the interactive graph visualization
- Export for use with engineering tools

Would you like me to modify any component or add additional instrumentation?";

/// Result of a submission.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The run finished; the assistant reply was appended.
    Completed {
        reply: Message,
        output: GenerationOutput,
    },
    /// Another run was active; nothing changed.
    Rejected { stage: WorkflowStage },
}

impl SubmitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// A conversation bound to one workflow engine.
pub struct Copilot {
    engine: Arc<WorkflowEngine>,
    messages: RwLock<Vec<Message>>,
}

impl Copilot {
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self {
            engine,
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Open a conversation; requires an active session.
    pub fn open(gate: &SessionGate, engine: Arc<WorkflowEngine>) -> ChatResult<Self> {
        let session = gate.require_session()?;
        debug!("Opening copilot for '{}'", session.username);
        Ok(Self::new(engine))
    }

    pub fn engine(&self) -> &Arc<WorkflowEngine> {
        &self.engine
    }

    /// Submit a process description.
    pub async fn submit(&self, text: &str) -> ChatResult<SubmitOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptySubmission);
        }

        let ticket = match self.engine.begin(text) {
            Ok(ticket) => ticket,
            Err(CoreError::RunInProgress(stage)) => {
                debug!("Submission ignored, run in progress at {}", stage);
                return Ok(SubmitOutcome::Rejected { stage });
            }
            Err(e) => return Err(e.into()),
        };

        self.push(Message::user(text));
        info!("Submission accepted (run {})", ticket.run_id());

        let log = self.engine.run(ticket).await?;
        let output = match log.output {
            Some(output) => output,
            None => {
                let err = CoreError::InvalidOutput("run finished without output".to_string());
                return Err(err.into());
            }
        };

        let reply = Message::assistant(REPLY_TEMPLATE);
        self.push(reply.clone());
        Ok(SubmitOutcome::Completed { reply, output })
    }

    /// Snapshot of the conversation in order.
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .read()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn message_count(&self) -> usize {
        self.messages().len()
    }

    pub fn output(&self) -> Option<GenerationOutput> {
        self.engine.output()
    }

    pub fn stage(&self) -> WorkflowStage {
        self.engine.stage()
    }

    /// Copy the diagram text verbatim. Returns `false` without writing when
    /// there is no output.
    pub fn copy_diagram(&self, clipboard: &mut dyn Clipboard) -> ChatResult<bool> {
        match self.engine.output() {
            Some(output) => {
                clipboard.set_text(&output.diagram_text)?;
                debug!("Diagram copied ({} bytes)", output.diagram_text.len());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Write the diagram text to `path`, or to `diagram.sfiles` inside it
    /// when `path` is a directory.
    pub fn download(&self, path: &Path) -> ChatResult<Option<PathBuf>> {
        let output = match self.engine.output() {
            Some(output) => output,
            None => return Ok(None),
        };

        let target = if path.is_dir() {
            path.join(DEFAULT_DOWNLOAD_NAME)
        } else {
            path.to_path_buf()
        };
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&target, &output.diagram_text)?;
        info!("Diagram written to {:?}", target);
        Ok(Some(target))
    }

    fn push(&self, message: Message) {
        let mut messages = self
            .messages
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        messages.push(message);
    }
}

impl std::fmt::Debug for Copilot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Copilot")
            .field("stage", &self.engine.stage())
            .field("messages", &self.message_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::types::MessageRole;
    use sdi_core::{AuthConfig, ImmediateScheduler, SAMPLE_DIAGRAM_TEXT};
    use tempfile::TempDir;

    fn instant_copilot() -> Copilot {
        let engine = WorkflowEngine::builder()
            .scheduler(Arc::new(ImmediateScheduler))
            .seed(3)
            .build();
        Copilot::new(Arc::new(engine))
    }

    #[tokio::test]
    async fn test_submit_appends_user_then_assistant() {
        let copilot = instant_copilot();
        let outcome = copilot.submit("  heat exchanger loop  ").await.unwrap();

        assert!(outcome.is_completed());
        let messages = copilot.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "heat exchanger loop");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, REPLY_TEMPLATE);
        assert_eq!(copilot.stage(), WorkflowStage::Complete);
    }

    #[tokio::test]
    async fn test_empty_submission_is_rejected() {
        let copilot = instant_copilot();
        assert!(matches!(
            copilot.submit("   \n\t").await,
            Err(ChatError::EmptySubmission)
        ));
        assert!(copilot.messages().is_empty());
        assert_eq!(copilot.stage(), WorkflowStage::Idle);
    }

    #[tokio::test]
    async fn test_submit_while_busy_changes_nothing() {
        let copilot = instant_copilot();
        let ticket = copilot.engine().begin("held").unwrap();
        let stage = copilot.stage();

        let outcome = copilot.submit("second").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
        assert!(copilot.messages().is_empty());
        assert_eq!(copilot.stage(), stage);

        drop(ticket);
        assert!(copilot.submit("third").await.unwrap().is_completed());
    }

    #[tokio::test]
    async fn test_output_is_sample() {
        let copilot = instant_copilot();
        let outcome = copilot.submit("anything").await.unwrap();
        match outcome {
            SubmitOutcome::Completed { output, .. } => {
                assert_eq!(output.diagram_text, SAMPLE_DIAGRAM_TEXT);
                assert_eq!(output.equipment.len(), 4);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_copy_without_output_is_noop() {
        let copilot = instant_copilot();
        let mut clipboard = MemoryClipboard::new();
        assert!(!copilot.copy_diagram(&mut clipboard).unwrap());
        assert_eq!(clipboard.write_count(), 0);

        copilot.submit("pump").await.unwrap();
        assert!(copilot.copy_diagram(&mut clipboard).unwrap());
        assert_eq!(clipboard.contents(), Some(SAMPLE_DIAGRAM_TEXT));
    }

    #[tokio::test]
    async fn test_download() {
        let temp = TempDir::new().unwrap();
        let copilot = instant_copilot();
        assert!(copilot.download(temp.path()).unwrap().is_none());

        copilot.submit("pump").await.unwrap();
        let written = copilot.download(temp.path()).unwrap().unwrap();
        assert_eq!(written, temp.path().join(DEFAULT_DOWNLOAD_NAME));
        assert_eq!(fs::read_to_string(&written).unwrap(), SAMPLE_DIAGRAM_TEXT);

        let named = temp.path().join("out").join("plant.sfiles");
        assert_eq!(copilot.download(&named).unwrap().unwrap(), named);
        assert!(named.exists());
    }

    #[test]
    fn test_open_requires_session() {
        let gate = SessionGate::in_memory(&AuthConfig::default());
        let engine = Arc::new(WorkflowEngine::new());
        assert!(matches!(
            Copilot::open(&gate, Arc::clone(&engine)),
            Err(ChatError::Session(_))
        ));

        gate.login("corporate", "patria789").unwrap();
        assert!(Copilot::open(&gate, engine).is_ok());
    }
}
