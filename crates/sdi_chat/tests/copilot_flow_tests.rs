//! End-to-end conversation flow through the session gate.

use std::sync::Arc;

use sdi_chat::{
    ChatError, Copilot, MemoryClipboard, MessageRole, SessionError, SessionGate, SubmitOutcome,
};
use sdi_core::{
    AuthConfig, HoldRange, ImmediateScheduler, StagePlan, WorkflowEngine, WorkflowStage,
    SAMPLE_DIAGRAM_TEXT,
};

fn instant_engine() -> Arc<WorkflowEngine> {
    Arc::new(
        WorkflowEngine::builder()
            .scheduler(Arc::new(ImmediateScheduler))
            .build(),
    )
}

#[tokio::test]
async fn test_login_generate_logout() {
    let gate = SessionGate::in_memory(&AuthConfig::default());
    assert!(matches!(
        Copilot::open(&gate, instant_engine()),
        Err(ChatError::Session(SessionError::NotAuthenticated))
    ));

    gate.login("corporate", "patria789").unwrap();
    let copilot = Copilot::open(&gate, instant_engine()).unwrap();

    for prompt in ["heat exchanger", "storage tank"] {
        assert!(copilot.submit(prompt).await.unwrap().is_completed());
    }

    let roles: Vec<_> = copilot.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant
        ]
    );

    let mut clipboard = MemoryClipboard::new();
    assert!(copilot.copy_diagram(&mut clipboard).unwrap());
    assert_eq!(clipboard.contents(), Some(SAMPLE_DIAGRAM_TEXT));

    gate.logout().unwrap();
    assert!(Copilot::open(&gate, instant_engine()).is_err());
}

#[tokio::test]
async fn test_second_submission_during_run_is_ignored() {
    let engine = Arc::new(
        WorkflowEngine::builder()
            .plan(StagePlan::uniform(HoldRange::fixed(50)))
            .build(),
    );
    let copilot = Arc::new(Copilot::new(Arc::clone(&engine)));

    let first = {
        let copilot = Arc::clone(&copilot);
        tokio::spawn(async move { copilot.submit("first").await })
    };

    let mut rx = engine.subscribe();
    while !rx.borrow().is_working() {
        rx.changed().await.unwrap();
    }

    let before = copilot.messages();
    let outcome = copilot.submit("second").await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
    assert_eq!(copilot.messages(), before);

    assert!(first.await.unwrap().unwrap().is_completed());
    let messages = copilot.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "first");
    assert_eq!(copilot.stage(), WorkflowStage::Complete);
}
